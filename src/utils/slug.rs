use uuid::Uuid;

/// 由标题生成 URL slug：小写、非字母数字折叠为单个 `-`，去掉首尾 `-`。
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

/// slug 冲突时追加一段随机后缀
pub fn with_suffix(slug: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", slug, &id[..6])
}

/// 路径参数既可以是 UUID 也可以是 slug
pub enum IdOrSlug<'a> {
    Id(Uuid),
    Slug(&'a str),
}

impl<'a> From<&'a str> for IdOrSlug<'a> {
    fn from(raw: &'a str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => IdOrSlug::Id(id),
            Err(_) => IdOrSlug::Slug(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Workshop: Digital Marketing 2026!  "), "workshop-digital-marketing-2026");
        assert_eq!(slugify("Seminar -- UMKM"), "seminar-umkm");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn suffix_keeps_base() {
        let s = with_suffix("seminar-umkm");
        assert!(s.starts_with("seminar-umkm-"));
        assert_eq!(s.len(), "seminar-umkm-".len() + 6);
    }

    #[test]
    fn id_or_slug_parses() {
        let id = Uuid::new_v4();
        let raw = id.to_string();
        assert!(matches!(IdOrSlug::from(raw.as_str()), IdOrSlug::Id(parsed) if parsed == id));
        assert!(matches!(IdOrSlug::from("company-profile"), IdOrSlug::Slug("company-profile")));
    }
}
