// src/utils/pagination.rs
//! 列表通用逻辑：筛选 -> 统计 -> 切片。
//!
//! 小集合（活动、单篇文章下的评论）在内存里筛选分页；用户表走 SQL 分页，
//! 但两条路径共用同一套页码计算（`PageMeta`），保证前端看到的分页信息一致。

use sea_orm::{ConnectionTrait, DbErr, Paginator, SelectorTrait};
use serde::{Deserialize, Serialize};

/// 分页元信息，随列表响应一起返回（信封中的 `pagination` 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    /// `total_pages = ceil(total / per_page)`，总数为 0 时页数也为 0。
    pub fn new(total: u64, page: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        Self {
            page: page.max(1),
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }

    /// 当前页第一条的偏移量。页码越界（包括乘法溢出）时为 `None`。
    pub fn offset(&self) -> Option<u64> {
        (self.page - 1)
            .checked_mul(self.per_page)
            .filter(|offset| *offset < self.total)
    }
}

/// 一页数据
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// SQL 分页：先取总数，页码越界时直接返回空页，不再发出数据查询。
pub async fn fetch_sql_page<'db, C, S>(
    paginator: Paginator<'db, C, S>,
    page: u64,
    per_page: u64,
) -> Result<Page<S::Item>, DbErr>
where
    C: ConnectionTrait,
    S: SelectorTrait + 'db,
{
    let total = paginator.num_items().await?;
    let meta = PageMeta::new(total, page, per_page);

    let items = match meta.offset() {
        Some(_) => paginator.fetch_page(meta.page - 1).await?,
        None => Vec::new(),
    };
    Ok(Page { items, meta })
}

/// 解析查询参数里的页码：page 缺省为 1，per_page 缺省为 `default_size` 并限制在 `1..=max_size`。
pub fn resolve_page(page: Option<u64>, per_page: Option<u64>, default_size: u64, max_size: u64) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_size).clamp(1, max_size.max(1));
    (page, per_page)
}

/// 对已筛选好的集合切片。页码越界返回空页而不是错误。
pub fn paginate<T>(items: Vec<T>, page: u64, per_page: u64) -> Page<T> {
    let meta = PageMeta::new(items.len() as u64, page, per_page);
    let offset = (meta.page - 1).saturating_mul(meta.per_page);

    let items = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(meta.per_page).unwrap_or(usize::MAX))
        .collect();

    Page { items, meta }
}

/// 可被关键字搜索的列表项：返回参与子串匹配的字段（1~3 个）。
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// 规范化搜索词：去掉首尾空白并转小写，空串视为未搜索。
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// 大小写不敏感的子串匹配。`needle` 需先经过 `normalize_search`。
pub fn matches_search<T: Searchable>(item: &T, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle)),
    }
}

/// SQL LIKE 子串模式，搜索词中的 `\\` `%` `_` 按字面匹配
pub fn like_contains(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// 等值筛选：未设置筛选条件时不做约束
#[inline]
pub fn matches_eq<V: PartialEq>(value: &V, filter: Option<&V>) -> bool {
    filter.is_none_or(|f| f == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str, &'static str);

    impl Searchable for Item {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.0, self.1]
        }
    }

    #[test]
    fn twenty_three_items_make_three_pages() {
        let items: Vec<u32> = (1..=23).collect();

        let first = paginate(items.clone(), 1, 10);
        assert_eq!(first.meta.total_pages, 3);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());

        let last = paginate(items, 3, 10);
        assert_eq!(last.meta.total, 23);
        assert_eq!(last.items, vec![21, 22, 23]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], 5, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_pages, 1);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let page = paginate(Vec::<u8>::new(), 1, 10);
        assert_eq!(page.meta, PageMeta { page: 1, per_page: 10, total: 0, total_pages: 0 });
    }

    #[test]
    fn offset_is_none_past_the_end_or_on_overflow() {
        assert_eq!(PageMeta::new(23, 3, 10).offset(), Some(20));
        assert_eq!(PageMeta::new(23, 4, 10).offset(), None);
        assert_eq!(PageMeta::new(0, 1, 10).offset(), None);
        assert_eq!(PageMeta::new(23, u64::MAX / 2, 10).offset(), None);
        assert_eq!(PageMeta::new(23, i64::MAX as u64, 100).offset(), None);
    }

    #[test]
    fn like_pattern_escapes_wildcards_and_backslash() {
        assert_eq!(like_contains("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_contains("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn resolve_page_defaults_and_clamps() {
        assert_eq!(resolve_page(None, None, 10, 100), (1, 10));
        assert_eq!(resolve_page(Some(0), Some(0), 10, 100), (1, 1));
        assert_eq!(resolve_page(Some(4), Some(500), 10, 100), (4, 100));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let item = Item("Budi Santoso", "budi@example.co.id");
        let needle = normalize_search(Some("  SANTO "));
        assert!(matches_search(&item, needle.as_deref()));
        assert!(matches_search(&item, Some("example.co")));
        assert!(!matches_search(&item, Some("siti")));
        assert_eq!(normalize_search(Some("   ")), None);
        assert!(matches_search(&item, None));
    }

    #[test]
    fn eq_filter_without_value_matches_everything() {
        assert!(matches_eq(&3, None));
        assert!(matches_eq(&3, Some(&3)));
        assert!(!matches_eq(&3, Some(&4)));
    }
}
