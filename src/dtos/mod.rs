use std::sync::LazyLock;
use regex::Regex;

pub mod article;
pub mod auth;
pub mod comment;
pub mod event;
pub mod response;
pub mod stats;
pub mod upload;
pub mod user;

/// 印尼手机号：+62 / 62 / 0 开头，运营商号段 8x
pub static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+62|62|0)8[1-9][0-9]{6,10}$").expect("Invalid Regex")
});

pub static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{3,30}$").expect("Invalid Regex")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_regex_accepts_indonesian_mobiles() {
        assert!(PHONE_REGEX.is_match("081234567890"));
        assert!(PHONE_REGEX.is_match("+6281234567890"));
        assert!(!PHONE_REGEX.is_match("13812345678"));
        assert!(!PHONE_REGEX.is_match("0812"));
    }

    #[test]
    fn username_regex() {
        assert!(USERNAME_REGEX.is_match("budi_s"));
        assert!(!USERNAME_REGEX.is_match("ab"));
        assert!(!USERNAME_REGEX.is_match("budi santoso"));
    }
}
