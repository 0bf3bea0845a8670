use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;
use serde::Serialize;

use crate::core::error::AppError;

/// Argon2 + 随机盐值哈希密码
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Hash failed: {}", e)))
}

/// 校验密码。哈希串损坏视为内部错误，密码不匹配返回 `Ok(false)`。
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::InternalServerError("Stored password hash is malformed".to_string()))?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLabel {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: StrengthLabel,
}

/// 密码强度评分 0~5。
///
/// 少于 6 个字符直接记 0 分；否则长度 ≥ 8、含小写、含大写、含数字、含符号各加 1 分。
pub fn strength(password: &str) -> PasswordStrength {
    let score = if password.chars().count() < 6 {
        0
    } else {
        [
            password.chars().count() >= 8,
            password.chars().any(|c| c.is_lowercase()),
            password.chars().any(|c| c.is_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_alphanumeric()),
        ]
        .into_iter()
        .filter(|hit| *hit)
        .count() as u8
    };

    let label = match score {
        0..=1 => StrengthLabel::Weak,
        2..=3 => StrengthLabel::Medium,
        _ => StrengthLabel::Strong,
    };

    PasswordStrength { score, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_scores_zero() {
        assert_eq!(strength("abc"), PasswordStrength { score: 0, label: StrengthLabel::Weak });
    }

    #[test]
    fn full_mix_scores_five() {
        assert_eq!(strength("Abcdefgh1!"), PasswordStrength { score: 5, label: StrengthLabel::Strong });
    }

    #[test]
    fn partial_mixes() {
        assert_eq!(strength("abcdef").score, 1);
        assert_eq!(strength("abcdefgh").score, 2);
        assert_eq!(strength("abcdefgh12").label, StrengthLabel::Medium);
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("Rahasia123!").unwrap();
        assert!(verify_password("Rahasia123!", &hash).unwrap());
        assert!(!verify_password("rahasia123!", &hash).unwrap());
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
