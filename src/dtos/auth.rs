use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    dtos::{user::UserProfile, PHONE_REGEX, USERNAME_REGEX},
    utils::password::PasswordStrength,
};

// --- 注册向导：三步，每一步单独校验 ---

/// 第一步：账号信息
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccountStep {
    #[validate(length(min = 3, max = 100, message = "Full name must be 3-100 characters"))]
    pub full_name: String,

    #[validate(regex(path = *USERNAME_REGEX, message = "Username must be 3-30 letters, digits or underscores"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// 第二步：密码
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SecurityStep {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Password confirmation does not match"))]
    pub confirm_password: String,
}

/// 第三步：补充资料与服务条款
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileStep {
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number format"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Company name is too long"))]
    pub company: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "must_accept_terms"))]
    pub agree_terms: bool,
}

fn must_accept_terms(agreed: &bool) -> Result<(), ValidationError> {
    if *agreed {
        Ok(())
    } else {
        Err(ValidationError::new("terms").with_message("You must accept the terms and conditions".into()))
    }
}

/// 最终提交：三步的字段平铺在同一个 JSON 对象里
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub account: AccountStep,
    #[serde(flatten)]
    pub security: SecurityStep,
    #[serde(flatten)]
    pub profile: ProfileStep,
}

/// 单步校验请求：`{ "step": "security", "data": { ... } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "lowercase")]
pub enum RegisterStep {
    Account(AccountStep),
    Security(SecurityStep),
    Profile(ProfileStep),
}

impl RegisterStep {
    pub fn name(&self) -> &'static str {
        match self {
            RegisterStep::Account(_) => "account",
            RegisterStep::Security(_) => "security",
            RegisterStep::Profile(_) => "profile",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepValidation {
    pub step: &'static str,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_strength: Option<PasswordStrength>,
}

// --- 登录 / 令牌 ---

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    /// 用户名或邮箱
    #[validate(length(min = 1, message = "Account cannot be empty"))]
    pub account: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_reads_flat_json() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "full_name": "Siti Rahma",
            "username": "siti",
            "email": "siti@example.co.id",
            "password": "Rahasia123!",
            "confirm_password": "Rahasia123!",
            "phone": "081234567890",
            "agree_terms": true
        }))
        .unwrap();

        assert_eq!(req.account.username, "siti");
        assert!(req.security.validate().is_ok());
        assert!(req.profile.validate().is_ok());
        assert_eq!(req.profile.company, None);
    }

    #[test]
    fn step_request_is_tagged() {
        let step: RegisterStep = serde_json::from_value(serde_json::json!({
            "step": "security",
            "data": { "password": "abcdefgh", "confirm_password": "abcdefgx" }
        }))
        .unwrap();

        assert_eq!(step.name(), "security");
        let RegisterStep::Security(security) = step else { panic!("wrong step") };
        let errors = security.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn account_step_rejects_bad_email_and_short_name() {
        let step = AccountStep {
            full_name: "Al".into(),
            username: "al".into(),
            email: "not-an-email".into(),
        };
        let errors = step.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("full_name"));
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn profile_step_requires_terms() {
        let step = ProfileStep { phone: None, company: None, agree_terms: false };
        assert!(step.validate().unwrap_err().field_errors().contains_key("agree_terms"));
    }
}
