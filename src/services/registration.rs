// src/services/registration.rs
//! 三步注册向导的服务端校验。
//!
//! 前端每走一步调用 `validate_step`，最终提交时 `validate_all` 按步骤顺序重新校验，
//! 遇到第一个不通过的步骤即返回该步骤的错误。

use sea_orm::*;
use validator::Validate;

use crate::{
    core::error::AppError,
    dtos::auth::{RegisterRequest, RegisterStep, StepValidation},
    entity::users,
    utils::password,
};

/// 用户名/邮箱是否已被占用。邮箱比较不区分大小写。
pub async fn ensure_available<C: ConnectionTrait>(db: &C, username: &str, email: &str) -> Result<(), AppError> {
    let taken = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Username.eq(username))
                .add(users::Column::Email.eq(email.to_lowercase())),
        )
        .one(db)
        .await?;

    match taken {
        Some(user) if user.username == username => {
            Err(AppError::Conflict("Username is already taken".to_string()))
        }
        Some(_) => Err(AppError::Conflict("Email is already registered".to_string())),
        None => Ok(()),
    }
}

/// 最终提交前的整体校验（不访问数据库）
pub fn validate_all(req: &RegisterRequest) -> Result<(), AppError> {
    req.account.validate()?;
    req.security.validate()?;
    req.profile.validate()?;
    Ok(())
}

/// 单步校验。账号步骤额外检查用户名/邮箱可用性，密码步骤附带强度评分。
pub async fn validate_step<C: ConnectionTrait>(db: &C, step: RegisterStep) -> Result<StepValidation, AppError> {
    let name = step.name();

    let password_strength = match step {
        RegisterStep::Account(account) => {
            account.validate()?;
            ensure_available(db, &account.username, &account.email).await?;
            None
        }
        RegisterStep::Security(security) => {
            security.validate()?;
            Some(password::strength(&security.password))
        }
        RegisterStep::Profile(profile) => {
            profile.validate()?;
            None
        }
    };

    Ok(StepValidation {
        step: name,
        valid: true,
        password_strength,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::auth::{AccountStep, ProfileStep, SecurityStep};

    fn request() -> RegisterRequest {
        RegisterRequest {
            account: AccountStep {
                full_name: "Budi Santoso".into(),
                username: "budi".into(),
                email: "budi@example.co.id".into(),
            },
            security: SecurityStep {
                password: "Rahasia123!".into(),
                confirm_password: "Rahasia123!".into(),
            },
            profile: ProfileStep {
                phone: Some("081234567890".into()),
                company: Some("PT Maju Jaya".into()),
                agree_terms: true,
            },
        }
    }

    #[test]
    fn complete_request_passes() {
        assert!(validate_all(&request()).is_ok());
    }

    #[test]
    fn first_failing_step_wins() {
        let mut req = request();
        req.account.email = "broken".into();
        req.security.confirm_password = "different".into();

        let Err(AppError::ValidationError(errors)) = validate_all(&req) else {
            panic!("expected validation error");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("confirm_password"));
    }

    #[tokio::test]
    async fn security_step_reports_strength_without_touching_db() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let step = RegisterStep::Security(SecurityStep {
            password: "Abcdefgh1!".into(),
            confirm_password: "Abcdefgh1!".into(),
        });

        let result = validate_step(&db, step).await.unwrap();
        assert_eq!(result.step, "security");
        assert_eq!(result.password_strength.map(|s| s.score), Some(5));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn account_step_rejects_taken_username() {
        let existing = users::Model {
            id: uuid::Uuid::new_v4(),
            username: "budi".into(),
            full_name: "Budi Lama".into(),
            email: "lama@example.co.id".into(),
            password_hash: "x".into(),
            phone: None,
            company: None,
            role: crate::core::enums::UserRole::User,
            status: crate::core::enums::UserStatus::Active,
            avatar: None,
            last_login_at: None,
            created_at: chrono::Utc::now().fixed_offset(),
            updated_at: chrono::Utc::now().fixed_offset(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();

        let step = RegisterStep::Account(request().account);
        let err = validate_step(&db, step).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("Username")));
    }
}
