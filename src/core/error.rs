// src/core/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;
use crate::dtos::response::ApiResponse;

/// 应用程序统一错误类型。这个枚举定义了所有可能发生的错误类型，
/// 覆盖了数据库、缓存、验证、认证、授权等各个层面的错误。
///
/// 通过实现 `IntoResponse` trait，任何 `AppError` 都可以直接转换为HTTP响应，
/// 统一输出 `{ "success": false, "message": ... }` 信封。
/// 前端后台页面收到 401 时跳转到 `/admin/login`。
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据库相关错误。包装 SeaORM 的 `DbErr`，自动转换。
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    /// Redis缓存相关错误。包装 redis crate 的 `RedisError`，自动转换。
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// 输入验证错误。包装 validator crate 的 `ValidationErrors`，自动转换。
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// 请求参数错误（非结构化校验），如未知的上传类型、非法的筛选值。返回400。
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 认证错误。如令牌无效、用户名密码错误等。返回401 Unauthorized。
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// 授权错误。如权限不足、不能删除自己等。返回403 Forbidden。
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 资源未找到错误。返回404 Not Found。
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 资源冲突错误。如用户名已存在、活动名额已满等。返回409 Conflict。
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 上传文件超过大小限制。返回413。
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// 请求频率限制错误。返回429 Too Many Requests。
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// 服务器内部错误。用于未预期的错误情况。返回500 Internal Server Error。
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_)
            | AppError::RedisError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// 实现 `IntoResponse` trait，将 `AppError` 转换为HTTP响应。
///
/// 对于内部错误（如数据库、Redis），返回通用的错误消息，避免泄露敏感信息，
/// 详细内容只写入日志。
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let msg = match &self {
            AppError::DatabaseError(e) => {
                tracing::error!("❌ Database Error: {}", e);
                "Database service error".to_string()
            }
            AppError::RedisError(e) => {
                tracing::error!("❌ Redis Error: {}", e);
                "Cache service error".to_string()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("❌ Internal Error: {}", msg);
                "Internal server error".to_string()
            }
            // 验证错误：直接返回验证失败的详细信息
            AppError::ValidationError(e) => e.to_string(),
            AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::RateLimitExceeded(msg) => msg.clone(),
        };

        ApiResponse::<()>::with_error(status, &msg).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::AuthError("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InternalServerError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_response_carries_status() {
        let res = AppError::NotFound("Event not found".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
