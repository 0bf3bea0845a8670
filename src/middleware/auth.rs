use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;

use crate::{
    core::{constants::REDIS_PREFIX_BLACKLIST, enums::UserRole, error::AppError},
    extractors::claims::request_token,
    services::{admin_user as AdminUserService, auth::decode_claims},
    state::AppState,
};

/// 基础鉴权中间件（黑名单检查）。检查请求中的 JWT 令牌是否在 Redis 黑名单中，
/// 用于让登出后的令牌立即失效。
///
/// 没有提供令牌时直接放行，由 Claims 提取器或角色守卫决定是否需要认证。
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = request_token(req.headers()) else {
        return Ok(next.run(req).await);
    };

    let redis_key = format!("{}{}", REDIS_PREFIX_BLACKLIST, token);
    let mut redis_conn = state.redis.clone();

    let is_blacklisted: bool = redis_conn.exists(&redis_key).await?;

    if is_blacklisted {
        tracing::warn!("🚫 Blocked blacklisted token");
        return Err(AppError::AuthError("Token has been revoked".to_string()));
    }

    Ok(next.run(req).await)
}

/// 校验令牌，并以库中当前账号的状态和角色（而非令牌里的角色）判断是否不低于 `required`
async fn ensure_role(state: &AppState, headers: &HeaderMap, required: UserRole) -> Result<(), AppError> {
    let token = request_token(headers)
        .ok_or_else(|| AppError::AuthError("Missing token".to_string()))?;
    let claims = decode_claims(&state.config, &token)?;

    AdminUserService::current_actor(state, &claims).await?.require(required)
}

/// 后台内容管理守卫：编辑及以上（文章、评论、活动）
pub async fn staff_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    ensure_role(&state, req.headers(), UserRole::Editor).await?;
    Ok(next.run(req).await)
}

/// 用户管理守卫：管理员及以上
pub async fn admin_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    ensure_role(&state, req.headers(), UserRole::Admin).await?;
    Ok(next.run(req).await)
}
