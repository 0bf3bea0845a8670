// src/handlers/auth.rs
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    core::{constants::AUTH_COOKIE_NAME, error::AppError},
    dtos::{
        auth::{LoginRequest, RefreshRequest, RegisterRequest, RegisterStep},
        response::ApiResponse,
    },
    extractors::claims::request_token,
    services::{auth as AuthService, registration as RegistrationService},
    state::AppState,
    rate_limit,
};

fn auth_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// 注册向导最终提交。
///
/// 同一邮箱每小时最多提交 5 次；成功返回 201，前端随后延时跳转到登录页。
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    rate_limit!(&state.redis, "register", &payload.account.email, 5, 3600);

    let profile = AuthService::register(&state, payload).await?;

    Ok(ApiResponse::with_code(
        StatusCode::CREATED,
        "Registration successful",
        Some(profile),
    ))
}

/// 注册向导单步校验
pub async fn validate_step(
    State(state): State<AppState>,
    Json(payload): Json<RegisterStep>,
) -> Result<impl IntoResponse, AppError> {
    let result = RegistrationService::validate_step(&*state.db, payload).await?;
    Ok(ApiResponse::with_data(result))
}

/// 登录：响应体返回令牌对，同时下发 HttpOnly Cookie，后台页面两种方式都可使用。
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // 每个账号每60秒最多可以登录5次
    rate_limit!(&state.redis, "login", &payload.account, 5, 60);

    let response = AuthService::login(&state, payload).await?;
    let jar = jar.add(auth_cookie(response.access_token.clone(), state.config.cookie_secure));

    Ok((jar, ApiResponse::with_data(response)))
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = AuthService::refresh(&state, payload.refresh_token).await?;
    let jar = jar.add(auth_cookie(response.access_token.clone(), state.config.cookie_secure));

    Ok((jar, ApiResponse::with_data(response)))
}

/// 登出：令牌加入黑名单并清除 Cookie。没有携带令牌也视为成功。
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = request_token(&headers) {
        AuthService::logout(&state, &token).await?;
    }

    let jar = jar.remove(Cookie::build(AUTH_COOKIE_NAME).path("/"));
    Ok((jar, ApiResponse::<()>::with_message("Logged out successfully")))
}
