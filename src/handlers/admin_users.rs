// src/handlers/admin_users.rs
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::{constants::REDIS_KEY_STATS, error::AppError},
    dtos::{
        auth::Claims,
        response::ApiResponse,
        user::{CreateUserRequest, UpdateRoleRequest, UpdateUserRequest, UserListQuery},
    },
    services::{
        admin_user as AdminUserService,
        user::profile_key,
    },
    state::AppState,
    utils::cache,
};

/// 被修改用户的资料缓存与首页计数器一并失效
async fn invalidate_user(state: &AppState, id: &Uuid) {
    let key = profile_key(id);
    cache::del(&state.redis, &[key.as_str(), REDIS_KEY_STATS]).await;
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = state.page_params(query.page, query.per_page);
    let page = AdminUserService::list_users(&*state.db, &query, page, per_page).await?;
    Ok(ApiResponse::with_page(page))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = AdminUserService::get_user(&*state.db, id).await?;
    Ok(ApiResponse::with_data(user))
}

pub async fn create_user(
    claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let actor = AdminUserService::current_actor(&state, &claims).await?;

    let user = AdminUserService::create_user(&*state.db, &actor, payload).await?;
    cache::del(&state.redis, &[REDIS_KEY_STATS]).await;

    Ok(ApiResponse::with_code(StatusCode::CREATED, "User created", Some(user)))
}

pub async fn update_user(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let actor = AdminUserService::current_actor(&state, &claims).await?;

    let user = AdminUserService::update_user(&*state.db, &actor, id, payload).await?;
    invalidate_user(&state, &id).await;

    Ok(ApiResponse::with_data(user))
}

pub async fn update_role(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = AdminUserService::current_actor(&state, &claims).await?;

    let user = AdminUserService::update_role(&*state.db, &actor, id, payload.role).await?;
    invalidate_user(&state, &id).await;

    Ok(ApiResponse::with_data(user))
}

pub async fn delete_user(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = AdminUserService::current_actor(&state, &claims).await?;

    let summary = AdminUserService::delete_user(&*state.db, &actor, id).await?;
    invalidate_user(&state, &id).await;

    Ok(ApiResponse::with_code(StatusCode::OK, "User deleted", Some(summary)))
}
