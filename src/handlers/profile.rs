use axum::{
    extract::{multipart::MultipartError, Json, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    core::{enums::UserRole, error::AppError},
    dtos::{
        auth::Claims,
        response::ApiResponse,
        upload::{UploadKind, UploadQuery},
        user::{ChangePasswordRequest, UpdateProfileRequest},
    },
    services::{admin_user as AdminUserService, upload as UploadService, user as UserService},
    state::AppState,
    rate_limit,
};

/// 获取当前登录用户资料（`GET /api/auth/me`）
pub async fn get_me(
    claims: Claims,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    rate_limit!(&state.redis, "read_me", &claims.sub, 60, 60);

    let profile = UserService::get_user_profile(&state, claims.user_id()?).await?;
    Ok(ApiResponse::with_data(profile))
}

/// 更新个人资料（`PUT /api/profile`，`PUT /api/auth/me` 同义）
pub async fn update_me(
    claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    rate_limit!(&state.redis, "update_me", &claims.sub, 10, 60);

    let profile = UserService::update_user_profile(&state, claims.user_id()?, payload).await?;
    Ok(ApiResponse::with_data(profile))
}

pub async fn change_password(
    claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // 防止暴力猜测当前密码
    rate_limit!(&state.redis, "change_password", &claims.sub, 5, 300);

    UserService::change_password(&state, claims.user_id()?, payload).await?;
    Ok(ApiResponse::<()>::with_message("Password updated successfully"))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Image is too large".to_string())
    } else {
        AppError::BadRequest(format!("Invalid upload: {}", e.body_text()))
    }
}

/// 图片上传（`POST /api/upload-image?type=avatar|article|event`），表单字段名 `image`
pub async fn upload_image(
    claims: Claims,
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // 文章/活动配图只有后台人员可以上传
    if query.kind != UploadKind::Avatar {
        AdminUserService::current_actor(&state, &claims).await?.require(UserRole::Editor)?;
    }

    rate_limit!(&state.redis, "upload_image", &claims.sub, 20, 60);

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let uploaded = UploadService::save_image(&state.config, query.kind, &content_type, &bytes).await?;

        if query.kind == UploadKind::Avatar {
            UserService::set_avatar(&state, claims.user_id()?, uploaded.url.clone()).await?;
        }

        return Ok(ApiResponse::with_code(StatusCode::CREATED, "Image uploaded", Some(uploaded)));
    }

    Err(AppError::BadRequest("Missing `image` field".to_string()))
}
