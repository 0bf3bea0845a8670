// src/handlers/comments.rs
use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::error::AppError,
    dtos::{
        comment::{CommentList, CommentListQuery, CreateCommentRequest, UpdateCommentRequest},
        response::ApiResponse,
    },
    extractors::claims::request_token,
    services::{auth::decode_claims, comment as CommentService},
    state::AppState,
    rate_limit,
};

/// 后台评论列表：`data` 为当前页评论和各状态总数，`pagination` 为筛选后的分页信息
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = state.page_params(query.page, query.per_page);
    let (page, counts) = CommentService::list_for_admin(&*state.db, &query, page, per_page).await?;

    let list = CommentList { comments: page.items, counts };
    Ok(ApiResponse::with_data(list).with_pagination(page.meta))
}

/// 公开评论提交。已登录访客的评论会关联到账号。
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // 同一邮箱每 10 分钟最多 5 条
    rate_limit!(&state.redis, "comment", &payload.email, 5, 600);

    let user_id = request_token(&headers)
        .and_then(|token| decode_claims(&state.config, &token).ok())
        .and_then(|claims| claims.user_id().ok());

    let comment = CommentService::create_comment(&*state.db, user_id, payload).await?;
    Ok(ApiResponse::with_code(
        StatusCode::CREATED,
        "Comment submitted and awaiting moderation",
        Some(comment),
    ))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = CommentService::update_status(&*state.db, id, payload.status).await?;
    Ok(ApiResponse::with_data(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    CommentService::delete_comment(&*state.db, id).await?;
    Ok(ApiResponse::<()>::with_message("Comment deleted"))
}
