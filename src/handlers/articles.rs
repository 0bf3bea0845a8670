// src/handlers/articles.rs
use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::error::AppError,
    dtos::{
        article::{ArticleListQuery, CreateArticleRequest, UpdateArticleRequest},
        auth::Claims,
        response::ApiResponse,
    },
    extractors::claims::request_token,
    services::{
        admin_user as AdminUserService, article as ArticleService, auth::decode_claims,
        comment as CommentService,
    },
    state::AppState,
    utils::slug::IdOrSlug,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// 可选登录：携带有效的后台令牌时可以预览草稿，令牌无效按访客处理
async fn viewer_is_staff(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(claims) = request_token(headers).and_then(|token| decode_claims(&state.config, &token).ok()) else {
        return false;
    };
    AdminUserService::current_actor(state, &claims)
        .await
        .is_ok_and(|actor| actor.role.is_staff())
}

/// 公开文章列表（仅已发布）
pub async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<ArticleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = state.page_params(query.page, query.per_page);
    let page = ArticleService::list_articles(&*state.db, &query, true, page, per_page).await?;
    Ok(ApiResponse::with_page(page))
}

/// 后台文章列表（所有状态，可按状态筛选）
pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<ArticleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = state.page_params(query.page, query.per_page);
    let page = ArticleService::list_articles(&*state.db, &query, false, page, per_page).await?;
    Ok(ApiResponse::with_page(page))
}

/// `GET /api/articles/{key}`，key 可以是 UUID 或 slug
pub async fn get_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let staff = viewer_is_staff(&state, &headers).await;
    let article = ArticleService::get_article(&*state.db, IdOrSlug::from(key.as_str()), staff).await?;
    Ok(ApiResponse::with_data(article))
}

pub async fn list_article_comments(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = state.page_params(query.page, query.per_page);
    let page = CommentService::list_approved(&*state.db, IdOrSlug::from(key.as_str()), page, per_page).await?;
    Ok(ApiResponse::with_page(page))
}

pub async fn create_article(
    claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let article = ArticleService::create_article(&state, claims.user_id()?, payload).await?;
    Ok(ApiResponse::with_code(StatusCode::CREATED, "Article created", Some(article)))
}

pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let article = ArticleService::update_article(&state, id, payload).await?;
    Ok(ApiResponse::with_data(article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ArticleService::delete_article(&state, id).await?;
    Ok(ApiResponse::<()>::with_message("Article deleted"))
}
