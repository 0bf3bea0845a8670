// src/handlers/events.rs
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::error::AppError,
    dtos::{
        event::{CreateEventRequest, EventListQuery, UpdateEventRequest},
        response::ApiResponse,
    },
    services::event as EventService,
    state::AppState,
    utils::slug::IdOrSlug,
    rate_limit,
};

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = state.page_params(query.page, query.per_page);
    let page = EventService::list_events(&state, &query, page, per_page).await?;
    Ok(ApiResponse::with_page(page))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = EventService::get_event(&*state.db, IdOrSlug::from(key.as_str())).await?;
    Ok(ApiResponse::with_data(event))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let event = EventService::create_event(&state, payload).await?;
    Ok(ApiResponse::with_code(StatusCode::CREATED, "Event created", Some(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let event = EventService::update_event(&state, id, payload).await?;
    Ok(ApiResponse::with_data(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    EventService::delete_event(&state, id).await?;
    Ok(ApiResponse::<()>::with_message("Event deleted"))
}

/// 活动报名（占一个名额）。按活动限流，防止脚本刷满名额。
pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    rate_limit!(&state.redis, "event_register", &id.to_string(), 30, 60);

    let registration = EventService::register_seat(&state, id).await?;
    Ok(ApiResponse::with_code(StatusCode::OK, "Registration confirmed", Some(registration)))
}
