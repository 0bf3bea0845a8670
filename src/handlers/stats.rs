use axum::{extract::State, response::IntoResponse};

use crate::{core::error::AppError, dtos::response::ApiResponse, services::stats as StatsService, state::AppState};

/// 首页计数器
pub async fn site_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = StatsService::site_stats(&state).await?;
    Ok(ApiResponse::with_data(stats))
}
