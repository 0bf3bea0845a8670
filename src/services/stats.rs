use sea_orm::*;

use crate::{
    core::{
        constants::{CACHE_EXPIRE_STATS, REDIS_KEY_STATS},
        enums::{ArticleStatus, EventStatus, UserStatus},
        error::AppError,
    },
    dtos::stats::SiteStats,
    entity::{articles, events, users},
    state::AppState,
    utils::cache,
};

/// 首页计数器数据（缓存优先，内容变动时由各写操作失效）
pub async fn site_stats(state: &AppState) -> Result<SiteStats, AppError> {
    let db = state.db.clone();

    cache::get_or_fetch(&state.redis, REDIS_KEY_STATS, CACHE_EXPIRE_STATS, || async move {
        let published_articles = articles::Entity::find()
            .filter(articles::Column::Status.eq(ArticleStatus::Published))
            .count(&*db)
            .await?;
        let total_events = events::Entity::find().count(&*db).await?;
        let upcoming_events = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Upcoming))
            .count(&*db)
            .await?;
        let completed_events = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Completed))
            .count(&*db)
            .await?;
        let active_users = users::Entity::find()
            .filter(users::Column::Status.eq(UserStatus::Active))
            .count(&*db)
            .await?;

        Ok(SiteStats {
            published_articles,
            total_events,
            upcoming_events,
            completed_events,
            active_users,
        })
    })
    .await
}
