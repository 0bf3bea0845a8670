// src/services/event.rs
//! 活动管理。
//!
//! 活动数量有限，整表（按开始时间排序）缓存在 Redis 中，列表请求在内存里筛选分页；
//! 任何写操作都会让缓存失效，下一次读取即全量重新拉取。

use sea_orm::{sea_query::Expr, *};
use uuid::Uuid;

use crate::{
    core::{
        constants::{CACHE_EXPIRE_EVENTS, REDIS_KEY_EVENTS_ALL, REDIS_KEY_STATS},
        enums::{EventStatus, LocationType},
        error::AppError,
    },
    dtos::event::{
        CreateEventRequest, EventFilter, EventListQuery, EventRegistration, EventView,
        UpdateEventRequest,
    },
    entity::events,
    state::AppState,
    utils::{
        cache,
        pagination::{normalize_search, paginate, Page},
        slug::{slugify, with_suffix, IdOrSlug},
    },
};

async fn invalidate(state: &AppState) {
    cache::del(&state.redis, &[REDIS_KEY_EVENTS_ALL, REDIS_KEY_STATS]).await;
}

/// 线下/混合活动必须有地点，结束时间不能早于开始时间
fn check_schedule(
    location_type: LocationType,
    location: Option<&str>,
    start_at: &chrono::DateTime<chrono::FixedOffset>,
    end_at: Option<&chrono::DateTime<chrono::FixedOffset>>,
) -> Result<(), AppError> {
    if location_type != LocationType::Online && location.is_none_or(|l| l.trim().is_empty()) {
        return Err(AppError::BadRequest(format!("A {} event needs a location", location_type)));
    }
    if end_at.is_some_and(|end| end < start_at) {
        return Err(AppError::BadRequest("Event cannot end before it starts".to_string()));
    }
    Ok(())
}

pub fn filter_events(all: Vec<EventView>, filter: &EventFilter) -> Vec<EventView> {
    all.into_iter().filter(|e| filter.matches(e)).collect()
}

/// 全部活动（缓存优先）
pub async fn all_events(state: &AppState) -> Result<Vec<EventView>, AppError> {
    let db = state.db.clone();
    cache::get_or_fetch(&state.redis, REDIS_KEY_EVENTS_ALL, CACHE_EXPIRE_EVENTS, || async move {
        let rows = events::Entity::find()
            .order_by_asc(events::Column::StartAt)
            .all(&*db)
            .await?;
        Ok(rows.into_iter().map(EventView::from).collect())
    })
    .await
}

pub async fn list_events(
    state: &AppState,
    query: &EventListQuery,
    page: u64,
    per_page: u64,
) -> Result<Page<EventView>, AppError> {
    let filter = EventFilter {
        event_type: query.event_type,
        status: query.status,
        location_type: query.location_type,
        featured: query.featured,
        search: normalize_search(query.search.as_deref()),
    };

    let all = all_events(state).await?;
    Ok(paginate(filter_events(all, &filter), page, per_page))
}

async fn find_event(db: &DatabaseConnection, key: IdOrSlug<'_>) -> Result<events::Model, AppError> {
    let found = match key {
        IdOrSlug::Id(id) => events::Entity::find_by_id(id).one(db).await?,
        IdOrSlug::Slug(slug) => {
            events::Entity::find()
                .filter(events::Column::Slug.eq(slug))
                .one(db)
                .await?
        }
    };
    found.ok_or(AppError::NotFound("Event not found".to_string()))
}

pub async fn get_event(db: &DatabaseConnection, key: IdOrSlug<'_>) -> Result<EventView, AppError> {
    Ok(find_event(db, key).await?.into())
}

async fn unique_slug(db: &DatabaseConnection, title: &str, exclude: Option<Uuid>) -> Result<String, AppError> {
    let base = slugify(title);
    let mut select = events::Entity::find().filter(events::Column::Slug.eq(&base));
    if let Some(id) = exclude {
        select = select.filter(events::Column::Id.ne(id));
    }
    Ok(if select.count(db).await? > 0 { with_suffix(&base) } else { base })
}

pub async fn create_event(state: &AppState, req: CreateEventRequest) -> Result<EventView, AppError> {
    check_schedule(req.location_type, req.location.as_deref(), &req.start_at, req.end_at.as_ref())?;

    let event = events::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(unique_slug(&*state.db, &req.title, None).await?),
        title: Set(req.title.trim().to_string()),
        description: Set(req.description),
        event_type: Set(req.event_type),
        status: Set(req.status.unwrap_or(EventStatus::Upcoming)),
        location_type: Set(req.location_type),
        location: Set(req.location),
        meeting_url: Set(req.meeting_url),
        cover_image: Set(req.cover_image),
        start_at: Set(req.start_at),
        end_at: Set(req.end_at),
        capacity: Set(req.capacity),
        registered_count: Set(0),
        is_featured: Set(req.is_featured),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    invalidate(state).await;
    tracing::info!("📅 Event created: {} ({})", event.slug, event.event_type);
    Ok(event.into())
}

/// 局部更新，包括推荐位切换
pub async fn update_event(state: &AppState, id: Uuid, req: UpdateEventRequest) -> Result<EventView, AppError> {
    let event = find_event(&*state.db, IdOrSlug::Id(id)).await?;

    let location_type = req.location_type.unwrap_or(event.location_type);
    let location = req.location.as_deref().or(event.location.as_deref());
    let start_at = req.start_at.unwrap_or(event.start_at);
    let end_at = req.end_at.or(event.end_at);
    check_schedule(location_type, location, &start_at, end_at.as_ref())?;

    if let Some(capacity) = req.capacity {
        if capacity < event.registered_count {
            return Err(AppError::Conflict(format!(
                "Capacity cannot be lower than the {} seats already taken",
                event.registered_count
            )));
        }
    }

    let mut active: events::ActiveModel = event.into();

    if let Some(title) = req.title {
        active.slug = Set(unique_slug(&*state.db, &title, Some(id)).await?);
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = req.description {
        active.description = Set(description);
    }
    if let Some(event_type) = req.event_type {
        active.event_type = Set(event_type);
    }
    if let Some(status) = req.status {
        active.status = Set(status);
    }
    active.location_type = Set(location_type);
    if let Some(location) = req.location {
        active.location = Set(Some(location));
    }
    if let Some(url) = req.meeting_url {
        active.meeting_url = Set(Some(url));
    }
    if let Some(cover) = req.cover_image {
        active.cover_image = Set(Some(cover));
    }
    active.start_at = Set(start_at);
    active.end_at = Set(end_at);
    if let Some(capacity) = req.capacity {
        active.capacity = Set(Some(capacity));
    }
    if let Some(featured) = req.is_featured {
        active.is_featured = Set(featured);
    }

    let event = active.update(&*state.db).await?;
    invalidate(state).await;
    Ok(event.into())
}

pub async fn delete_event(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let result = events::Entity::delete_by_id(id).exec(&*state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Event not found".to_string()));
    }

    invalidate(state).await;
    tracing::info!("🗑️ Event deleted: {}", id);
    Ok(())
}

/// 条件更新占一个名额：未结束且（不限名额或仍有空位）才会加一，并发报名不会超出名额。
async fn take_seat<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<events::Model, AppError> {
    let result = events::Entity::update_many()
        .col_expr(
            events::Column::RegisteredCount,
            Expr::col(events::Column::RegisteredCount).add(1),
        )
        .filter(events::Column::Id.eq(id))
        .filter(events::Column::Status.ne(EventStatus::Completed))
        .filter(
            Condition::any()
                .add(events::Column::Capacity.is_null())
                .add(Expr::col(events::Column::RegisteredCount).lt(Expr::col(events::Column::Capacity))),
        )
        .exec(db)
        .await?;

    let event = events::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Event not found".to_string()))?;

    if result.rows_affected == 0 {
        return Err(if event.status == EventStatus::Completed {
            AppError::Conflict("Event has already finished".to_string())
        } else {
            AppError::Conflict("Event is fully booked".to_string())
        });
    }
    Ok(event)
}

/// 活动报名
pub async fn register_seat(state: &AppState, id: Uuid) -> Result<EventRegistration, AppError> {
    let event = take_seat(&*state.db, id).await?;

    invalidate(state).await;
    let view = EventView::from(event);
    Ok(EventRegistration {
        event_id: view.id,
        registered_count: view.registered_count,
        seats_left: view.seats_left,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::enums::EventType;
    use chrono::{Duration, Utc};

    fn event(title: &str, kind: EventType, status: EventStatus, featured: bool) -> EventView {
        let now = Utc::now().fixed_offset();
        EventView {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slugify(title),
            description: String::new(),
            event_type: kind,
            status,
            location_type: LocationType::Online,
            location: None,
            meeting_url: None,
            cover_image: None,
            start_at: now,
            end_at: None,
            capacity: Some(50),
            registered_count: 10,
            seats_left: Some(40),
            is_featured: featured,
            created_at: now,
        }
    }

    #[test]
    fn filters_by_type_status_and_featured() {
        let all = vec![
            event("Digital Branding Workshop", EventType::Workshop, EventStatus::Upcoming, true),
            event("Export Seminar", EventType::Seminar, EventStatus::Completed, false),
            event("Cloud Webinar", EventType::Webinar, EventStatus::Upcoming, false),
            event("SEO Workshop", EventType::Workshop, EventStatus::Completed, false),
        ];

        let workshops = filter_events(
            all.clone(),
            &EventFilter { event_type: Some(EventType::Workshop), ..Default::default() },
        );
        assert_eq!(workshops.len(), 2);

        let featured_upcoming = filter_events(
            all.clone(),
            &EventFilter { status: Some(EventStatus::Upcoming), featured: Some(true), ..Default::default() },
        );
        assert_eq!(featured_upcoming.len(), 1);
        assert_eq!(featured_upcoming[0].title, "Digital Branding Workshop");

        let searched = filter_events(all, &EventFilter { search: normalize_search(Some("webinar")), ..Default::default() });
        assert_eq!(searched.len(), 1);
    }

    fn model(status: EventStatus, capacity: Option<i32>, registered_count: i32) -> events::Model {
        let now = Utc::now().fixed_offset();
        events::Model {
            id: Uuid::new_v4(),
            title: "Export Seminar".into(),
            slug: "export-seminar".into(),
            description: "Go global".into(),
            event_type: EventType::Seminar,
            status,
            location_type: LocationType::Onsite,
            location: Some("Surabaya".into()),
            meeting_url: None,
            cover_image: None,
            start_at: now,
            end_at: None,
            capacity,
            registered_count,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn seat_db(rows_affected: u64, event: events::Model) -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected }])
            .append_query_results([vec![event]])
            .into_connection()
    }

    #[tokio::test]
    async fn full_event_rejects_registration() {
        let event = model(EventStatus::Upcoming, Some(50), 50);
        let db = seat_db(0, event.clone());

        let err = take_seat(&db, event.id).await.unwrap_err();
        assert!(matches!(&err, AppError::Conflict(msg) if msg.contains("fully booked")));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn completed_event_rejects_registration() {
        let event = model(EventStatus::Completed, None, 12);
        let db = seat_db(0, event.clone());

        let err = take_seat(&db, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("finished")));
    }

    #[tokio::test]
    async fn open_event_takes_a_seat() {
        let event = model(EventStatus::Upcoming, Some(50), 11);
        let db = seat_db(1, event.clone());

        let taken = take_seat(&db, event.id).await.unwrap();
        assert_eq!(EventView::from(taken).seats_left, Some(39));
    }

    #[test]
    fn onsite_event_needs_location() {
        let start = Utc::now().fixed_offset();
        assert!(check_schedule(LocationType::Onsite, None, &start, None).is_err());
        assert!(check_schedule(LocationType::Hybrid, Some("  "), &start, None).is_err());
        assert!(check_schedule(LocationType::Onsite, Some("Jakarta"), &start, None).is_ok());
        assert!(check_schedule(LocationType::Online, None, &start, None).is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let start = Utc::now().fixed_offset();
        let end = start - Duration::hours(1);
        assert!(check_schedule(LocationType::Online, None, &start, Some(&end)).is_err());
    }
}
