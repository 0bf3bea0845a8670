use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::enums::{EventStatus, EventType, LocationType},
    entity::events,
    utils::pagination::{matches_eq, matches_search, Searchable},
};

/// 活动对外视图。整表缓存在 Redis 中，因此需要 Deserialize。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub event_type: EventType,
    pub status: EventStatus,
    pub location_type: LocationType,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub cover_image: Option<String>,
    pub start_at: DateTime<FixedOffset>,
    pub end_at: Option<DateTime<FixedOffset>>,
    pub capacity: Option<i32>,
    pub registered_count: i32,
    /// 剩余名额，不限名额时为 None
    pub seats_left: Option<i32>,
    pub is_featured: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<events::Model> for EventView {
    fn from(e: events::Model) -> Self {
        Self {
            seats_left: e.capacity.map(|cap| (cap - e.registered_count).max(0)),
            id: e.id,
            title: e.title,
            slug: e.slug,
            description: e.description,
            event_type: e.event_type,
            status: e.status,
            location_type: e.location_type,
            location: e.location,
            meeting_url: e.meeting_url,
            cover_image: e.cover_image,
            start_at: e.start_at,
            end_at: e.end_at,
            capacity: e.capacity,
            registered_count: e.registered_count,
            is_featured: e.is_featured,
            created_at: e.created_at,
        }
    }
}

impl Searchable for EventView {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        if let Some(location) = &self.location {
            fields.push(location.as_str());
        }
        fields
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct EventListQuery {
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub location_type: Option<LocationType>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// 内存筛选条件，由 `EventListQuery` 转换而来
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub location_type: Option<LocationType>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &EventView) -> bool {
        matches_eq(&event.event_type, self.event_type.as_ref())
            && matches_eq(&event.status, self.status.as_ref())
            && matches_eq(&event.location_type, self.location_type.as_ref())
            && matches_eq(&event.is_featured, self.featured.as_ref())
            && matches_search(event, self.search.as_deref())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    pub event_type: EventType,

    pub status: Option<EventStatus>,

    pub location_type: LocationType,

    #[validate(length(max = 255, message = "Location is too long"))]
    pub location: Option<String>,

    #[validate(url(message = "Invalid meeting URL"))]
    pub meeting_url: Option<String>,

    pub cover_image: Option<String>,

    pub start_at: DateTime<FixedOffset>,

    pub end_at: Option<DateTime<FixedOffset>>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,

    #[serde(default)]
    pub is_featured: bool,
}

/// 局部更新；`{ "is_featured": true }` 即为切换推荐位
#[derive(Debug, Deserialize, Validate, Default)]
pub struct UpdateEventRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,

    pub event_type: Option<EventType>,

    pub status: Option<EventStatus>,

    pub location_type: Option<LocationType>,

    #[validate(length(max = 255, message = "Location is too long"))]
    pub location: Option<String>,

    #[validate(url(message = "Invalid meeting URL"))]
    pub meeting_url: Option<String>,

    pub cover_image: Option<String>,

    pub start_at: Option<DateTime<FixedOffset>>,

    pub end_at: Option<DateTime<FixedOffset>>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,

    pub is_featured: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EventRegistration {
    pub event_id: Uuid,
    pub registered_count: i32,
    pub seats_left: Option<i32>,
}
