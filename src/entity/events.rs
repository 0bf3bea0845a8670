use sea_orm::entity::prelude::*;

use crate::core::enums::{EventStatus, EventType, LocationType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub event_type: EventType,
    pub status: EventStatus,
    pub location_type: LocationType,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub cover_image: Option<String>,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: Option<DateTimeWithTimeZone>,
    /// None 表示不限名额
    pub capacity: Option<i32>,
    pub registered_count: i32,
    pub is_featured: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
