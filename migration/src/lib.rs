pub use sea_orm_migration::prelude::*;

mod m20251229_063323_create_users;
mod m20260105_091200_create_articles;
mod m20260105_091500_create_comments;
mod m20260112_140000_create_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        // 顺序即依赖顺序：articles 依赖 users，comments 依赖 articles 与 users
        vec![
            Box::new(m20251229_063323_create_users::Migration),
            Box::new(m20260105_091200_create_articles::Migration),
            Box::new(m20260105_091500_create_comments::Migration),
            Box::new(m20260112_140000_create_events::Migration),
        ]
    }
}
