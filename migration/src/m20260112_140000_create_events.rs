use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(ColumnDef::new(Events::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(ColumnDef::new(Events::EventType).string().not_null())
                    .col(ColumnDef::new(Events::Status).string().not_null().default("upcoming"))
                    .col(ColumnDef::new(Events::LocationType).string().not_null())
                    .col(ColumnDef::new(Events::Location).string())
                    .col(ColumnDef::new(Events::MeetingUrl).string())
                    .col(ColumnDef::new(Events::CoverImage).string())
                    .col(ColumnDef::new(Events::StartAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Events::EndAt).timestamp_with_time_zone())
                    // NULL 表示不限名额
                    .col(ColumnDef::new(Events::Capacity).integer())
                    .col(ColumnDef::new(Events::RegisteredCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Events::IsFeatured).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE TRIGGER set_timestamp
             BEFORE UPDATE ON events
             FOR EACH ROW
             EXECUTE PROCEDURE update_timestamp();",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TRIGGER IF EXISTS set_timestamp ON events;").await?;

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Slug,
    Description,
    EventType,
    Status,
    LocationType,
    Location,
    MeetingUrl,
    CoverImage,
    StartAt,
    EndAt,
    Capacity,
    RegisteredCount,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}
