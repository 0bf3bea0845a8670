// src/services/article.rs
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{sea_query::{Expr, Func}, *};
use uuid::Uuid;

use crate::{
    core::{constants::REDIS_KEY_STATS, enums::ArticleStatus, error::AppError},
    dtos::article::{ArticleListQuery, ArticleSummary, ArticleView, CreateArticleRequest, UpdateArticleRequest},
    entity::articles,
    state::AppState,
    utils::{
        cache,
        pagination::{fetch_sql_page, like_contains, normalize_search, Page},
        slug::{slugify, with_suffix, IdOrSlug},
    },
};

/// 文章列表。`public` 为 true 时只返回已发布文章并按发布时间倒序。
pub async fn list_articles(
    db: &DatabaseConnection,
    query: &ArticleListQuery,
    public: bool,
    page: u64,
    per_page: u64,
) -> Result<Page<ArticleSummary>, AppError> {
    let mut select = articles::Entity::find();

    if public {
        select = select
            .filter(articles::Column::Status.eq(ArticleStatus::Published))
            .order_by_desc(articles::Column::PublishedAt);
    } else {
        if let Some(status) = query.status {
            select = select.filter(articles::Column::Status.eq(status));
        }
        select = select.order_by_desc(articles::Column::UpdatedAt);
    }

    if let Some(needle) = normalize_search(query.search.as_deref()) {
        let pattern = like_contains(&needle);
        select = select.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(articles::Column::Title))).like(pattern.as_str()))
                .add(Expr::expr(Func::lower(Expr::col(articles::Column::Excerpt))).like(pattern.as_str())),
        );
    }

    let page = fetch_sql_page(select.paginate(db, per_page), page, per_page).await?;
    Ok(page.map(ArticleSummary::from))
}

pub async fn find_article(db: &DatabaseConnection, key: IdOrSlug<'_>) -> Result<articles::Model, AppError> {
    let found = match key {
        IdOrSlug::Id(id) => articles::Entity::find_by_id(id).one(db).await?,
        IdOrSlug::Slug(slug) => {
            articles::Entity::find()
                .filter(articles::Column::Slug.eq(slug))
                .one(db)
                .await?
        }
    };
    found.ok_or(AppError::NotFound("Article not found".to_string()))
}

/// 读取单篇文章。访客只能看到已发布文章，并计一次浏览。
pub async fn get_article(db: &DatabaseConnection, key: IdOrSlug<'_>, staff: bool) -> Result<ArticleView, AppError> {
    let mut article = find_article(db, key).await?;

    if !staff {
        if article.status != ArticleStatus::Published {
            return Err(AppError::NotFound("Article not found".to_string()));
        }
        articles::Entity::update_many()
            .col_expr(articles::Column::Views, Expr::col(articles::Column::Views).add(1))
            .filter(articles::Column::Id.eq(article.id))
            .exec(db)
            .await?;
        article.views += 1;
    }

    Ok(article.into())
}

/// 发布时间只在第一次进入 published 时记录，之后下线再上线都保留原值
fn published_at_after(
    previous: Option<DateTime<FixedOffset>>,
    status: ArticleStatus,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    previous.or((status == ArticleStatus::Published).then_some(now))
}

async fn unique_slug(db: &DatabaseConnection, title: &str, exclude: Option<Uuid>) -> Result<String, AppError> {
    let base = slugify(title);
    let mut select = articles::Entity::find().filter(articles::Column::Slug.eq(&base));
    if let Some(id) = exclude {
        select = select.filter(articles::Column::Id.ne(id));
    }
    Ok(if select.count(db).await? > 0 { with_suffix(&base) } else { base })
}

pub async fn create_article(
    state: &AppState,
    author_id: Uuid,
    req: CreateArticleRequest,
) -> Result<ArticleView, AppError> {
    let status = req.status.unwrap_or(ArticleStatus::Draft);
    let slug = unique_slug(&*state.db, &req.title, None).await?;

    let article = articles::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(req.title.trim().to_string()),
        slug: Set(slug),
        excerpt: Set(req.excerpt),
        content: Set(req.content),
        cover_image: Set(req.cover_image),
        status: Set(status),
        author_id: Set(author_id),
        views: Set(0),
        published_at: Set(published_at_after(None, status, Utc::now().fixed_offset())),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    cache::del(&state.redis, &[REDIS_KEY_STATS]).await;
    tracing::info!("📝 Article created: {} ({})", article.slug, article.status);
    Ok(article.into())
}

pub async fn update_article(
    state: &AppState,
    id: Uuid,
    req: UpdateArticleRequest,
) -> Result<ArticleView, AppError> {
    let article = find_article(&*state.db, IdOrSlug::Id(id)).await?;
    let previous_published_at = article.published_at;
    let mut active: articles::ActiveModel = article.into();

    if let Some(title) = req.title {
        active.slug = Set(unique_slug(&*state.db, &title, Some(id)).await?);
        active.title = Set(title.trim().to_string());
    }
    if let Some(excerpt) = req.excerpt {
        active.excerpt = Set(Some(excerpt));
    }
    if let Some(content) = req.content {
        active.content = Set(content);
    }
    if let Some(cover) = req.cover_image {
        active.cover_image = Set(Some(cover));
    }
    if let Some(status) = req.status {
        active.published_at = Set(published_at_after(previous_published_at, status, Utc::now().fixed_offset()));
        active.status = Set(status);
    }

    let article = active.update(&*state.db).await?;
    cache::del(&state.redis, &[REDIS_KEY_STATS]).await;
    Ok(article.into())
}

/// 删除文章（评论随外键级联删除）
pub async fn delete_article(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let result = articles::Entity::delete_by_id(id).exec(&*state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Article not found".to_string()));
    }

    cache::del(&state.redis, &[REDIS_KEY_STATS]).await;
    tracing::info!("🗑️ Article deleted: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn article(status: ArticleStatus, views: i64) -> articles::Model {
        let now = Utc::now().fixed_offset();
        articles::Model {
            id: Uuid::new_v4(),
            title: "Company Profile 2026".into(),
            slug: "company-profile-2026".into(),
            excerpt: None,
            content: "Lorem ipsum".into(),
            cover_image: None,
            status,
            author_id: Uuid::new_v4(),
            views,
            published_at: (status == ArticleStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(total: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(total)))])
    }

    #[tokio::test]
    async fn drafts_are_hidden_from_visitors() {
        let draft = article(ArticleStatus::Draft, 0);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft.clone()]])
            .into_connection();

        let err = get_article(&db, IdOrSlug::Id(draft.id), false).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        // 没有计浏览量
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn staff_can_preview_drafts_without_counting_views() {
        let draft = article(ArticleStatus::Draft, 0);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft.clone()]])
            .into_connection();

        let view = get_article(&db, IdOrSlug::Id(draft.id), true).await.unwrap();

        assert_eq!(view.status, ArticleStatus::Draft);
        assert_eq!(view.views, 0);
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn public_read_increments_views() {
        let published = article(ArticleStatus::Published, 41);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![published.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .into_connection();

        let view = get_article(&db, IdOrSlug::Slug("company-profile-2026"), false).await.unwrap();

        assert_eq!(view.views, 42);
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("UPDATE"));
    }

    #[test]
    fn republishing_keeps_first_publish_time() {
        let now = Utc::now().fixed_offset();
        let first = now - Duration::days(30);

        assert_eq!(published_at_after(None, ArticleStatus::Draft, now), None);
        assert_eq!(published_at_after(None, ArticleStatus::Published, now), Some(now));
        assert_eq!(published_at_after(Some(first), ArticleStatus::Published, now), Some(first));
        assert_eq!(published_at_after(Some(first), ArticleStatus::Archived, now), Some(first));
    }

    #[tokio::test]
    async fn public_list_only_counts_published() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(0)]])
            .into_connection();

        let page = list_articles(&db, &ArticleListQuery::default(), true, 1, 10).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_pages, 0);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("published"));
    }

    #[tokio::test]
    async fn huge_page_number_is_an_empty_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(5)]])
            .into_connection();

        let page = list_articles(&db, &ArticleListQuery::default(), true, i64::MAX as u64, 10)
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.meta.total, 5);
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
