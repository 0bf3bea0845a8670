// src/services/comment.rs
//! 评论审核。
//!
//! 后台列表先按文章把评论整批取出，再在内存中统计各状态数量、筛选并分页：
//! 同一次查询同时得到标签页角标（counts）和当前页数据。

use sea_orm::*;
use uuid::Uuid;

use crate::{
    core::{
        enums::{ArticleStatus, CommentStatus},
        error::AppError,
    },
    dtos::comment::{
        CommentCounts, CommentFilter, CommentListQuery, CommentView, CreateCommentRequest,
    },
    entity::{articles, comments},
    services::article::find_article,
    utils::{
        pagination::{normalize_search, paginate, Page},
        slug::IdOrSlug,
    },
};

/// 在已取出的集合上筛选，保持原有顺序
pub fn filter_comments(all: &[CommentView], filter: &CommentFilter) -> Vec<CommentView> {
    all.iter().filter(|c| filter.matches(c)).cloned().collect()
}

pub async fn list_for_admin(
    db: &DatabaseConnection,
    query: &CommentListQuery,
    page: u64,
    per_page: u64,
) -> Result<(Page<CommentView>, CommentCounts), AppError> {
    let mut select = comments::Entity::find().order_by_desc(comments::Column::CreatedAt);
    if let Some(article_id) = query.article_id {
        select = select.filter(comments::Column::ArticleId.eq(article_id));
    }

    let all: Vec<CommentView> = select.all(db).await?.into_iter().map(CommentView::from).collect();
    let counts = CommentCounts::tally(&all);

    let filter = CommentFilter {
        status: query.status,
        search: normalize_search(query.search.as_deref()),
    };
    let page = paginate(filter_comments(&all, &filter), page, per_page);

    Ok((page, counts))
}

/// 文章详情页下展示的已审核评论，按时间正序
pub async fn list_approved(
    db: &DatabaseConnection,
    article: IdOrSlug<'_>,
    page: u64,
    per_page: u64,
) -> Result<Page<CommentView>, AppError> {
    let article = find_article(db, article).await?;
    if article.status != ArticleStatus::Published {
        return Err(AppError::NotFound("Article not found".to_string()));
    }

    let approved: Vec<CommentView> = comments::Entity::find()
        .filter(comments::Column::ArticleId.eq(article.id))
        .filter(comments::Column::Status.eq(CommentStatus::Approved))
        .order_by_asc(comments::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();

    Ok(paginate(approved, page, per_page))
}

/// 公开评论表单提交，新评论一律进入待审核
pub async fn create_comment(
    db: &DatabaseConnection,
    user_id: Option<Uuid>,
    req: CreateCommentRequest,
) -> Result<CommentView, AppError> {
    let article = articles::Entity::find_by_id(req.article_id)
        .one(db)
        .await?
        .filter(|a| a.status == ArticleStatus::Published)
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    let comment = comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        article_id: Set(article.id),
        user_id: Set(user_id),
        name: Set(req.name.trim().to_string()),
        email: Set(req.email.to_lowercase()),
        content: Set(req.content.trim().to_string()),
        status: Set(CommentStatus::Pending),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("💬 New comment on {} awaiting moderation", article.slug);
    Ok(comment.into())
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: Uuid,
    status: CommentStatus,
) -> Result<CommentView, AppError> {
    let comment = comments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    let previous = comment.status;
    let mut active: comments::ActiveModel = comment.into();
    active.status = Set(status);
    let comment = active.update(db).await?;

    tracing::info!("🛡️ Comment {} moderated: {} -> {}", id, previous, status);
    Ok(comment.into())
}

pub async fn delete_comment(db: &DatabaseConnection, id: Uuid) -> Result<(), AppError> {
    let result = comments::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }
    tracing::info!("🗑️ Comment deleted: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn fixture() -> Vec<CommentView> {
        let article_id = Uuid::new_v4();
        let base = Utc::now().fixed_offset();
        [
            ("Andi", "Great seminar recap!", CommentStatus::Approved),
            ("Cheap Pills", "buy now at spam.example", CommentStatus::Spam),
            ("Rina", "When is the next workshop?", CommentStatus::Pending),
            ("Casino Bot", "win big today", CommentStatus::Spam),
            ("Yusuf", "Terima kasih, sangat membantu", CommentStatus::Approved),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, content, status))| CommentView {
            id: Uuid::new_v4(),
            article_id,
            user_id: None,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            content: content.to_string(),
            status,
            created_at: base - Duration::minutes(i as i64),
        })
        .collect()
    }

    #[test]
    fn spam_filter_returns_exact_subset_in_order() {
        let all = fixture();
        let filter = CommentFilter { status: Some(CommentStatus::Spam), search: None };

        let spam = filter_comments(&all, &filter);

        let expected: Vec<Uuid> = all
            .iter()
            .filter(|c| c.status == CommentStatus::Spam)
            .map(|c| c.id)
            .collect();
        assert_eq!(spam.iter().map(|c| c.id).collect::<Vec<_>>(), expected);
        assert_eq!(spam[0].name, "Cheap Pills");
        assert_eq!(spam[1].name, "Casino Bot");
    }

    #[test]
    fn search_combines_with_status() {
        let all = fixture();
        let filter = CommentFilter {
            status: Some(CommentStatus::Approved),
            search: normalize_search(Some("TERIMA")),
        };

        let hits = filter_comments(&all, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Yusuf");
    }

    #[test]
    fn counts_cover_whole_collection() {
        let counts = CommentCounts::tally(&fixture());
        assert_eq!(counts, CommentCounts { total: 5, pending: 1, approved: 2, spam: 2 });
    }

    #[tokio::test]
    async fn deleting_missing_comment_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .into_connection();

        let err = delete_comment(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
