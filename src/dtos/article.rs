use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{core::enums::ArticleStatus, entity::articles};

#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub status: ArticleStatus,
    pub author_id: Uuid,
    pub views: i64,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<articles::Model> for ArticleView {
    fn from(a: articles::Model) -> Self {
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            excerpt: a.excerpt,
            content: a.content,
            cover_image: a.cover_image,
            status: a.status,
            author_id: a.author_id,
            views: a.views,
            published_at: a.published_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// 列表行不带正文
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub status: ArticleStatus,
    pub author_id: Uuid,
    pub views: i64,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<articles::Model> for ArticleSummary {
    fn from(a: articles::Model) -> Self {
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            excerpt: a.excerpt,
            cover_image: a.cover_image,
            status: a.status,
            author_id: a.author_id,
            views: a.views,
            published_at: a.published_at,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ArticleListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// 匹配 title / excerpt
    pub search: Option<String>,
    /// 仅后台列表生效，公开列表固定为 published
    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Excerpt is too long"))]
    pub excerpt: Option<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,

    pub cover_image: Option<String>,

    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Excerpt is too long"))]
    pub excerpt: Option<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,

    pub cover_image: Option<String>,

    pub status: Option<ArticleStatus>,
}
