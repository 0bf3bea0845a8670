use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::enums::CommentStatus,
    entity::comments,
    utils::pagination::{matches_eq, matches_search, Searchable},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<FixedOffset>,
}

impl From<comments::Model> for CommentView {
    fn from(c: comments::Model) -> Self {
        Self {
            id: c.id,
            article_id: c.article_id,
            user_id: c.user_id,
            name: c.name,
            email: c.email,
            content: c.content,
            status: c.status,
            created_at: c.created_at,
        }
    }
}

impl Searchable for CommentView {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.content.as_str()]
    }
}

/// 公开评论表单
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub article_id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 3, max = 5000, message = "Comment must be 3-5000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct CommentListQuery {
    pub article_id: Option<Uuid>,
    pub status: Option<CommentStatus>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// 内存筛选条件。`search` 需已规范化（见 `normalize_search`）。
#[derive(Debug, Default, Clone)]
pub struct CommentFilter {
    pub status: Option<CommentStatus>,
    pub search: Option<String>,
}

impl CommentFilter {
    pub fn matches(&self, comment: &CommentView) -> bool {
        matches_eq(&comment.status, self.status.as_ref())
            && matches_search(comment, self.search.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub status: CommentStatus,
}

/// 各审核状态的数量（基于筛选前的集合，用于后台标签页角标）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub spam: u64,
}

impl CommentCounts {
    pub fn tally<'a>(comments: impl IntoIterator<Item = &'a CommentView>) -> Self {
        comments.into_iter().fold(Self::default(), |mut acc, c| {
            acc.total += 1;
            match c.status {
                CommentStatus::Pending => acc.pending += 1,
                CommentStatus::Approved => acc.approved += 1,
                CommentStatus::Spam => acc.spam += 1,
            }
            acc
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<CommentView>,
    pub counts: CommentCounts,
}
