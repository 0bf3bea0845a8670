// src/dtos/user.rs
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    core::enums::{UserRole, UserStatus},
    dtos::{PHONE_REGEX, USERNAME_REGEX},
    entity::users,
};

// Clone 用于缓存操作时的所有权转移
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub avatar: Option<String>,
    pub last_login_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<users::Model> for UserProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            company: user.company,
            role: user.role,
            status: user.status,
            avatar: user.avatar,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 个人资料修改（`PUT /api/profile`），只覆盖传入的字段
#[derive(Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 100, message = "Full name must be 3-100 characters"))]
    pub full_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number format"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Company name is too long"))]
    pub company: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password cannot be empty"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,

    #[validate(must_match(other = "new_password", message = "Password confirmation does not match"))]
    pub confirm_password: String,
}

// --- 后台用户管理 ---

/// 后台列表行：资料 + 名下文章/评论数量
#[derive(Serialize, Debug, Clone)]
pub struct AdminUserView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub articles_count: u64,
    pub comments_count: u64,
}

#[derive(Debug, Deserialize, Default)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// 匹配 full_name / username / email
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(regex(path = *USERNAME_REGEX, message = "Username must be 3-30 letters, digits or underscores"))]
    pub username: String,

    #[validate(length(min = 3, max = 100, message = "Full name must be 3-100 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: UserRole,

    pub status: Option<UserStatus>,
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 100, message = "Full name must be 3-100 characters"))]
    pub full_name: Option<String>,
    pub status: Option<UserStatus>,
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// 硬删除用户后的级联清理结果
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct DeletedUserSummary {
    pub id: Uuid,
    pub articles_removed: u64,
    pub comments_removed: u64,
}
