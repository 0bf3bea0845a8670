// src/core/enums.rs

use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 用户角色枚举
/// 同时支持：
/// 1. 数据库映射 (SeaORM) - 存为字符串 "super_admin" / "admin" / "editor" / "user"
/// 2. JSON 序列化 (Serde) - 前端交互
/// 3. 字符串转换 (Strum) - 代码逻辑判断（JWT claims 中的 role 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum UserRole {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,

    #[sea_orm(string_value = "admin")]
    Admin,

    #[sea_orm(string_value = "editor")]
    Editor,

    #[sea_orm(string_value = "user")]
    User,
}

impl UserRole {
    /// 权限等级，数值越大权限越高
    pub fn rank(self) -> u8 {
        match self {
            UserRole::SuperAdmin => 3,
            UserRole::Admin => 2,
            UserRole::Editor => 1,
            UserRole::User => 0,
        }
    }

    pub fn at_least(self, required: UserRole) -> bool {
        self.rank() >= required.rank()
    }

    /// 后台工作人员：编辑及以上
    pub fn is_staff(self) -> bool {
        self.at_least(UserRole::Editor)
    }
}

/// 账号状态。只有 active 可以登录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum UserStatus {
    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "inactive")]
    Inactive,

    #[sea_orm(string_value = "suspended")]
    Suspended,

    #[sea_orm(string_value = "banned")]
    Banned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ArticleStatus {
    #[sea_orm(string_value = "draft")]
    Draft,

    #[sea_orm(string_value = "published")]
    Published,

    #[sea_orm(string_value = "archived")]
    Archived,
}

/// 评论审核状态：pending -> approved / spam，三者之间可任意切换
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CommentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "spam")]
    Spam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EventType {
    #[sea_orm(string_value = "workshop")]
    Workshop,

    #[sea_orm(string_value = "seminar")]
    Seminar,

    #[sea_orm(string_value = "webinar")]
    Webinar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EventStatus {
    #[sea_orm(string_value = "upcoming")]
    Upcoming,

    #[sea_orm(string_value = "ongoing")]
    Ongoing,

    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum LocationType {
    #[sea_orm(string_value = "online")]
    Online,

    #[sea_orm(string_value = "onsite")]
    Onsite,

    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_claims_string() {
        assert_eq!(UserRole::SuperAdmin.to_string(), "super_admin");
        assert_eq!(UserRole::from_str("super_admin").unwrap(), UserRole::SuperAdmin);
        assert!(UserRole::from_str("root").is_err());
    }

    #[test]
    fn role_ranking() {
        assert!(UserRole::SuperAdmin.at_least(UserRole::Admin));
        assert!(UserRole::Editor.is_staff());
        assert!(!UserRole::User.is_staff());
        assert!(!UserRole::Editor.at_least(UserRole::Admin));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&CommentStatus::Spam).unwrap();
        assert_eq!(json, "\"spam\"");
        let parsed: LocationType = serde_json::from_str("\"hybrid\"").unwrap();
        assert_eq!(parsed, LocationType::Hybrid);
    }
}
