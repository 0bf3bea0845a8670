// src/services/admin_user.rs
//! 后台用户管理：列表（SQL 筛选 + 分页）、创建、修改状态/角色、硬删除。
//!
//! 权限规则：
//! - 不能删除自己、不能修改自己的角色或状态；
//! - super_admin 不可删除；
//! - 非 super_admin 只能管理、分配比自己等级低的角色。

use std::collections::HashMap;

use sea_orm::{sea_query::{Expr, Func, Query}, *};
use uuid::Uuid;

use crate::{
    core::{
        enums::{UserRole, UserStatus},
        error::AppError,
    },
    dtos::{
        auth::Claims,
        user::{
            AdminUserView, CreateUserRequest, DeletedUserSummary, UpdateUserRequest, UserListQuery,
            UserProfile,
        },
    },
    entity::{articles, comments, users},
    services::{registration, user as UserService},
    state::AppState,
    utils::{
        pagination::{fetch_sql_page, like_contains, normalize_search, Page},
        password,
    },
};

/// 发起操作的后台账号
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    /// 以库中的当前账号为准：令牌签发后被降级、停用或删除的账号立即失去后台权限。
    pub fn from_account(profile: &UserProfile) -> Result<Self, AppError> {
        if profile.status != UserStatus::Active {
            tracing::warn!("🚫 {} account {} used a still-valid token", profile.status, profile.username);
            return Err(AppError::Forbidden(format!("Account is {}", profile.status)));
        }
        Ok(Self {
            id: profile.id,
            role: profile.role,
        })
    }

    pub fn require(&self, required: UserRole) -> Result<(), AppError> {
        if self.role.at_least(required) {
            Ok(())
        } else {
            tracing::warn!("🚫 {} access denied: {} ({})", required, self.id, self.role);
            Err(AppError::Forbidden(format!("Requires {} privileges", required)))
        }
    }
}

/// 令牌对应的账号已被删除
fn missing_account(e: AppError) -> AppError {
    match e {
        AppError::NotFound(_) => AppError::AuthError("Account no longer exists".to_string()),
        other => other,
    }
}

/// 按令牌中的用户 ID 加载当前账号（资料缓存优先，角色/状态变更时缓存随之失效）
pub async fn current_actor(state: &AppState, claims: &Claims) -> Result<Actor, AppError> {
    let profile = UserService::get_user_profile(state, claims.user_id()?)
        .await
        .map_err(missing_account)?;
    Actor::from_account(&profile)
}

// --- 纯函数守卫 ---

fn ensure_not_self(actor: &Actor, target_id: Uuid, action: &str) -> Result<(), AppError> {
    if actor.id == target_id {
        tracing::warn!("🚫 {} tried to {} their own account", actor.id, action);
        return Err(AppError::Forbidden(format!("You cannot {} your own account", action)));
    }
    Ok(())
}

/// 非 super_admin 只能管理等级更低的账号
fn ensure_can_manage(actor: &Actor, target_role: UserRole) -> Result<(), AppError> {
    if actor.role == UserRole::SuperAdmin || actor.role.rank() > target_role.rank() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("You cannot manage a {} account", target_role)))
    }
}

/// 非 super_admin 只能分配等级更低的角色
fn ensure_can_assign(actor: &Actor, role: UserRole) -> Result<(), AppError> {
    if actor.role == UserRole::SuperAdmin || actor.role.rank() > role.rank() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("You cannot assign the {} role", role)))
    }
}

async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<users::Model, AppError> {
    users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// 每个用户名下的文章数/评论数
async fn content_counts<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> Result<(HashMap<Uuid, i64>, HashMap<Uuid, i64>), AppError> {
    if ids.is_empty() {
        return Ok((HashMap::new(), HashMap::new()));
    }

    let article_counts: Vec<(Uuid, i64)> = articles::Entity::find()
        .select_only()
        .column(articles::Column::AuthorId)
        .column_as(articles::Column::Id.count(), "author_total")
        .filter(articles::Column::AuthorId.is_in(ids.to_vec()))
        .group_by(articles::Column::AuthorId)
        .into_tuple()
        .all(db)
        .await?;

    let comment_counts: Vec<(Option<Uuid>, i64)> = comments::Entity::find()
        .select_only()
        .column(comments::Column::UserId)
        .column_as(comments::Column::Id.count(), "user_total")
        .filter(comments::Column::UserId.is_in(ids.to_vec()))
        .group_by(comments::Column::UserId)
        .into_tuple()
        .all(db)
        .await?;

    Ok((
        article_counts.into_iter().collect(),
        comment_counts
            .into_iter()
            .filter_map(|(id, count)| id.map(|id| (id, count)))
            .collect(),
    ))
}

/// 用户列表：搜索 full_name/username/email，按角色、状态等值筛选，SQL 分页。
pub async fn list_users<C: ConnectionTrait>(
    db: &C,
    query: &UserListQuery,
    page: u64,
    per_page: u64,
) -> Result<Page<AdminUserView>, AppError> {
    let mut select = users::Entity::find().order_by_desc(users::Column::CreatedAt);

    if let Some(needle) = normalize_search(query.search.as_deref()) {
        let pattern = like_contains(&needle);
        let search = [users::Column::FullName, users::Column::Username, users::Column::Email]
            .into_iter()
            .fold(Condition::any(), |cond, col| {
                cond.add(Expr::expr(Func::lower(Expr::col(col))).like(pattern.as_str()))
            });
        select = select.filter(search);
    }
    if let Some(role) = query.role {
        select = select.filter(users::Column::Role.eq(role));
    }
    if let Some(status) = query.status {
        select = select.filter(users::Column::Status.eq(status));
    }

    let rows = fetch_sql_page(select.paginate(db, per_page), page, per_page).await?;

    let ids: Vec<Uuid> = rows.items.iter().map(|u| u.id).collect();
    let (article_counts, comment_counts) = content_counts(db, &ids).await?;

    Ok(rows.map(|user| {
        let id = user.id;
        AdminUserView {
            profile: user.into(),
            articles_count: article_counts.get(&id).copied().unwrap_or(0) as u64,
            comments_count: comment_counts.get(&id).copied().unwrap_or(0) as u64,
        }
    }))
}

pub async fn get_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<AdminUserView, AppError> {
    let user = find_user(db, id).await?;
    let (article_counts, comment_counts) = content_counts(db, &[id]).await?;

    Ok(AdminUserView {
        profile: user.into(),
        articles_count: article_counts.get(&id).copied().unwrap_or(0) as u64,
        comments_count: comment_counts.get(&id).copied().unwrap_or(0) as u64,
    })
}

/// 后台直接创建账号（不走注册向导）
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    req: CreateUserRequest,
) -> Result<UserProfile, AppError> {
    ensure_can_assign(actor, req.role)?;
    registration::ensure_available(db, &req.username, &req.email).await?;

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(req.username),
        full_name: Set(req.full_name.trim().to_string()),
        email: Set(req.email.to_lowercase()),
        password_hash: Set(password::hash_password(&req.password)?),
        role: Set(req.role),
        status: Set(req.status.unwrap_or(UserStatus::Active)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("👤 {} created user {} as {}", actor.id, user.username, user.role);
    Ok(user.into())
}

/// 修改姓名/状态
pub async fn update_user<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
    req: UpdateUserRequest,
) -> Result<UserProfile, AppError> {
    if req.status.is_some() {
        ensure_not_self(actor, id, "change the status of")?;
    }

    let user = find_user(db, id).await?;
    if user.id != actor.id {
        ensure_can_manage(actor, user.role)?;
    }

    let mut active: users::ActiveModel = user.into();
    if let Some(full_name) = req.full_name {
        active.full_name = Set(full_name.trim().to_string());
    }
    if let Some(status) = req.status {
        active.status = Set(status);
    }

    let user = active.update(db).await?;
    tracing::info!("✏️ {} updated user {} (status: {})", actor.id, user.username, user.status);
    Ok(user.into())
}

pub async fn update_role<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
    role: UserRole,
) -> Result<UserProfile, AppError> {
    ensure_not_self(actor, id, "change the role of")?;

    let user = find_user(db, id).await?;
    ensure_can_manage(actor, user.role)?;
    ensure_can_assign(actor, role)?;

    let previous = user.role;
    let mut active: users::ActiveModel = user.into();
    active.role = Set(role);
    let user = active.update(db).await?;

    tracing::info!("🎖️ {} changed role of {}: {} -> {}", actor.id, user.username, previous, role);
    Ok(user.into())
}

/// 硬删除用户，并在同一事务中删除其评论、其文章下的评论和其文章。
///
/// 删除自己在访问数据库之前就被拒绝。
pub async fn delete_user(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
) -> Result<DeletedUserSummary, AppError> {
    ensure_not_self(actor, id, "delete")?;

    let user = find_user(db, id).await?;
    if user.role == UserRole::SuperAdmin {
        tracing::warn!("🚫 {} tried to delete super admin {}", actor.id, user.username);
        return Err(AppError::Forbidden("Super admin accounts cannot be deleted".to_string()));
    }
    ensure_can_manage(actor, user.role)?;

    let txn = db.begin().await?;

    let authored_articles = Query::select()
        .column(articles::Column::Id)
        .from(articles::Entity)
        .and_where(articles::Column::AuthorId.eq(id))
        .to_owned();

    let comments_removed = comments::Entity::delete_many()
        .filter(
            Condition::any()
                .add(comments::Column::UserId.eq(id))
                .add(comments::Column::ArticleId.in_subquery(authored_articles)),
        )
        .exec(&txn)
        .await?
        .rows_affected;

    let articles_removed = articles::Entity::delete_many()
        .filter(articles::Column::AuthorId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    users::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        "🗑️ {} deleted user {} ({} articles, {} comments)",
        actor.id,
        user.username,
        articles_removed,
        comments_removed
    );

    Ok(DeletedUserSummary {
        id,
        articles_removed,
        comments_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: Uuid, role: UserRole) -> users::Model {
        users::Model {
            id,
            username: format!("user_{}", &id.simple().to_string()[..6]),
            full_name: "Dewi Lestari".into(),
            email: format!("{}@example.co.id", id.simple()),
            password_hash: "x".into(),
            phone: None,
            company: None,
            role,
            status: UserStatus::Active,
            avatar: None,
            last_login_at: None,
            created_at: Utc::now().fixed_offset(),
            updated_at: Utc::now().fixed_offset(),
        }
    }

    fn admin() -> Actor {
        Actor { id: Uuid::new_v4(), role: UserRole::Admin }
    }

    #[tokio::test]
    async fn deleting_yourself_is_rejected_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let actor = admin();

        let err = delete_user(&db, &actor, actor.id).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn super_admin_cannot_be_deleted() {
        let target = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(target, UserRole::SuperAdmin)]])
            .into_connection();
        let actor = Actor { id: Uuid::new_v4(), role: UserRole::SuperAdmin };

        let err = delete_user(&db, &actor, target).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden(msg) if msg.contains("Super admin")));
        // 只执行了查找目标用户的那一条查询
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn admin_cannot_delete_another_admin() {
        let target = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(target, UserRole::Admin)]])
            .into_connection();

        let err = delete_user(&db, &admin(), target).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_cascades_inside_transaction() {
        let target = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(target, UserRole::Editor)]])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 7 },
                MockExecResult { last_insert_id: 0, rows_affected: 2 },
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
            ])
            .into_connection();

        let summary = delete_user(&db, &admin(), target).await.unwrap();

        assert_eq!(
            summary,
            DeletedUserSummary { id: target, articles_removed: 2, comments_removed: 7 }
        );
    }

    #[tokio::test]
    async fn changing_own_role_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let actor = admin();

        let err = update_role(&db, &actor, actor.id, UserRole::SuperAdmin).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    fn count_row(total: i64) -> std::collections::BTreeMap<String, Value> {
        std::collections::BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(total)))])
    }

    #[tokio::test]
    async fn list_combines_search_role_status_with_counts() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![user(id, UserRole::Editor)]])
            .append_query_results([vec![std::collections::BTreeMap::from([
                ("author_id".to_string(), Value::from(id)),
                ("author_total".to_string(), Value::BigInt(Some(3))),
            ])]])
            .append_query_results([vec![std::collections::BTreeMap::from([
                ("user_id".to_string(), Value::from(id)),
                ("user_total".to_string(), Value::BigInt(Some(5))),
            ])]])
            .into_connection();

        let query = UserListQuery {
            search: Some("  DEWI ".into()),
            role: Some(UserRole::Editor),
            status: Some(UserStatus::Active),
            ..Default::default()
        };
        let page = list_users(&db, &query, 1, 10).await.unwrap();

        assert_eq!(page.meta.total, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].articles_count, 3);
        assert_eq!(page.items[0].comments_count, 5);

        let log = db.into_transaction_log();
        let count_stmt = format!("{:?}", log[0]);
        assert!(count_stmt.contains("LIKE"));
        assert!(count_stmt.contains("%dewi%"));
        assert!(count_stmt.contains("editor"));
        assert!(count_stmt.contains("active"));
    }

    #[tokio::test]
    async fn huge_page_number_returns_empty_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(23)]])
            .into_connection();

        let page = list_users(&db, &UserListQuery::default(), u64::MAX / 2, 10).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.meta.total, 23);
        assert_eq!(page.meta.total_pages, 3);
        // 只有计数查询，没有越界的数据查询
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[test]
    fn suspended_account_loses_back_office_access() {
        let mut model = user(Uuid::new_v4(), UserRole::Admin);
        model.status = UserStatus::Suspended;
        let profile = UserProfile::from(model);

        let err = Actor::from_account(&profile).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(msg) if msg.contains("suspended")));
    }

    #[test]
    fn demoted_account_acts_with_stored_role() {
        // 令牌里仍是 admin，库中已被降为普通用户
        let profile = UserProfile::from(user(Uuid::new_v4(), UserRole::User));

        let actor = Actor::from_account(&profile).unwrap();
        assert_eq!(actor.role, UserRole::User);
        assert!(actor.require(UserRole::Admin).is_err());
        assert!(actor.require(UserRole::Editor).is_err());
        assert!(ensure_can_manage(&actor, UserRole::Editor).is_err());
    }

    #[test]
    fn deleted_account_is_unauthenticated() {
        let err = missing_account(AppError::NotFound("User not found".into()));
        assert!(matches!(err, AppError::AuthError(_)));

        let err = missing_account(AppError::Forbidden("x".into()));
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn only_super_admin_assigns_peer_roles() {
        let admin = admin();
        assert!(ensure_can_assign(&admin, UserRole::Editor).is_ok());
        assert!(ensure_can_assign(&admin, UserRole::Admin).is_err());

        let root = Actor { id: Uuid::new_v4(), role: UserRole::SuperAdmin };
        assert!(ensure_can_assign(&root, UserRole::SuperAdmin).is_ok());
        assert!(ensure_can_manage(&root, UserRole::Admin).is_ok());
    }
}
