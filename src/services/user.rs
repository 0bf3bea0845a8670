// src/services/user.rs
use sea_orm::*;
use uuid::Uuid;

use crate::{
    core::{
        constants::{CACHE_EXPIRE_USER_PROFILE, REDIS_PREFIX_USER_PROFILE},
        error::AppError,
    },
    dtos::user::{ChangePasswordRequest, UpdateProfileRequest, UserProfile},
    entity::users,
    state::AppState,
    utils::{cache, password},
};

pub fn profile_key(user_id: &Uuid) -> String {
    format!("{}{}", REDIS_PREFIX_USER_PROFILE, user_id)
}

async fn find_user(db: &DatabaseConnection, user_id: Uuid) -> Result<users::Model, AppError> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// 获取当前用户资料（缓存优先）。
pub async fn get_user_profile(state: &AppState, user_id: Uuid) -> Result<UserProfile, AppError> {
    let key = profile_key(&user_id);
    let db = state.db.clone();

    cache::get_or_fetch(&state.redis, &key, CACHE_EXPIRE_USER_PROFILE, || async move {
        Ok(find_user(&db, user_id).await?.into())
    })
    .await
}

/// 更新个人资料，只覆盖传入的字段；更新后同步写缓存（Write Through）。
pub async fn update_user_profile(
    state: &AppState,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> Result<UserProfile, AppError> {
    let user = find_user(&*state.db, user_id).await?;

    if let Some(email) = req.email.as_deref().map(str::to_lowercase) {
        if email != user.email {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(&email))
                .filter(users::Column::Id.ne(user_id))
                .count(&*state.db)
                .await?;
            if taken > 0 {
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
        }
    }

    let mut user_active: users::ActiveModel = user.into();

    if let Some(full_name) = req.full_name {
        user_active.full_name = Set(full_name.trim().to_string());
    }
    if let Some(email) = req.email {
        user_active.email = Set(email.to_lowercase());
    }
    if let Some(phone) = req.phone {
        user_active.phone = Set(Some(phone));
    }
    if let Some(company) = req.company {
        user_active.company = Set(Some(company));
    }

    let profile: UserProfile = user_active.update(&*state.db).await?.into();
    cache::set(&state.redis, &profile_key(&user_id), &profile, CACHE_EXPIRE_USER_PROFILE).await;

    Ok(profile)
}

/// 修改密码：先校验当前密码
pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    req: ChangePasswordRequest,
) -> Result<(), AppError> {
    let user = find_user(&*state.db, user_id).await?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::BadRequest("Current password is incorrect".to_string()));
    }
    if req.new_password == req.current_password {
        return Err(AppError::BadRequest("New password must differ from the current one".to_string()));
    }

    let mut user_active: users::ActiveModel = user.into();
    user_active.password_hash = Set(password::hash_password(&req.new_password)?);
    user_active.update(&*state.db).await?;

    tracing::info!("🔒 Password changed for {}", user_id);
    Ok(())
}

/// 上传头像后写回用户记录
pub async fn set_avatar(state: &AppState, user_id: Uuid, url: String) -> Result<UserProfile, AppError> {
    let user = find_user(&*state.db, user_id).await?;

    let mut user_active: users::ActiveModel = user.into();
    user_active.avatar = Set(Some(url));

    let profile: UserProfile = user_active.update(&*state.db).await?.into();
    cache::set(&state.redis, &profile_key(&user_id), &profile, CACHE_EXPIRE_USER_PROFILE).await;

    Ok(profile)
}
