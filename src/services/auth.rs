use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use redis::AsyncCommands;
use sea_orm::*;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    core::{
        config::Config,
        constants::*,
        enums::{UserRole, UserStatus},
        error::AppError,
    },
    dtos::{
        auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
        user::UserProfile,
    },
    entity::users,
    services::registration,
    state::AppState,
    utils::{limiter::check_rate_limit, password},
};

// --- 辅助函数：密钥生成、令牌处理 ---
#[inline]
fn refresh_key(token: &str) -> String {
    format!("{}{}", REDIS_PREFIX_REFRESH, token)
}
#[inline]
fn blacklist_key(token: &str) -> String {
    format!("{}{}", REDIS_PREFIX_BLACKLIST, token)
}

/// 生成访问令牌（Access Token）。纯函数，根据用户信息签发 JWT。
fn generate_access_token(
    config: &Config,
    user_id: &str,
    username: &str,
    role: UserRole,
) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = (now + Duration::seconds(config.jwt_expiration)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token generation failed: {}", e)))
}

/// 校验签名与有效期并取出声明。提取器、角色守卫和登出共用。
pub fn decode_claims(config: &Config, token: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());

    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("⚠️ Token validation failed: {}", e);
            AppError::AuthError("Invalid or expired token".to_string())
        })
}

/// 只有 active 账号可以登录或刷新令牌
fn ensure_active(user: &users::Model) -> Result<(), AppError> {
    match user.status {
        UserStatus::Active => Ok(()),
        status => Err(AppError::Forbidden(format!("Account is {}", status))),
    }
}

/// 公开注册（注册向导最后一步提交）。
///
/// 依次校验三步的字段（第一个失败的步骤直接返回），检查用户名/邮箱唯一，
/// 以普通用户、active 状态创建账号。
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<UserProfile, AppError> {
    registration::validate_all(&req)?;
    registration::ensure_available(&*state.db, &req.account.username, &req.account.email).await?;

    let password_hash = password::hash_password(&req.security.password)?;

    let new_user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(req.account.username),
        full_name: Set(req.account.full_name.trim().to_string()),
        email: Set(req.account.email.to_lowercase()),
        password_hash: Set(password_hash),
        phone: Set(req.profile.phone),
        company: Set(req.profile.company),
        role: Set(UserRole::User),
        status: Set(UserStatus::Active),
        ..Default::default()
    };

    // 唯一性检查与插入之间存在竞争窗口，唯一索引兜底
    let user = new_user.insert(&*state.db).await.map_err(|e| {
        if e.to_string().contains("duplicate key") {
            AppError::Conflict("Username or email already exists".to_string())
        } else {
            AppError::DatabaseError(e)
        }
    })?;

    tracing::info!("🆕 User registered: {} ({})", user.username, user.id);
    Ok(user.into())
}

/// 用户登录服务，支持用户名或邮箱登录。
/// 刷新令牌存储在 Redis 中，用于后续的令牌刷新操作。
pub async fn login(state: &AppState, req: LoginRequest) -> Result<LoginResponse, AppError> {
    let account = req.account.trim();

    // 找不到用户与密码错误返回相同的错误，避免泄露账号是否存在
    let user = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Username.eq(account))
                .add(users::Column::Email.eq(account.to_lowercase())),
        )
        .one(&*state.db)
        .await?
        .ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    ensure_active(&user)?;

    let access_token = generate_access_token(&state.config, &user.id.to_string(), &user.username, user.role)?;
    let refresh_token = Uuid::new_v4().to_string();

    let mut redis = state.redis.clone();
    let _: () = redis
        .set_ex(
            refresh_key(&refresh_token),
            user.id.to_string(),
            state.config.refresh_token_expiration as u64,
        )
        .await?;

    // 记录最后登录时间，失败不影响登录
    let mut active: users::ActiveModel = user.into();
    active.last_login_at = Set(Some(Utc::now().fixed_offset()));
    let user = match active.clone().update(&*state.db).await {
        Ok(updated) => updated,
        Err(e) => {
            tracing::warn!("⚠️ Failed to record last login: {}", e);
            active.try_into_model()?
        }
    };

    tracing::info!("🔑 Login: {}", user.username);

    Ok(LoginResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt_expiration,
        user: Some(user.into()),
    })
}

/// 令牌刷新服务：刷新令牌一次性使用（Token Rotation），
/// 旧令牌在宽限期内标记为已使用，宽限期内的并发刷新会被识别为重用。
pub async fn refresh(state: &AppState, old_token: String) -> Result<LoginResponse, AppError> {
    let redis_key_old = refresh_key(&old_token);
    let mut redis = state.redis.clone();

    let user_id_raw: String = redis
        .get::<_, Option<String>>(&redis_key_old)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid or expired refresh token".to_string()))?;

    let (user_id, is_used) = match user_id_raw.strip_prefix(REDIS_PREFIX_USED) {
        Some(stripped) => (stripped, true),
        None => (user_id_raw.as_str(), false),
    };

    // 每个用户每分钟最多刷新 10 次
    check_rate_limit(&state.redis, "refresh_token", user_id, 10, 60).await?;

    if is_used {
        tracing::warn!("🚨 Refresh token reused! User: {}", user_id);
        return Err(AppError::Conflict("Token reused. Please login again.".to_string()));
    }

    let uid = Uuid::parse_str(user_id).map_err(|_| AppError::InternalServerError("ID error".to_string()))?;
    let user = users::Entity::find_by_id(uid).one(&*state.db).await?
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    ensure_active(&user)?;

    let used_val = format!("{}{}", REDIS_PREFIX_USED, user_id);
    let _: () = redis.set_ex(&redis_key_old, used_val, ROTATION_GRACE_PERIOD).await?;

    let new_access = generate_access_token(&state.config, user_id, &user.username, user.role)?;
    let new_refresh = Uuid::new_v4().to_string();

    let _: () = redis
        .set_ex(
            refresh_key(&new_refresh),
            user_id,
            state.config.refresh_token_expiration as u64,
        )
        .await?;

    Ok(LoginResponse {
        access_token: new_access,
        refresh_token: new_refresh,
        expires_in: state.config.jwt_expiration,
        user: None,
    })
}

/// 登出：把仍有效的 JWT 加入黑名单，过期时间等于令牌剩余有效期。
/// 令牌本身无效时直接返回成功。
pub async fn logout(state: &AppState, token: &str) -> Result<(), AppError> {
    let Ok(claims) = decode_claims(&state.config, token) else {
        return Ok(());
    };

    let ttl = claims.exp as i64 - Utc::now().timestamp();
    if ttl > 0 {
        let mut redis = state.redis.clone();
        let _: () = redis.set_ex(blacklist_key(token), "logout", ttl as u64).await?;
        tracing::info!("👋 Logout: {}", claims.username);
    }
    Ok(())
}
