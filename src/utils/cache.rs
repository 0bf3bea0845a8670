use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use crate::core::error::AppError;

/// 通用缓存获取函数（Cache-Aside 模式）：优先从缓存读取，缓存未命中时从数据库获取并回填缓存。
///
/// Redis 故障不阻断业务（Soft Fail）：读失败按未命中处理，写失败只记日志。
///
/// # 参数
/// - `key`: Redis 键名，用于唯一标识缓存数据。
/// - `ttl_seconds`: 缓存过期时间（秒）。
/// - `fetcher`: 缓存未命中时执行的数据库查询闭包。
pub async fn get_or_fetch<T, F, Fut>(
    manager: &ConnectionManager,
    key: &str,
    ttl_seconds: u64,
    fetcher: F,
) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, AppError>> + Send,
{
    let mut redis = manager.clone();

    match redis.get::<_, Option<String>>(key).await {
        Ok(Some(json_str)) if !json_str.is_empty() => {
            match serde_json::from_str::<T>(&json_str) {
                Ok(data) => {
                    tracing::debug!("✅ Cache hit: {}", key);
                    return Ok(data);
                }
                // 结构变更后的旧缓存：当作未命中，下面会覆盖
                Err(e) => tracing::warn!("⚠️ Cache deserialize failed for {}: {}", key, e),
            }
        }
        Err(e) => tracing::warn!("⚠️ Redis get failed for {}: {}", key, e),
        _ => {}
    };

    tracing::debug!("🔍 Cache miss, fetching from DB: {}", key);
    let data = fetcher().await?;
    set(manager, key, &data, ttl_seconds).await;

    Ok(data)
}

/// 直接覆盖写入（Write Through）
pub async fn set<T>(manager: &ConnectionManager, key: &str, data: &T, ttl_seconds: u64)
where
    T: Serialize + Send + Sync,
{
    let mut redis = manager.clone();
    match serde_json::to_string(data) {
        Ok(json_str) => {
            if let Err(e) = redis.set_ex::<_, _, ()>(key, json_str, ttl_seconds).await {
                tracing::warn!("⚠️ Redis set failed for {}: {}", key, e);
            } else {
                tracing::debug!("💾 Cache set: {}", key);
            }
        }
        Err(e) => tracing::error!("❌ Serialization failed: {}", e),
    }
}

/// 失效一个或多个键。写操作之后调用，下一次读取即为全量重新拉取。
pub async fn del(manager: &ConnectionManager, keys: &[&str]) {
    if keys.is_empty() {
        return;
    }
    let mut redis = manager.clone();
    if let Err(e) = redis.del::<_, ()>(keys).await {
        tracing::warn!("⚠️ Redis delete failed for {:?}: {}", keys, e);
    } else {
        tracing::debug!("🗑️ Cache invalidated: {:?}", keys);
    }
}
