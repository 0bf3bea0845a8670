use std::sync::LazyLock;

use redis::Script;
use redis::aio::ConnectionManager;
use crate::core::error::AppError;

/// 固定窗口计数：首次自增时设置过期时间，窗口结束后计数自然清零
static FIXED_WINDOW: LazyLock<Script> = LazyLock::new(|| {
    Script::new(r#"
        local count = redis.call("INCR", KEYS[1])
        if count == 1 then
            redis.call("EXPIRE", KEYS[1], ARGV[1])
        end
        return count
    "#)
});

/// 限流计数键。主体统一转小写，避免 `Budi@x.id` 与 `budi@x.id` 分别计数。
pub fn rate_limit_key(action: &str, subject: &str) -> String {
    format!("rate_limit:{}:{}", action, subject.trim().to_lowercase())
}

/// 检查 `subject`（用户 ID、账号或邮箱）在 `window` 秒内对 `action` 的调用次数是否超过 `limit`。
pub async fn check_rate_limit(
    redis_manager: &ConnectionManager,
    action: &str,
    subject: &str,
    limit: usize,
    window: u64,
) -> Result<(), AppError> {
    let redis_key = rate_limit_key(action, subject);
    let mut conn = redis_manager.clone();

    let count: usize = FIXED_WINDOW
        .key(&redis_key)
        .arg(window)
        .invoke_async(&mut conn)
        .await?;

    if count > limit {
        tracing::warn!("⛔ Rate limit exceeded: {} on {} ({}/{})", subject, action, count, limit);
        return Err(AppError::RateLimitExceeded(
            format!("Too many requests. Try again in {} seconds.", window)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_case_insensitive_on_subject() {
        assert_eq!(rate_limit_key("comment", " Budi@Example.co.id "), "rate_limit:comment:budi@example.co.id");
    }
}
