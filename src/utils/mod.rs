pub mod cache;
pub mod limiter;
pub mod pagination;
pub mod password;
pub mod slug;

/// 限流宏：提供便捷的速率限制检查功能，防止 API 滥用。
/// 用法: rate_limit!(&state.redis, "action_name", &key, max_count, window_seconds); 其中参数依次为：Redis 连接、操作名称、限流主体、最大请求次数、时间窗口（秒）。
#[macro_export]
macro_rules! rate_limit {
    ($redis:expr, $action:expr, $key:expr, $limit:expr, $window:expr) => {
        if let Err(e) = $crate::utils::limiter::check_rate_limit($redis, $action, $key, $limit, $window).await {
            return Err(e.into());
        }
    };
}
