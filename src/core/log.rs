use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter,
};

/// 初始化日志：控制台 + 按天滚动的文件。返回的 guard 必须持有到进程结束，
/// 否则非阻塞写入线程会提前退出，尾部日志丢失。
pub fn init(log_level: &str) -> WorkerGuard {
    // 1. 文件输出层：按天轮询，存放在 logs 文件夹下
    let file_appender = tracing_appender::rolling::daily("logs", "cms.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 2. 格式化层（文件）- 不带颜色，包含详细代码位置
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false);

    // 3. 格式化层（控制台）- 带颜色
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_file(true)
        .with_line_number(true);

    // 4. 注册所有层；RUST_LOG 形如 "info,sea_orm=warn"
    registry()
        .with(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
