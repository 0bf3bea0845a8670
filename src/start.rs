// src/start.rs
use std::{net::SocketAddr, time::Duration};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, ConnectOptions};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::signal;

use crate::{
    core::{config::Config, log},
    routes,
    state::AppState,
};

/// 启动并运行应用程序。
///
/// 这个函数执行以下步骤：
/// 1. 加载配置并初始化日志
/// 2. 建立数据库连接池，按需执行迁移
/// 3. 建立 Redis 连接
/// 4. 创建上传目录
/// 5. 启动 HTTP 服务器并监听关闭信号
///
/// 任一步骤失败都会记录错误并退出进程。
pub async fn run() {
    let config = Config::new();

    // guard 需要存活到进程结束，否则文件日志不会落盘
    let _guard = log::init(&config.rust_log);
    tracing::info!("🔍 Config loaded successfully.");

    let mut opt = ConnectOptions::new(config.database_url.expose_secret());
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = match Database::connect(opt).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("❌ Failed to connect to Database: {:?}", e);
            return;
        }
    };
    tracing::info!("✅ Database connected.");

    if config.run_migrations {
        if let Err(e) = Migrator::up(&db, None).await {
            tracing::error!("❌ Migration failed: {:?}", e);
            return;
        }
        tracing::info!("✅ Migrations applied.");
    }

    // ConnectionManager 断线自动重连
    let redis_manager = match redis::Client::open(config.redis_url.expose_secret()) {
        Ok(client) => match client.get_connection_manager().await {
            Ok(manager) => manager,
            Err(e) => {
                tracing::error!("❌ Failed to connect to Redis: {:?}", e);
                return;
            }
        },
        Err(e) => {
            tracing::error!("❌ Invalid Redis URL: {:?}", e);
            return;
        }
    };
    tracing::info!("✅ Redis connected.");

    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        tracing::error!("❌ Cannot create upload dir {}: {:?}", config.upload_dir, e);
        return;
    }

    let addr: SocketAddr = match format!("{}:{}", config.server_host, config.server_port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("❌ Invalid address configuration: {:?}", e);
            return;
        }
    };

    let state = AppState::new(db, redis_manager, config);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("❌ Failed to bind {}: {:?}", addr, e);
            return;
        }
    };
    tracing::info!("🚀 Server listening on http://{}", addr);

    let app = routes::create_router(state);

    // 收到关闭信号后先处理完进行中的请求再退出
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("❌ Server error: {:?}", e);
    }
}

/// 等待 Ctrl+C（SIGINT）或 SIGTERM。
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Signal received, starting graceful shutdown...");
}
