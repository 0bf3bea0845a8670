use sea_orm::DatabaseConnection;
use redis::aio::ConnectionManager;
use std::sync::Arc;

use crate::{core::config::Config, utils::pagination::resolve_page};

#[derive(Clone)]
pub struct AppState {
    /// 开启 `mock` 特性（测试）时 `DatabaseConnection` 不实现 Clone，统一用 Arc 共享
    pub db: Arc<DatabaseConnection>,
    pub redis: ConnectionManager,
    /// 全局配置，使用 Arc 包装以实现廉价克隆
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, redis: ConnectionManager, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            redis,
            config: Arc::new(config),
        }
    }

    /// 按配置的默认/最大每页条数解析列表查询的页码
    pub fn page_params(&self, page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
        resolve_page(page, per_page, self.config.default_page_size, self.config.max_page_size)
    }
}
