use serde::{Deserialize, Serialize};

/// 公司简介页动画计数器的目标值
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SiteStats {
    pub published_articles: u64,
    pub total_events: u64,
    pub upcoming_events: u64,
    pub completed_events: u64,
    pub active_users: u64,
}
