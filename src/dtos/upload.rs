use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// 上传用途，决定落盘子目录；avatar 会同时更新当前用户头像
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UploadKind {
    Avatar,
    Article,
    Event,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(rename = "type")]
    pub kind: UploadKind,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub size: usize,
    pub content_type: String,
}
