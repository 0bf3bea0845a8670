use config::{Config as ConfigLoader, Environment};
use dotenvy::dotenv;
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Postgres 连接串（敏感信息）
    #[serde(alias = "DATABASE_URL")]
    pub database_url: SecretString,

    /// Redis 连接串（敏感信息）
    #[serde(alias = "REDIS_URL")]
    pub redis_url: SecretString,

    /// JWT 签名密钥（敏感信息）
    #[serde(alias = "JWT_SECRET")]
    pub jwt_secret: SecretString,

    #[serde(default = "default_port", alias = "SERVER_PORT")]
    pub server_port: u16,

    #[serde(default = "default_host", alias = "SERVER_HOST")]
    pub server_host: String,

    #[serde(default = "default_log", alias = "RUST_LOG")]
    pub rust_log: String,

    #[serde(default = "default_jwt_exp", alias = "JWT_EXPIRATION")]
    pub jwt_expiration: i64,

    #[serde(default = "default_refresh_exp", alias = "REFRESH_TOKEN_EXPIRATION")]
    pub refresh_token_expiration: i64,

    /// 列表接口未指定 per_page 时的默认分页大小
    #[serde(default = "default_page_size", alias = "DEFAULT_PAGE_SIZE")]
    pub default_page_size: u64,

    #[serde(default = "default_max_page_size", alias = "MAX_PAGE_SIZE")]
    pub max_page_size: u64,

    /// 上传图片的落盘目录，同时以 `/uploads` 对外提供静态访问
    #[serde(default = "default_upload_dir", alias = "UPLOAD_DIR")]
    pub upload_dir: String,

    #[serde(default = "default_max_upload", alias = "MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// 拼接上传文件访问地址的前缀（可替换为 CDN 域名）
    #[serde(default = "default_public_base_url", alias = "PUBLIC_BASE_URL")]
    pub public_base_url: String,

    /// HTTPS 部署时打开，登录 Cookie 会带上 Secure 标记
    #[serde(default, alias = "COOKIE_SECURE")]
    pub cookie_secure: bool,

    #[serde(default = "default_run_migrations", alias = "RUN_MIGRATIONS")]
    pub run_migrations: bool,
}

impl Config {
    /// 加载配置：
    /// - 支持 `.env`
    /// - 优先从环境变量加载
    pub fn new() -> Self {
        dotenv().ok();

        // 注意：Environment::default() 会把 `FOO__BAR=baz` 映射到 `foo.bar=baz`
        // 并且 try_parsing(true) 会把 "3000" 解析成数字等类型。
        let builder = ConfigLoader::builder().add_source(Environment::default().try_parsing(true));

        match builder.build() {
            Ok(config) => config
                .try_deserialize()
                .expect("❌ Failed to deserialize configuration"),
            Err(e) => panic!("❌ Failed to build configuration: {e}"),
        }
    }
}

// --- 默认值函数 ---
fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_log() -> String {
    "info".to_string()
}
fn default_jwt_exp() -> i64 {
    3600
} // 1 hour
fn default_refresh_exp() -> i64 {
    86400 * 7
} // 7 days
fn default_page_size() -> u64 {
    10
}
fn default_max_page_size() -> u64 {
    100
}
fn default_upload_dir() -> String {
    "uploads".to_string()
}
fn default_max_upload() -> usize {
    5 * 1024 * 1024
} // 5 MB
fn default_public_base_url() -> String {
    "/uploads".to_string()
}
fn default_run_migrations() -> bool {
    true
}
