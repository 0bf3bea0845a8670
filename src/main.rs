// src/main.rs
//! 企业官网内容服务：文章、评论审核、活动报名，以及后台用户管理。

mod core;
mod dtos;
mod entity;
mod extractors;
mod handlers;
mod middleware;
mod routes;
mod services;
mod start;
mod state;
mod utils;

#[tokio::main]
async fn main() {
    start::run().await;
}
