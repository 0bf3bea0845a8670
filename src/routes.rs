use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse},
};
use tracing::Level;

// 重命名为 app_middleware，避免与 axum::middleware 冲突
use crate::{handlers, state::AppState, middleware as app_middleware};

/// 创建应用程序路由器。
///
/// # 路由结构（均挂在 `/api` 下）
/// 1. 公开路由：站点计数、文章/活动浏览、评论提交、活动报名、注册与登录。
/// 2. 登录路由：个人资料、修改密码、图片上传。
/// 3. 内容管理路由（editor 及以上）：文章、评论审核、活动。
/// 4. 用户管理路由（admin 及以上）：`/admin/users/*`。
///
/// 同一路径不同方法可以分属不同分组（例如 `GET /comments` 需要后台权限，
/// `POST /comments` 公开），合并后按方法各自生效。
///
/// # 中间件
/// - 所有 `/api` 请求先经过黑名单检查（携带令牌时）。
/// - 后台分组再叠加角色守卫；只作用于已匹配的路由，未知路径仍返回 404。
/// - 全局请求日志与 CORS；`/uploads` 直接由 `ServeDir` 提供静态文件。
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/stats", get(handlers::stats::site_stats))
        .route("/articles", get(handlers::articles::list_published))
        .route("/articles/{id}", get(handlers::articles::get_article))
        .route("/articles/{id}/comments", get(handlers::articles::list_article_comments))
        .route("/comments", post(handlers::comments::create_comment))
        .route("/events", get(handlers::events::list_events))
        .route("/events/{id}", get(handlers::events::get_event))
        .route("/events/{id}/register", post(handlers::events::register))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/register/validate", post(handlers::auth::validate_step))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout));

    // 登录即可访问：Claims 提取器负责拒绝未认证请求
    let user_routes = Router::new()
        .route("/auth/me", get(handlers::profile::get_me).put(handlers::profile::update_me))
        .route("/profile", put(handlers::profile::update_me))
        .route("/profile/password", put(handlers::profile::change_password))
        .route(
            "/upload-image",
            post(handlers::profile::upload_image)
                // multipart 头部留出余量，图片本身的大小由上传服务校验
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes + 64 * 1024)),
        );

    let staff_routes = Router::new()
        .route("/admin/articles", get(handlers::articles::list_all))
        .route("/articles", post(handlers::articles::create_article))
        .route(
            "/articles/{id}",
            put(handlers::articles::update_article).delete(handlers::articles::delete_article),
        )
        .route("/comments", get(handlers::comments::list_comments))
        .route(
            "/comments/{id}",
            put(handlers::comments::update_comment).delete(handlers::comments::delete_comment),
        )
        .route("/events", post(handlers::events::create_event))
        .route(
            "/events/{id}",
            put(handlers::events::update_event).delete(handlers::events::delete_event),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth::staff_guard,
        ));

    let admin_routes = Router::new()
        .route(
            "/admin/users",
            get(handlers::admin_users::list_users).post(handlers::admin_users::create_user),
        )
        .route(
            "/admin/users/{id}",
            get(handlers::admin_users::get_user)
                .patch(handlers::admin_users::update_user)
                .delete(handlers::admin_users::delete_user),
        )
        .route("/admin/users/{id}/role", patch(handlers::admin_users::update_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth::admin_guard,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        // ✨ 基础鉴权 (检查 Token 黑名单)，在角色守卫之前执行
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(|| async { "🚀 Company CMS API is Running!" }))
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))

        // 全局日志与 CORS
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
