use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
};

/// 创建主路由，所有接口挂在 `api_base_uri` 下
pub fn create_router(state: AppState) -> Router {
    // 公开路由
    let public_routes = Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/users/register", post(routes::user::register))
        .route("/users/login", post(routes::user::login))
        .route("/users/logout", post(routes::user::logout));

    // 需要有效会话的路由
    let protected_routes = Router::new()
        .route("/users/me", get(routes::user::me))
        .route("/resources/feed", get(routes::resource::feed))
        .route("/resources/stats", get(routes::resource::stats))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new().merge(public_routes).merge(protected_routes);
    let base = state.config.api_base_uri.trim_end_matches('/');
    // axum 不允许在根路径 nest
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 开发模式下允许所有来源跨域
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
