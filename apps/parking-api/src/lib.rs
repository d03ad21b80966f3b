//! 访客停车值班 HTTP API：路由、共享状态与请求追踪。

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;

use axum::Router;
use pms_occupancy::OccupancyService;
use tower_http::trace::TraceLayer;

/// 共享状态。
#[derive(Clone)]
pub struct AppState {
    pub service: OccupancyService,
}

impl AppState {
    pub fn new(service: OccupancyService) -> Self {
        Self { service }
    }
}

/// 组装完整应用：路由同时挂在 `/` 与 `/api` 下，并注入 request_id/trace_id。
pub fn build_app(state: AppState) -> Router {
    let api = routes::create_api_router();
    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_context))
}
