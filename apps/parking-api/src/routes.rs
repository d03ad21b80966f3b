//! 路由定义
//!
//! 集中管理所有 API 路由：
//! - 健康检查与指标：/health, /metrics
//! - 车位：/spots/*
//! - 访客：/visitors/*
//! - 住户停车申请：/parking-requests/*
//! - 告警：/alerts/*
//! - 值班面板、计费与时钟：/dashboard, /tariff, /clock/advance

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// 创建 API 路由
///
/// 由 `build_app` 同时挂在 / 与 /api/ 两种前缀下
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/spots", get(list_spots))
        .route("/spots/:code", get(get_spot))
        .route("/spots/:code/reserve", post(reserve_spot))
        .route("/spots/:code/release", post(release_spot))
        .route("/spots/:code/charge", get(get_spot_charge))
        .route("/visitors", get(list_visitors).post(register_entry))
        .route("/visitors/:visitor_id/exit", post(register_exit))
        .route(
            "/parking-requests",
            get(list_parking_requests).post(submit_parking_request),
        )
        .route("/parking-requests/:request_id", get(get_parking_request))
        .route(
            "/parking-requests/:request_id/approve",
            post(approve_parking_request),
        )
        .route(
            "/parking-requests/:request_id/reject",
            post(reject_parking_request),
        )
        .route("/alerts", get(list_alerts))
        .route("/alerts/read-all", post(mark_all_alerts_read))
        .route("/alerts/:alert_id", delete(dismiss_alert))
        .route("/alerts/:alert_id/read", post(mark_alert_read))
        .route("/dashboard", get(get_dashboard))
        .route("/tariff", get(get_tariff).put(update_tariff))
        .route("/clock/advance", post(advance_clock))
}
