//! 健康检查与 Telemetry 指标快照。
//!
//! - GET /health
//! - GET /metrics

use crate::utils::ok;
use api_contract::MetricsSnapshotDto;
use axum::{Json, response::IntoResponse, response::Response};
use pms_telemetry::metrics;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    ok(MetricsSnapshotDto {
        claims: snapshot.claims,
        claims_rejected: snapshot.claims_rejected,
        reservations: snapshot.reservations,
        releases: snapshot.releases,
        ticks: snapshot.ticks,
        overtime_entered: snapshot.overtime_entered,
        entries: snapshot.entries,
        exits: snapshot.exits,
        alerts_emitted: snapshot.alerts_emitted,
        integrity_warnings: snapshot.integrity_warnings,
    })
}
