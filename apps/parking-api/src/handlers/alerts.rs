//! 告警 handlers
//!
//! - GET /alerts?filter=all|unread|critical - 列出告警（最新在前）
//! - POST /alerts/{id}/read - 标为已读
//! - POST /alerts/read-all - 全部已读
//! - DELETE /alerts/{id} - 忽略告警

use crate::AppState;
use crate::utils::{alert_to_dto, bad_request_error, occupancy_error, ok};
use api_contract::{AlertDto, MarkAllReadResponse};
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use pms_alerts::AlertFilter;

#[derive(Debug, Default, serde::Deserialize)]
pub struct AlertQuery {
    filter: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct AlertPath {
    alert_id: String,
}

/// 列出告警
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Response {
    let raw = query.filter.unwrap_or_default();
    let Some(filter) = AlertFilter::parse(&raw) else {
        return bad_request_error(format!("unknown alert filter: {raw}"));
    };
    match state.service.alerts(filter) {
        Ok(alerts) => {
            let data: Vec<AlertDto> = alerts.into_iter().map(alert_to_dto).collect();
            ok(data)
        }
        Err(err) => occupancy_error(err),
    }
}

/// 标为已读
pub async fn mark_alert_read(
    State(state): State<AppState>,
    Path(path): Path<AlertPath>,
) -> Response {
    match state.service.mark_alert_read(&path.alert_id) {
        Ok(alert) => ok(alert_to_dto(alert)),
        Err(err) => occupancy_error(err),
    }
}

/// 全部已读
pub async fn mark_all_alerts_read(State(state): State<AppState>) -> Response {
    match state.service.mark_all_alerts_read() {
        Ok(updated) => ok(MarkAllReadResponse { updated }),
        Err(err) => occupancy_error(err),
    }
}

/// 忽略告警（不影响车位与访客记录）
pub async fn dismiss_alert(State(state): State<AppState>, Path(path): Path<AlertPath>) -> Response {
    match state.service.dismiss_alert(&path.alert_id) {
        Ok(alert) => ok(alert_to_dto(alert)),
        Err(err) => occupancy_error(err),
    }
}
