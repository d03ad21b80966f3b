//! 值班面板、计费配置与时钟 handlers
//!
//! - GET /dashboard - 统计卡片
//! - GET /tariff - 当前计费配置
//! - PUT /tariff - 替换计费配置
//! - POST /clock/advance - 手动推进时钟（演练 / 测试）

use crate::AppState;
use crate::utils::{
    alert_to_dto, dashboard_to_dto, occupancy_error, ok, tariff_from_dto, tariff_to_dto,
};
use api_contract::{AdvanceClockRequest, AdvanceClockResponse, TariffDto};
use axum::{Json, extract::State, response::Response};
use domain::now_epoch_ms;
use tracing::info;

pub async fn get_dashboard(State(state): State<AppState>) -> Response {
    match state.service.dashboard() {
        Ok(stats) => ok(dashboard_to_dto(state.service.building(), stats)),
        Err(err) => occupancy_error(err),
    }
}

pub async fn get_tariff(State(state): State<AppState>) -> Response {
    match state.service.tariff() {
        Ok(tariff) => ok(tariff_to_dto(tariff)),
        Err(err) => occupancy_error(err),
    }
}

pub async fn update_tariff(
    State(state): State<AppState>,
    Json(req): Json<TariffDto>,
) -> Response {
    match state.service.update_tariff(tariff_from_dto(req)) {
        Ok(tariff) => ok(tariff_to_dto(tariff)),
        Err(err) => occupancy_error(err),
    }
}

/// 手动推进时钟，返回本次产生的超时告警
pub async fn advance_clock(
    State(state): State<AppState>,
    Json(req): Json<AdvanceClockRequest>,
) -> Response {
    info!(target: "pms.api", minutes = req.minutes, "clock_manual_advance");
    match state.service.advance(req.minutes, now_epoch_ms()) {
        Ok(alerts) => ok(AdvanceClockResponse {
            minutes: req.minutes,
            alerts: alerts.into_iter().map(alert_to_dto).collect(),
        }),
        Err(err) => occupancy_error(err),
    }
}
