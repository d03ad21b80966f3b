//! 车位 handlers
//!
//! - GET /spots?available=true - 列出车位（可只列门岗可选的空闲车位）
//! - GET /spots/{code} - 车位详情
//! - POST /spots/{code}/reserve - 住户预约
//! - POST /spots/{code}/release - 值班员强制释放
//! - GET /spots/{code}/charge - 当前超时费用（只读，不产生告警）

use crate::AppState;
use crate::utils::{normalize_required, occupancy_error, ok, quote_to_dto, spot_to_dto};
use api_contract::{ParkingSpotDto, ReleaseSpotResponse, ReserveSpotRequest};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use tracing::info;

#[derive(Debug, Default, serde::Deserialize)]
pub struct SpotQuery {
    available: Option<bool>,
}

#[derive(serde::Deserialize)]
pub struct SpotPath {
    code: String,
}

/// 列出车位（按编码排序）
pub async fn list_spots(
    State(state): State<AppState>,
    Query(query): Query<SpotQuery>,
) -> Response {
    let spots = if query.available.unwrap_or(false) {
        state.service.available_spots()
    } else {
        state.service.spots()
    };
    match spots {
        Ok(spots) => {
            let data: Vec<ParkingSpotDto> = spots.into_iter().map(spot_to_dto).collect();
            ok(data)
        }
        Err(err) => occupancy_error(err),
    }
}

/// 车位详情
pub async fn get_spot(State(state): State<AppState>, Path(path): Path<SpotPath>) -> Response {
    match state.service.spot(&path.code) {
        Ok(spot) => ok(spot_to_dto(spot)),
        Err(err) => occupancy_error(err),
    }
}

/// 住户预约车位
pub async fn reserve_spot(
    State(state): State<AppState>,
    Path(path): Path<SpotPath>,
    Json(req): Json<ReserveSpotRequest>,
) -> Response {
    let resident_unit = match normalize_required(req.resident_unit, "residentUnit") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.service.reserve(&path.code, &resident_unit) {
        Ok(spot) => ok(spot_to_dto(spot)),
        Err(err) => occupancy_error(err),
    }
}

/// 强制释放车位（对已空闲车位幂等）
pub async fn release_spot(State(state): State<AppState>, Path(path): Path<SpotPath>) -> Response {
    let released = match state.service.force_release(&path.code) {
        Ok(outcome) => outcome.was_released(),
        Err(err) => return occupancy_error(err),
    };
    info!(
        target: "pms.api",
        spot_code = %path.code,
        released = released,
        "spot_force_released"
    );
    match state.service.spot(&path.code) {
        Ok(spot) => ok(ReleaseSpotResponse {
            released,
            spot: spot_to_dto(spot),
        }),
        Err(err) => occupancy_error(err),
    }
}

/// 当前超时费用（按楼宇计费配置）
pub async fn get_spot_charge(
    State(state): State<AppState>,
    Path(path): Path<SpotPath>,
) -> Response {
    let spot = match state.service.spot(&path.code) {
        Ok(spot) => spot,
        Err(err) => return occupancy_error(err),
    };
    match state.service.quote_spot(&spot) {
        Ok(quote) => ok(quote_to_dto(
            Some(spot.code.clone()),
            spot.overtime_minutes(),
            quote,
        )),
        Err(err) => occupancy_error(err),
    }
}
