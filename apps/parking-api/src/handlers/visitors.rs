//! 访客 handlers
//!
//! - GET /visitors?active=true&q=... - 检索访客（最新入场在前）
//! - POST /visitors - 登记入场（车辆访客可同时占用车位）
//! - POST /visitors/{id}/exit - 登记离场并释放车位

use crate::AppState;
use crate::utils::{
    alert_to_dto, bad_request_error, normalize_optional, normalize_required, occupancy_error, ok,
    quote_to_dto, spot_to_dto, visitor_to_dto,
};
use api_contract::{EntryResponse, ExitResponse, RegisterEntryRequest, VisitorDto};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use domain::{NewVisitor, VisitorKind, now_epoch_ms};

#[derive(Debug, Default, serde::Deserialize)]
pub struct VisitorQuery {
    active: Option<bool>,
    q: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct VisitorPath {
    visitor_id: String,
}

/// 检索访客
pub async fn list_visitors(
    State(state): State<AppState>,
    Query(query): Query<VisitorQuery>,
) -> Response {
    let active_only = query.active.unwrap_or(false);
    match state.service.visitors(active_only, query.q.as_deref()) {
        Ok(records) => {
            let data: Vec<VisitorDto> = records.into_iter().map(visitor_to_dto).collect();
            ok(data)
        }
        Err(err) => occupancy_error(err),
    }
}

/// 登记入场
pub async fn register_entry(
    State(state): State<AppState>,
    Json(req): Json<RegisterEntryRequest>,
) -> Response {
    let Some(kind) = VisitorKind::parse(&req.kind) else {
        return bad_request_error(format!("unknown visitor type: {}", req.kind));
    };
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let document_id = match normalize_required(req.document_id, "documentId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let destination_unit = match normalize_required(req.destination_unit, "destinationUnit") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let visitor = NewVisitor {
        name,
        document_id,
        kind,
        vehicle_plate: normalize_optional(req.vehicle_plate),
        destination_unit,
        resident_name: req.resident_name.trim().to_string(),
        parking_spot_code: normalize_optional(req.parking_spot),
    };
    match state.service.register_entry(visitor, now_epoch_ms()) {
        Ok(outcome) => ok(EntryResponse {
            visitor: visitor_to_dto(outcome.visitor),
            spot: outcome.spot.map(spot_to_dto),
            alert: alert_to_dto(outcome.alert),
        }),
        Err(err) => occupancy_error(err),
    }
}

/// 登记离场
pub async fn register_exit(
    State(state): State<AppState>,
    Path(path): Path<VisitorPath>,
) -> Response {
    match state.service.register_exit(&path.visitor_id, now_epoch_ms()) {
        Ok(outcome) => {
            let spot_code = outcome.visitor.bound_spot_code.clone();
            let overtime_minutes = outcome.overtime_minutes;
            let charge = outcome
                .charge
                .map(|quote| quote_to_dto(spot_code, overtime_minutes, quote));
            ok(ExitResponse {
                visitor: visitor_to_dto(outcome.visitor),
                spot_released: outcome.spot_released,
                charge,
                alerts: outcome.alerts.into_iter().map(alert_to_dto).collect(),
            })
        }
        Err(err) => occupancy_error(err),
    }
}
