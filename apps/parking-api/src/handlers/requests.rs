//! 住户停车申请 handlers
//!
//! - GET /parking-requests?status=pending - 申请列表（最新在前）
//! - POST /parking-requests - 住户提交申请
//! - GET /parking-requests/{id} - 申请详情
//! - POST /parking-requests/{id}/approve - 审批并预约车位
//! - POST /parking-requests/{id}/reject - 驳回

use crate::AppState;
use crate::utils::{
    alert_to_dto, bad_request_error, normalize_required, occupancy_error, ok, request_to_dto,
    spot_to_dto,
};
use api_contract::{
    ApproveParkingRequest, ApproveParkingResponse, ParkingRequestDto, SubmitParkingRequest,
    SubmitParkingResponse,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use domain::{NewParkingRequest, RequestStatus, now_epoch_ms};

#[derive(Debug, Default, serde::Deserialize)]
pub struct RequestQuery {
    status: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct RequestPath {
    request_id: String,
}

pub async fn list_parking_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Response {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(value) => match RequestStatus::parse(value) {
            Some(status) => Some(status),
            None => return bad_request_error(format!("unknown request status: {value}")),
        },
    };
    match state.service.parking_requests(status) {
        Ok(requests) => {
            let data: Vec<ParkingRequestDto> = requests.into_iter().map(request_to_dto).collect();
            ok(data)
        }
        Err(err) => occupancy_error(err),
    }
}

/// 住户提交申请，同时生成待审批告警
pub async fn submit_parking_request(
    State(state): State<AppState>,
    Json(req): Json<SubmitParkingRequest>,
) -> Response {
    let resident_unit = match normalize_required(req.resident_unit, "residentUnit") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let visitor_name = match normalize_required(req.visitor_name, "visitorName") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let vehicle_plate = match normalize_required(req.vehicle_plate, "vehiclePlate") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let request = NewParkingRequest {
        resident_unit,
        visitor_name,
        vehicle_plate,
        scheduled_at_ms: req.scheduled_at,
        duration_hours: req.duration_hours,
    };
    match state.service.submit_parking_request(request, now_epoch_ms()) {
        Ok(submitted) => ok(SubmitParkingResponse {
            request: request_to_dto(submitted.request),
            alert: alert_to_dto(submitted.alert),
        }),
        Err(err) => occupancy_error(err),
    }
}

pub async fn get_parking_request(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
) -> Response {
    match state.service.parking_request(&path.request_id) {
        Ok(request) => ok(request_to_dto(request)),
        Err(err) => occupancy_error(err),
    }
}

/// 审批申请：为申请单元预约指定车位
pub async fn approve_parking_request(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
    Json(req): Json<ApproveParkingRequest>,
) -> Response {
    let spot_code = match normalize_required(req.spot_code, "spotCode") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state
        .service
        .approve_parking_request(&path.request_id, &spot_code, now_epoch_ms())
    {
        Ok(approved) => ok(ApproveParkingResponse {
            request: request_to_dto(approved.request),
            spot: spot_to_dto(approved.spot),
        }),
        Err(err) => occupancy_error(err),
    }
}

pub async fn reject_parking_request(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
) -> Response {
    match state
        .service
        .reject_parking_request(&path.request_id, now_epoch_ms())
    {
        Ok(request) => ok(request_to_dto(request)),
        Err(err) => occupancy_error(err),
    }
}
