//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, occupancy_error
//! - DTO 转换：spot_to_dto, visitor_to_dto, alert_to_dto, quote_to_dto, request_to_dto, tariff_to_dto, dashboard_to_dto
//!
//! 业务错误到错误码的映射集中在 `occupancy_error`。

use api_contract::{
    AlertDto, ApiResponse, ChargeQuoteDto, DashboardDto, ParkingRequestDto, ParkingSpotDto,
    TariffDto, VisitorDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{Alert, BuildingContext, ParkingRequest, ParkingSpot, TariffConfig, VisitorRecord};
use pms_alerts::AlertError;
use pms_clock::ClockError;
use pms_ledger::LedgerError;
use pms_occupancy::{DashboardStats, OccupancyError};
use pms_registry::RegistryError;
use pms_requests::RequestError;
use pms_tariff::{ChargeQuote, TariffError};
use tracing::error;

/// 成功响应
pub fn ok<T: serde::Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(code, message.into()))).into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, "INVALID.REQUEST", message)
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::NOT_FOUND, "RESOURCE.NOT_FOUND", message)
}

fn internal_error(message: String) -> Response {
    error!(target: "pms.api", error = %message, "internal_error");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL.ERROR", message)
}

/// 业务错误响应
pub fn occupancy_error(err: OccupancyError) -> Response {
    match err {
        OccupancyError::Registry(err) => registry_error(err),
        OccupancyError::Clock(ClockError::Registry(err)) => registry_error(err),
        OccupancyError::Ledger(err) => ledger_error(err),
        OccupancyError::Alert(AlertError::NotFound(id)) => {
            not_found_error(format!("alert not found: {id}"))
        }
        OccupancyError::Request(err) => request_error(err),
        OccupancyError::Tariff(TariffError::Invalid(message)) => bad_request_error(message),
        err @ (OccupancyError::Alert(AlertError::Lock)
        | OccupancyError::Clock(ClockError::Lock)
        | OccupancyError::Lock) => internal_error(err.to_string()),
    }
}

fn registry_error(err: RegistryError) -> Response {
    let message = err.to_string();
    match err {
        RegistryError::SpotUnavailable { .. } => {
            error_response(StatusCode::CONFLICT, "PARKING.SPOT_UNAVAILABLE", message)
        }
        RegistryError::SpotNotBound { .. } => {
            error_response(StatusCode::CONFLICT, "PARKING.SPOT_NOT_BOUND", message)
        }
        RegistryError::UnknownSpot(_) => not_found_error(message),
        RegistryError::Invalid(_) => bad_request_error(message),
        RegistryError::Lock => internal_error(message),
    }
}

fn ledger_error(err: LedgerError) -> Response {
    let message = err.to_string();
    match err {
        LedgerError::Invalid(_) => bad_request_error(message),
        LedgerError::NotFound(_) => not_found_error(message),
        LedgerError::AlreadyExited(_) => {
            error_response(StatusCode::CONFLICT, "VISITOR.ALREADY_EXITED", message)
        }
        LedgerError::SpotAlreadyBound { .. } => {
            error_response(StatusCode::CONFLICT, "PARKING.SPOT_UNAVAILABLE", message)
        }
        LedgerError::Lock => internal_error(message),
    }
}

fn request_error(err: RequestError) -> Response {
    let message = err.to_string();
    match err {
        RequestError::Invalid(_) => bad_request_error(message),
        RequestError::NotFound(_) => not_found_error(message),
        RequestError::InvalidTransition { .. } => {
            error_response(StatusCode::CONFLICT, "PARKING.REQUEST_STATE", message)
        }
        RequestError::Lock => internal_error(message),
    }
}

/// ParkingSpot 转 ParkingSpotDto
pub fn spot_to_dto(spot: ParkingSpot) -> ParkingSpotDto {
    ParkingSpotDto {
        id: spot.id,
        code: spot.code,
        status: spot.status.as_str().to_string(),
        visitor_id: spot.bound_visitor_id,
        resident_unit: spot.resident_unit,
        visitor_name: spot.visitor_name,
        vehicle_plate: spot.vehicle_plate,
        entry_time: spot.entry_time_ms,
        remaining_minutes: spot.remaining_minutes,
        max_free_minutes: spot.max_free_minutes,
    }
}

/// VisitorRecord 转 VisitorDto
pub fn visitor_to_dto(record: VisitorRecord) -> VisitorDto {
    VisitorDto {
        id: record.id,
        name: record.name,
        document_id: record.document_id,
        kind: record.kind.as_str().to_string(),
        vehicle_plate: record.vehicle_plate,
        destination_unit: record.destination_unit,
        resident_name: record.resident_name,
        entry_time: record.entry_time_ms,
        exit_time: record.exit_time_ms,
        parking_spot: record.bound_spot_code,
        status: record.status.as_str().to_string(),
    }
}

/// Alert 转 AlertDto
pub fn alert_to_dto(alert: Alert) -> AlertDto {
    AlertDto {
        id: alert.id,
        alert_type: alert.alert_type.as_str().to_string(),
        title: alert.title,
        message: alert.message,
        timestamp: alert.timestamp_ms,
        priority: alert.priority.as_str().to_string(),
        read: alert.read,
        related_id: alert.related_id,
        action_required: alert.action_required,
    }
}

/// ChargeQuote 转 ChargeQuoteDto
pub fn quote_to_dto(
    spot_code: Option<String>,
    overtime_minutes: i64,
    quote: ChargeQuote,
) -> ChargeQuoteDto {
    ChargeQuoteDto {
        spot_code,
        overtime_minutes,
        billed_minutes: quote.billed_minutes,
        blocks: quote.blocks,
        amount: quote.amount,
        capped: quote.capped,
    }
}

/// ParkingRequest 转 ParkingRequestDto
pub fn request_to_dto(request: ParkingRequest) -> ParkingRequestDto {
    ParkingRequestDto {
        id: request.id,
        resident_unit: request.resident_unit,
        visitor_name: request.visitor_name,
        vehicle_plate: request.vehicle_plate,
        scheduled_at: request.scheduled_at_ms,
        duration_hours: request.duration_hours,
        status: request.status.as_str().to_string(),
        spot_assigned: request.spot_assigned,
        created_at: request.created_at_ms,
        updated_at: request.updated_at_ms,
    }
}

pub fn tariff_to_dto(tariff: TariffConfig) -> TariffDto {
    TariffDto {
        free_minutes: tariff.free_minutes,
        hourly_rate: tariff.hourly_rate,
        overtime_multiplier: tariff.overtime_multiplier,
        max_overtime_hours: tariff.max_overtime_hours,
    }
}

pub fn tariff_from_dto(dto: TariffDto) -> TariffConfig {
    TariffConfig {
        free_minutes: dto.free_minutes,
        hourly_rate: dto.hourly_rate,
        overtime_multiplier: dto.overtime_multiplier,
        max_overtime_hours: dto.max_overtime_hours,
    }
}

pub fn dashboard_to_dto(building: &BuildingContext, stats: DashboardStats) -> DashboardDto {
    DashboardDto {
        building_id: building.building_id.clone(),
        building_name: building.building_name.clone(),
        total_spots: stats.spots.total,
        available_spots: stats.spots.available,
        occupied_spots: stats.spots.occupied,
        reserved_spots: stats.spots.reserved,
        overtime_spots: stats.spots.overtime,
        visitors_inside: stats.visitors.inside,
        vehicles_inside: stats.visitors.vehicles_inside,
        pedestrians_inside: stats.visitors.pedestrians_inside,
        visitors_exited: stats.visitors.exited,
        pending_requests: stats.pending_requests,
        unread_alerts: stats.unread_alerts,
        critical_alerts: stats.critical_alerts,
    }
}
