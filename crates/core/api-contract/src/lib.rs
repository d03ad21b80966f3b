//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 车位返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpotDto {
    pub id: String,
    pub code: String,
    /// available / occupied / reserved / overtime
    pub status: String,
    pub visitor_id: Option<String>,
    pub resident_unit: Option<String>,
    pub visitor_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub entry_time: Option<i64>,
    pub remaining_minutes: Option<i64>,
    pub max_free_minutes: i64,
}

/// 车位预约请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSpotRequest {
    #[serde(alias = "resident_unit")]
    pub resident_unit: String,
}

/// 车位释放结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpotResponse {
    pub released: bool,
    pub spot: ParkingSpotDto,
}

/// 访客入场请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEntryRequest {
    pub name: String,
    #[serde(alias = "document_id")]
    pub document_id: String,
    /// pedestrian / vehicle
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(alias = "vehicle_plate")]
    pub vehicle_plate: Option<String>,
    #[serde(alias = "destination_unit")]
    pub destination_unit: String,
    #[serde(default, alias = "resident_name")]
    pub resident_name: String,
    #[serde(alias = "parking_spot")]
    pub parking_spot: Option<String>,
}

/// 访客返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorDto {
    pub id: String,
    pub name: String,
    pub document_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub vehicle_plate: Option<String>,
    pub destination_unit: String,
    pub resident_name: String,
    pub entry_time: i64,
    pub exit_time: Option<i64>,
    pub parking_spot: Option<String>,
    /// inside / exited
    pub status: String,
}

/// 告警返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDto {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub title: String,
    pub message: String,
    pub timestamp: i64,
    pub priority: String,
    pub read: bool,
    pub related_id: Option<String>,
    pub action_required: bool,
}

/// 超时费用明细。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeQuoteDto {
    pub spot_code: Option<String>,
    pub overtime_minutes: i64,
    pub billed_minutes: i64,
    pub blocks: i64,
    pub amount: i64,
    pub capped: bool,
}

/// 入场结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub visitor: VisitorDto,
    pub spot: Option<ParkingSpotDto>,
    pub alert: AlertDto,
}

/// 离场结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitResponse {
    pub visitor: VisitorDto,
    pub spot_released: bool,
    pub charge: Option<ChargeQuoteDto>,
    pub alerts: Vec<AlertDto>,
}

/// 停车申请请求体（住户提交）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitParkingRequest {
    #[serde(alias = "resident_unit")]
    pub resident_unit: String,
    #[serde(alias = "visitor_name")]
    pub visitor_name: String,
    #[serde(alias = "vehicle_plate")]
    pub vehicle_plate: String,
    /// 预计到达时间（Unix 毫秒）
    #[serde(alias = "date", alias = "scheduled_at")]
    pub scheduled_at: i64,
    /// 预计停留小时数
    #[serde(alias = "duration_hours", alias = "duration")]
    pub duration_hours: u32,
}

/// 停车申请审批请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveParkingRequest {
    #[serde(alias = "spot_code")]
    pub spot_code: String,
}

/// 停车申请返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingRequestDto {
    pub id: String,
    pub resident_unit: String,
    pub visitor_name: String,
    pub vehicle_plate: String,
    /// 对应 `date`：预计到达时间
    pub scheduled_at: i64,
    pub duration_hours: u32,
    /// pending / approved / rejected / completed
    pub status: String,
    pub spot_assigned: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 停车申请提交结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitParkingResponse {
    pub request: ParkingRequestDto,
    pub alert: AlertDto,
}

/// 停车申请审批结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveParkingResponse {
    pub request: ParkingRequestDto,
    pub spot: ParkingSpotDto,
}

/// 计费配置（读写共用）。
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffDto {
    #[serde(alias = "free_minutes")]
    pub free_minutes: i64,
    #[serde(alias = "hourly_rate")]
    pub hourly_rate: i64,
    #[serde(alias = "overtime_multiplier")]
    pub overtime_multiplier: f64,
    #[serde(alias = "max_overtime_hours")]
    pub max_overtime_hours: u32,
}

/// 手动推进时钟请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceClockRequest {
    pub minutes: u32,
}

/// 时钟推进结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceClockResponse {
    pub minutes: u32,
    pub alerts: Vec<AlertDto>,
}

/// 全部已读结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

/// 值班面板统计。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub building_id: String,
    pub building_name: String,
    pub total_spots: usize,
    pub available_spots: usize,
    pub occupied_spots: usize,
    pub reserved_spots: usize,
    pub overtime_spots: usize,
    pub visitors_inside: usize,
    pub vehicles_inside: usize,
    pub pedestrians_inside: usize,
    pub visitors_exited: usize,
    pub pending_requests: usize,
    pub unread_alerts: usize,
    pub critical_alerts: usize,
}

/// Telemetry 指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub claims: u64,
    pub claims_rejected: u64,
    pub reservations: u64,
    pub releases: u64,
    pub ticks: u64,
    pub overtime_entered: u64,
    pub entries: u64,
    pub exits: u64,
    pub alerts_emitted: u64,
    pub integrity_warnings: u64,
}
