//! 住户访客停车申请。

/// 申请状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            "completed" => Some(RequestStatus::Completed),
            _ => None,
        }
    }

    /// 合法迁移：
    /// - Pending 经审批进入 Approved，或被驳回；
    /// - Approved 在访客到场时完成，到场前仍可驳回。
    pub fn can_become(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Completed) | (Approved, Rejected)
        )
    }
}

/// 住户提交的申请。
#[derive(Debug, Clone)]
pub struct NewParkingRequest {
    pub resident_unit: String,
    pub visitor_name: String,
    pub vehicle_plate: String,
    /// 预计到达时间（Unix 毫秒）。
    pub scheduled_at_ms: i64,
    pub duration_hours: u32,
}

/// 停车申请记录。`spot_assigned` 在审批时写入。
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingRequest {
    pub id: String,
    pub resident_unit: String,
    pub visitor_name: String,
    pub vehicle_plate: String,
    pub scheduled_at_ms: i64,
    pub duration_hours: u32,
    pub status: RequestStatus,
    pub spot_assigned: Option<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}
