/// 告警类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertType {
    VisitorEntry,
    ParkingOvertime,
    VisitorExit,
    ParkingRequest,
    Emergency,
    System,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::VisitorEntry => "visitor_entry",
            AlertType::ParkingOvertime => "parking_overtime",
            AlertType::VisitorExit => "visitor_exit",
            AlertType::ParkingRequest => "parking_request",
            AlertType::Emergency => "emergency",
            AlertType::System => "system",
        }
    }
}

/// 告警优先级（按严重程度递增排序）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::Low => "low",
            AlertPriority::Medium => "medium",
            AlertPriority::High => "high",
            AlertPriority::Critical => "critical",
        }
    }

    /// high 与 critical 在值班面板上归入“紧急”。
    pub fn is_urgent(&self) -> bool {
        *self >= AlertPriority::High
    }
}

/// 值班告警记录。创建后只有 `read` 可变。
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: String,
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub timestamp_ms: i64,
    pub priority: AlertPriority,
    pub read: bool,
    pub related_id: Option<String>,
    pub action_required: bool,
}
