pub mod alert;
pub mod parking;
pub mod request;
pub mod tariff;
pub mod visitor;

pub use alert::{Alert, AlertPriority, AlertType};
pub use parking::{ParkingSpot, SpotClaim, SpotEvent, SpotStatus};
pub use request::{NewParkingRequest, ParkingRequest, RequestStatus};
pub use tariff::TariffConfig;
pub use visitor::{NewVisitor, VisitorKind, VisitorRecord, VisitorStatus};

use std::time::{SystemTime, UNIX_EPOCH};

/// 楼宇上下文：占用服务及其日志共享的执行上下文。
#[derive(Debug, Clone)]
pub struct BuildingContext {
    pub building_id: String,
    pub building_name: String,
}

impl BuildingContext {
    /// 构造显式楼宇标识的上下文。
    pub fn new(building_id: impl Into<String>, building_name: impl Into<String>) -> Self {
        Self {
            building_id: building_id.into(),
            building_name: building_name.into(),
        }
    }
}

impl Default for BuildingContext {
    /// 空上下文（仅用于测试或占位）。
    fn default() -> Self {
        Self {
            building_id: "".to_string(),
            building_name: "".to_string(),
        }
    }
}

/// 当前 Unix 毫秒时间戳。
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
