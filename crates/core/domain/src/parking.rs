//! 访客车位模型与状态迁移表。

use std::fmt;

/// 车位状态，任一时刻只有一个成立。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpotStatus {
    Available,
    Occupied,
    Reserved,
    Overtime,
}

/// 驱动车位状态变化的事件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotEvent {
    Claim,
    Reserve,
    Release,
    /// 计时扣减后的剩余分钟数。
    Tick { remaining: i64 },
}

impl SpotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotStatus::Available => "available",
            SpotStatus::Occupied => "occupied",
            SpotStatus::Reserved => "reserved",
            SpotStatus::Overtime => "overtime",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Some(SpotStatus::Available),
            "occupied" => Some(SpotStatus::Occupied),
            "reserved" => Some(SpotStatus::Reserved),
            "overtime" => Some(SpotStatus::Overtime),
            _ => None,
        }
    }

    /// 车位是否绑定了访客（计时中）。
    pub fn is_bound(&self) -> bool {
        matches!(self, SpotStatus::Occupied | SpotStatus::Overtime)
    }

    /// 状态迁移表。
    ///
    /// 返回 `None` 表示该事件在当前状态下非法：
    /// - Available 经 Claim 进入 Occupied，经 Reserve 进入 Reserved；
    /// - Reserved 可被 Claim 或 Release；
    /// - Occupied 计时到负数时进入 Overtime；
    /// - Overtime 只能经 Release 回到 Available。
    ///
    /// 对 Available 的 Release 是幂等的空操作。
    pub fn transition(self, event: SpotEvent) -> Option<SpotStatus> {
        use SpotStatus::*;
        match (self, event) {
            (Available, SpotEvent::Claim) | (Reserved, SpotEvent::Claim) => Some(Occupied),
            (Available, SpotEvent::Reserve) => Some(Reserved),
            (Available, SpotEvent::Release)
            | (Occupied, SpotEvent::Release)
            | (Overtime, SpotEvent::Release)
            | (Reserved, SpotEvent::Release) => Some(Available),
            (Occupied, SpotEvent::Tick { remaining }) if remaining >= 0 => Some(Occupied),
            (Occupied, SpotEvent::Tick { .. }) | (Overtime, SpotEvent::Tick { .. }) => {
                Some(Overtime)
            }
            _ => None,
        }
    }
}

impl fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 访客车位记录。
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpot {
    pub id: String,
    pub code: String,
    pub status: SpotStatus,
    pub bound_visitor_id: Option<String>,
    pub resident_unit: Option<String>,
    pub visitor_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub entry_time_ms: Option<i64>,
    /// Occupied 时非负；Overtime 时为负，其相反数即超时分钟数。
    pub remaining_minutes: Option<i64>,
    pub max_free_minutes: i64,
}

impl ParkingSpot {
    /// 构造空闲车位。
    pub fn new(id: impl Into<String>, code: impl Into<String>, max_free_minutes: i64) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            status: SpotStatus::Available,
            bound_visitor_id: None,
            resident_unit: None,
            visitor_name: None,
            vehicle_plate: None,
            entry_time_ms: None,
            remaining_minutes: None,
            max_free_minutes,
        }
    }

    /// 已超出免费时长的分钟数（未超时为 0）。
    pub fn overtime_minutes(&self) -> i64 {
        match self.remaining_minutes {
            Some(remaining) if remaining < 0 => -remaining,
            _ => 0,
        }
    }

    /// 校验状态与绑定字段的一致性。
    pub fn is_consistent(&self) -> bool {
        match self.status {
            SpotStatus::Occupied => {
                self.bound_visitor_id.is_some()
                    && matches!(self.remaining_minutes, Some(remaining) if remaining >= 0)
            }
            SpotStatus::Overtime => {
                self.bound_visitor_id.is_some()
                    && matches!(self.remaining_minutes, Some(remaining) if remaining < 0)
            }
            SpotStatus::Reserved => {
                self.bound_visitor_id.is_none() && self.resident_unit.is_some()
            }
            SpotStatus::Available => {
                self.bound_visitor_id.is_none()
                    && self.resident_unit.is_none()
                    && self.remaining_minutes.is_none()
            }
        }
    }

    /// 清空绑定字段并回到 Available。
    pub fn reset(&mut self) {
        self.status = SpotStatus::Available;
        self.bound_visitor_id = None;
        self.resident_unit = None;
        self.visitor_name = None;
        self.vehicle_plate = None;
        self.entry_time_ms = None;
        self.remaining_minutes = None;
    }
}

/// 占用车位时携带的绑定信息。
#[derive(Debug, Clone, Default)]
pub struct SpotClaim {
    pub visitor_id: String,
    pub resident_unit: Option<String>,
    pub visitor_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub claimed_at_ms: Option<i64>,
}

impl SpotClaim {
    pub fn new(visitor_id: impl Into<String>, resident_unit: Option<String>) -> Self {
        Self {
            visitor_id: visitor_id.into(),
            resident_unit,
            ..Self::default()
        }
    }

    pub fn with_vehicle(
        mut self,
        visitor_name: impl Into<String>,
        vehicle_plate: Option<String>,
        claimed_at_ms: i64,
    ) -> Self {
        self.visitor_name = Some(visitor_name.into());
        self.vehicle_plate = vehicle_plate;
        self.claimed_at_ms = Some(claimed_at_ms);
        self
    }
}
