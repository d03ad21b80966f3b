//! # 住户停车申请
//!
//! 住户为来访车辆提前申请访客车位，值班员审批时指定车位：
//!
//! ```text
//! Pending --approve(spot)--> Approved --访客到场--> Completed
//!    \                           \
//!     +--reject--> Rejected <-----+
//! ```
//!
//! 申请簿只记录申请状态，不触碰车位登记表；审批时的预约与到场时的
//! 完成由值班服务按顺序驱动。

use domain::{NewParkingRequest, ParkingRequest, RequestStatus};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

/// 单次申请的最长停留时长（小时）。
pub const MAX_DURATION_HOURS: u32 = 4;

/// 申请簿错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("invalid parking request: {0}")]
    Invalid(String),
    #[error("parking request not found: {0}")]
    NotFound(String),
    #[error("parking request {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },
    #[error("lock failed")]
    Lock,
}

/// 提交前的输入校验。
pub fn validate_new_request(request: &NewParkingRequest) -> Result<(), RequestError> {
    if request.resident_unit.trim().is_empty() {
        return Err(RequestError::Invalid("resident_unit required".to_string()));
    }
    if request.visitor_name.trim().is_empty() {
        return Err(RequestError::Invalid("visitor_name required".to_string()));
    }
    if request.vehicle_plate.trim().is_empty() {
        return Err(RequestError::Invalid("vehicle_plate required".to_string()));
    }
    if request.duration_hours == 0 || request.duration_hours > MAX_DURATION_HOURS {
        return Err(RequestError::Invalid(format!(
            "duration_hours must be between 1 and {}",
            MAX_DURATION_HOURS
        )));
    }
    Ok(())
}

/// 内存申请簿（按提交顺序追加）。
pub struct ParkingRequestBook {
    requests: RwLock<Vec<ParkingRequest>>,
}

impl ParkingRequestBook {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
        }
    }

    /// 提交申请，状态为 Pending。
    pub fn submit(
        &self,
        request: NewParkingRequest,
        now_ms: i64,
    ) -> Result<ParkingRequest, RequestError> {
        validate_new_request(&request)?;
        let record = ParkingRequest {
            id: uuid::Uuid::new_v4().to_string(),
            resident_unit: request.resident_unit.trim().to_string(),
            visitor_name: request.visitor_name.trim().to_string(),
            vehicle_plate: request.vehicle_plate.trim().to_ascii_uppercase(),
            scheduled_at_ms: request.scheduled_at_ms,
            duration_hours: request.duration_hours,
            status: RequestStatus::Pending,
            spot_assigned: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        self.write()?.push(record.clone());
        info!(
            target: "pms.requests",
            request_id = %record.id,
            resident_unit = %record.resident_unit,
            vehicle_plate = %record.vehicle_plate,
            duration_hours = record.duration_hours,
            "parking_request_submitted"
        );
        Ok(record)
    }

    /// 审批通过并记录指定车位。
    pub fn approve(
        &self,
        request_id: &str,
        spot_code: &str,
        now_ms: i64,
    ) -> Result<ParkingRequest, RequestError> {
        let spot_code = spot_code.trim();
        if spot_code.is_empty() {
            return Err(RequestError::Invalid("spot code required".to_string()));
        }
        self.update(request_id, RequestStatus::Approved, now_ms, |request| {
            request.spot_assigned = Some(spot_code.to_string());
        })
    }

    pub fn reject(&self, request_id: &str, now_ms: i64) -> Result<ParkingRequest, RequestError> {
        self.update(request_id, RequestStatus::Rejected, now_ms, |_| {})
    }

    pub fn complete(&self, request_id: &str, now_ms: i64) -> Result<ParkingRequest, RequestError> {
        self.update(request_id, RequestStatus::Completed, now_ms, |_| {})
    }

    /// 完成指定车位上已审批的申请；没有时返回 `None`。
    pub fn complete_for_spot(
        &self,
        spot_code: &str,
        now_ms: i64,
    ) -> Result<Option<ParkingRequest>, RequestError> {
        let mut requests = self.write()?;
        let Some(request) = requests.iter_mut().find(|request| {
            request.status == RequestStatus::Approved
                && request.spot_assigned.as_deref() == Some(spot_code)
        }) else {
            return Ok(None);
        };
        request.status = RequestStatus::Completed;
        request.updated_at_ms = now_ms;
        info!(
            target: "pms.requests",
            request_id = %request.id,
            spot_code = %spot_code,
            "parking_request_completed"
        );
        Ok(Some(request.clone()))
    }

    pub fn get(&self, request_id: &str) -> Result<Option<ParkingRequest>, RequestError> {
        let requests = self.read()?;
        Ok(requests
            .iter()
            .find(|request| request.id == request_id)
            .cloned())
    }

    /// 申请列表，最新提交在前；`status` 为空时返回全部。
    pub fn list(&self, status: Option<RequestStatus>) -> Result<Vec<ParkingRequest>, RequestError> {
        let requests = self.read()?;
        Ok(requests
            .iter()
            .rev()
            .filter(|request| status.is_none_or(|status| request.status == status))
            .cloned()
            .collect())
    }

    pub fn pending_count(&self) -> Result<usize, RequestError> {
        let requests = self.read()?;
        Ok(requests
            .iter()
            .filter(|request| request.status == RequestStatus::Pending)
            .count())
    }

    fn update(
        &self,
        request_id: &str,
        next: RequestStatus,
        now_ms: i64,
        apply: impl FnOnce(&mut ParkingRequest),
    ) -> Result<ParkingRequest, RequestError> {
        let mut requests = self.write()?;
        let request = requests
            .iter_mut()
            .find(|request| request.id == request_id)
            .ok_or_else(|| RequestError::NotFound(request_id.to_string()))?;
        if !request.status.can_become(next) {
            warn!(
                target: "pms.requests",
                request_id = %request_id,
                status = %request.status.as_str(),
                next = %next.as_str(),
                "parking_request_transition_rejected"
            );
            return Err(RequestError::InvalidTransition {
                id: request_id.to_string(),
                from: request.status.as_str(),
                to: next.as_str(),
            });
        }
        apply(request);
        request.status = next;
        request.updated_at_ms = now_ms;
        info!(
            target: "pms.requests",
            request_id = %request.id,
            status = %next.as_str(),
            spot_code = ?request.spot_assigned,
            "parking_request_updated"
        );
        Ok(request.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<ParkingRequest>>, RequestError> {
        self.requests.read().map_err(|_| RequestError::Lock)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<ParkingRequest>>, RequestError> {
        self.requests.write().map_err(|_| RequestError::Lock)
    }
}

impl Default for ParkingRequestBook {
    fn default() -> Self {
        Self::new()
    }
}
