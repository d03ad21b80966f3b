//! # 访客车位登记表
//!
//! 持有楼宇访客车位的权威状态，并通过 `SpotStatus::transition` 迁移表
//! 约束状态机：
//!
//! ```text
//! Available --claim--> Occupied --tick(<0)--> Overtime --release--> Available
//! Available --reserve--> Reserved --claim/release--> ...
//! ```
//!
//! 所有变更在同一把写锁内完成“检查 + 写入”，因此并发占用同一车位时
//! 只有一个调用方成功，其余返回 `SpotUnavailable`。

pub mod error;

pub use error::RegistryError;

use domain::{ParkingSpot, SpotClaim, SpotEvent, SpotStatus};
use pms_telemetry::{
    record_claim, record_claim_rejected, record_overtime_entered, record_release,
    record_reservation,
};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// 单个车位一次计时推进的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub spot: ParkingSpot,
    /// 本次推进是否发生了 Occupied → Overtime 迁移。
    pub entered_overtime: bool,
}

/// 占用结果：占用后的车位与占用前的快照（回滚时使用）。
#[derive(Debug, Clone, PartialEq)]
pub struct Claimed {
    pub spot: ParkingSpot,
    pub previous: ParkingSpot,
}

/// 释放结果。
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// 释放前的车位快照。
    Released { previous: ParkingSpot },
    /// 车位本已空闲（重复离场信号），无状态变化。
    AlreadyAvailable,
}

impl ReleaseOutcome {
    pub fn was_released(&self) -> bool {
        matches!(self, ReleaseOutcome::Released { .. })
    }
}

/// 各状态车位数量。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancyCounts {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub reserved: usize,
    pub overtime: usize,
}

/// 内存车位登记表（按车位编码排序）。
pub struct SpotRegistry {
    spots: RwLock<BTreeMap<String, ParkingSpot>>,
}

impl SpotRegistry {
    /// 以给定车位清单建立登记表，车位编码重复时拒绝。
    pub fn from_spots(spots: Vec<ParkingSpot>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for spot in spots {
            if spot.code.trim().is_empty() {
                return Err(RegistryError::Invalid("spot code required".to_string()));
            }
            if !spot.is_consistent() {
                warn!(
                    target: "pms.registry",
                    spot_code = %spot.code,
                    status = %spot.status,
                    "spot_seed_inconsistent"
                );
            }
            if map.insert(spot.code.clone(), spot).is_some() {
                return Err(RegistryError::Invalid("duplicate spot code".to_string()));
            }
        }
        Ok(Self {
            spots: RwLock::new(map),
        })
    }

    /// 建立固定数量的空闲车位：`{prefix}-01` .. `{prefix}-NN`。
    pub fn with_inventory(prefix: &str, count: u32, max_free_minutes: i64) -> Self {
        let prefix = prefix.trim_end_matches('-');
        let spots: BTreeMap<String, ParkingSpot> = (1..=count)
            .map(|index| {
                let code = format!("{}-{:02}", prefix, index);
                let id = format!("spot-{}", code.to_ascii_lowercase());
                ParkingSpot::new(id, code, max_free_minutes)
            })
            .map(|spot| (spot.code.clone(), spot))
            .collect();
        Self {
            spots: RwLock::new(spots),
        }
    }

    /// 占用车位：仅 Available 或 Reserved 可占用。
    ///
    /// 失败时不产生任何副作用。
    pub fn claim(&self, code: &str, claim: SpotClaim) -> Result<ParkingSpot, RegistryError> {
        self.claim_spot(code, claim).map(|claimed| claimed.spot)
    }

    /// 与 `claim` 相同，同时返回占用前的快照。
    pub fn claim_spot(&self, code: &str, claim: SpotClaim) -> Result<Claimed, RegistryError> {
        if claim.visitor_id.trim().is_empty() {
            return Err(RegistryError::Invalid("visitor_id required".to_string()));
        }
        let mut spots = self.write()?;
        let spot = spots
            .get_mut(code)
            .ok_or_else(|| RegistryError::UnknownSpot(code.to_string()))?;
        let Some(next) = spot.status.transition(SpotEvent::Claim) else {
            record_claim_rejected();
            warn!(
                target: "pms.registry",
                spot_code = %code,
                status = %spot.status,
                visitor_id = %claim.visitor_id,
                "spot_claim_rejected"
            );
            return Err(RegistryError::SpotUnavailable {
                code: code.to_string(),
                status: spot.status,
            });
        };

        let previous = spot.clone();
        // 预约转入场时保留预约住户单元。
        let resident_unit = claim.resident_unit.or_else(|| spot.resident_unit.take());
        spot.status = next;
        spot.bound_visitor_id = Some(claim.visitor_id);
        spot.resident_unit = resident_unit;
        spot.visitor_name = claim.visitor_name;
        spot.vehicle_plate = claim.vehicle_plate;
        spot.entry_time_ms = claim.claimed_at_ms;
        spot.remaining_minutes = Some(spot.max_free_minutes);
        record_claim();
        info!(
            target: "pms.registry",
            spot_code = %spot.code,
            visitor_id = ?spot.bound_visitor_id,
            resident_unit = ?spot.resident_unit,
            remaining_minutes = spot.max_free_minutes,
            "spot_claimed"
        );
        Ok(Claimed {
            spot: spot.clone(),
            previous,
        })
    }

    /// 撤销一次占用，把车位恢复为占用前的快照（预约状态随之恢复）。
    ///
    /// 仅当车位仍绑定到 `visitor_id` 时生效；车位已被释放或转给他人时
    /// 返回 false 且不改变状态。免费时长保留当前值。
    pub fn restore(&self, previous: &ParkingSpot, visitor_id: &str) -> Result<bool, RegistryError> {
        let mut spots = self.write()?;
        let spot = spots
            .get_mut(&previous.code)
            .ok_or_else(|| RegistryError::UnknownSpot(previous.code.clone()))?;
        if spot.bound_visitor_id.as_deref() != Some(visitor_id) {
            warn!(
                target: "pms.registry",
                spot_code = %spot.code,
                visitor_id = %visitor_id,
                bound_visitor_id = ?spot.bound_visitor_id,
                "spot_restore_skipped"
            );
            return Ok(false);
        }
        let max_free_minutes = spot.max_free_minutes;
        *spot = previous.clone();
        spot.max_free_minutes = max_free_minutes;
        info!(
            target: "pms.registry",
            spot_code = %spot.code,
            status = %spot.status,
            visitor_id = %visitor_id,
            "spot_claim_restored"
        );
        Ok(true)
    }

    /// 住户预约车位：仅 Available 可预约。
    pub fn reserve(&self, code: &str, resident_unit: &str) -> Result<ParkingSpot, RegistryError> {
        let resident_unit = resident_unit.trim();
        if resident_unit.is_empty() {
            return Err(RegistryError::Invalid("resident_unit required".to_string()));
        }
        let mut spots = self.write()?;
        let spot = spots
            .get_mut(code)
            .ok_or_else(|| RegistryError::UnknownSpot(code.to_string()))?;
        let Some(next) = spot.status.transition(SpotEvent::Reserve) else {
            return Err(RegistryError::SpotUnavailable {
                code: code.to_string(),
                status: spot.status,
            });
        };
        spot.status = next;
        spot.resident_unit = Some(resident_unit.to_string());
        record_reservation();
        info!(
            target: "pms.registry",
            spot_code = %spot.code,
            resident_unit = %resident_unit,
            "spot_reserved"
        );
        Ok(spot.clone())
    }

    /// 取消住户预约：仅当车位仍为该单元预约时释放，否则返回 false。
    pub fn cancel_reservation(&self, code: &str, resident_unit: &str) -> Result<bool, RegistryError> {
        let mut spots = self.write()?;
        let spot = spots
            .get_mut(code)
            .ok_or_else(|| RegistryError::UnknownSpot(code.to_string()))?;
        if spot.status != SpotStatus::Reserved
            || spot.resident_unit.as_deref() != Some(resident_unit.trim())
        {
            debug!(
                target: "pms.registry",
                spot_code = %code,
                status = %spot.status,
                "spot_reservation_cancel_noop"
            );
            return Ok(false);
        }
        Ok(release_spot(spot).was_released())
    }

    /// 释放车位（值班员强制释放）。
    ///
    /// 对已空闲车位为幂等空操作。
    pub fn release(&self, code: &str) -> Result<ReleaseOutcome, RegistryError> {
        let mut spots = self.write()?;
        let spot = spots
            .get_mut(code)
            .ok_or_else(|| RegistryError::UnknownSpot(code.to_string()))?;
        Ok(release_spot(spot))
    }

    /// 访客离场释放：车位必须绑定到该访客。
    ///
    /// 已空闲视为重复离场信号，返回成功；绑定到其他访客或处于预约状态时
    /// 返回 `SpotNotBound` 且不改变状态。
    pub fn release_visitor(
        &self,
        code: &str,
        visitor_id: &str,
    ) -> Result<ReleaseOutcome, RegistryError> {
        let mut spots = self.write()?;
        let spot = spots
            .get_mut(code)
            .ok_or_else(|| RegistryError::UnknownSpot(code.to_string()))?;
        if spot.status == SpotStatus::Available {
            return Ok(ReleaseOutcome::AlreadyAvailable);
        }
        if spot.bound_visitor_id.as_deref() != Some(visitor_id) {
            warn!(
                target: "pms.registry",
                spot_code = %code,
                status = %spot.status,
                visitor_id = %visitor_id,
                bound_visitor_id = ?spot.bound_visitor_id,
                "spot_release_not_bound"
            );
            return Err(RegistryError::SpotNotBound {
                code: code.to_string(),
                visitor_id: visitor_id.to_string(),
            });
        }
        Ok(release_spot(spot))
    }

    /// 推进单个车位的计时，仅作用于 Occupied / Overtime。
    pub fn tick(&self, code: &str, delta_minutes: u32) -> Result<Option<TickOutcome>, RegistryError> {
        let mut spots = self.write()?;
        let spot = spots
            .get_mut(code)
            .ok_or_else(|| RegistryError::UnknownSpot(code.to_string()))?;
        Ok(apply_tick(spot, delta_minutes))
    }

    /// 在一次写锁内推进所有计时中的车位。
    pub fn tick_all(&self, delta_minutes: u32) -> Result<Vec<TickOutcome>, RegistryError> {
        let mut spots = self.write()?;
        Ok(spots
            .values_mut()
            .filter_map(|spot| apply_tick(spot, delta_minutes))
            .collect())
    }

    /// 更新免费时长，只影响之后的占用。
    pub fn set_max_free_minutes(&self, minutes: i64) -> Result<(), RegistryError> {
        if minutes <= 0 {
            return Err(RegistryError::Invalid("max_free_minutes must be positive".to_string()));
        }
        let mut spots = self.write()?;
        for spot in spots.values_mut() {
            spot.max_free_minutes = minutes;
        }
        Ok(())
    }

    pub fn get(&self, code: &str) -> Result<Option<ParkingSpot>, RegistryError> {
        let spots = self.read()?;
        Ok(spots.get(code).cloned())
    }

    pub fn contains(&self, code: &str) -> Result<bool, RegistryError> {
        let spots = self.read()?;
        Ok(spots.contains_key(code))
    }

    /// 按车位编码列出所有车位。
    pub fn list(&self) -> Result<Vec<ParkingSpot>, RegistryError> {
        let spots = self.read()?;
        Ok(spots.values().cloned().collect())
    }

    /// 登记表视角下的空闲车位。
    ///
    /// 不知道台账中是否仍有在场访客绑定该车位；门岗选位请用值班服务的
    /// `available_spots`。调用方展示前仍需以 `claim` 的结果为准。
    pub fn available(&self) -> Result<Vec<ParkingSpot>, RegistryError> {
        let spots = self.read()?;
        Ok(spots
            .values()
            .filter(|spot| spot.status == SpotStatus::Available)
            .cloned()
            .collect())
    }

    pub fn counts(&self) -> Result<OccupancyCounts, RegistryError> {
        let spots = self.read()?;
        let mut counts = OccupancyCounts {
            total: spots.len(),
            ..OccupancyCounts::default()
        };
        for spot in spots.values() {
            match spot.status {
                SpotStatus::Available => counts.available += 1,
                SpotStatus::Occupied => counts.occupied += 1,
                SpotStatus::Reserved => counts.reserved += 1,
                SpotStatus::Overtime => counts.overtime += 1,
            }
        }
        Ok(counts)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, ParkingSpot>>, RegistryError> {
        self.spots.read().map_err(|_| RegistryError::Lock)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, ParkingSpot>>, RegistryError> {
        self.spots.write().map_err(|_| RegistryError::Lock)
    }
}

fn release_spot(spot: &mut ParkingSpot) -> ReleaseOutcome {
    if spot.status == SpotStatus::Available {
        debug!(target: "pms.registry", spot_code = %spot.code, "spot_release_noop");
        return ReleaseOutcome::AlreadyAvailable;
    }
    let previous = spot.clone();
    spot.reset();
    record_release();
    info!(
        target: "pms.registry",
        spot_code = %spot.code,
        previous_status = %previous.status,
        visitor_id = ?previous.bound_visitor_id,
        overtime_minutes = previous.overtime_minutes(),
        "spot_released"
    );
    ReleaseOutcome::Released { previous }
}

fn apply_tick(spot: &mut ParkingSpot, delta_minutes: u32) -> Option<TickOutcome> {
    if !spot.status.is_bound() {
        return None;
    }
    let Some(before) = spot.remaining_minutes else {
        warn!(
            target: "pms.registry",
            spot_code = %spot.code,
            status = %spot.status,
            "spot_tick_missing_remaining"
        );
        return None;
    };
    let remaining = before - i64::from(delta_minutes);
    let next = spot.status.transition(SpotEvent::Tick { remaining })?;
    let entered_overtime = spot.status == SpotStatus::Occupied && next == SpotStatus::Overtime;
    spot.status = next;
    spot.remaining_minutes = Some(remaining);
    if entered_overtime {
        record_overtime_entered();
        info!(
            target: "pms.registry",
            spot_code = %spot.code,
            visitor_id = ?spot.bound_visitor_id,
            remaining_minutes = remaining,
            "spot_entered_overtime"
        );
    }
    Some(TickOutcome {
        spot: spot.clone(),
        entered_overtime,
    })
}
