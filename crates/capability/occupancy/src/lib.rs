//! # 值班服务
//!
//! 把车位登记表、访客台账、计时时钟、告警与计费组合成门岗/值班员使用的操作。
//! 各组件彼此不回调，跨组件的先后顺序都在这里完成：
//! - 入场：先占车位，再登记台账；台账拒绝时把车位恢复到占用前的状态；
//! - 离场：先关闭台账记录，再按记录上的车位编码释放；
//! - 计时：超时告警由登记表报告的 Occupied → Overtime 迁移触发，
//!   每个占用周期只产生一次；达到计费上限时再升级一次；
//! - 停车申请：审批时先预约车位再记录审批，访客占用该预约车位时申请完成。

mod error;

pub use error::OccupancyError;

use domain::{
    Alert, BuildingContext, NewParkingRequest, NewVisitor, ParkingRequest, ParkingSpot,
    RequestStatus, SpotClaim, SpotStatus, TariffConfig, VisitorKind, VisitorRecord,
};
use pms_alerts::{AlertBoard, AlertEmitter, AlertFilter, OvertimeEpisodes};
use pms_clock::OccupancyClock;
use pms_ledger::{ActiveVisitors, VisitorCounts, VisitorLedger, validate_new_visitor};
use pms_registry::{
    Claimed, OccupancyCounts, RegistryError, ReleaseOutcome, SpotRegistry, TickOutcome,
};
use pms_requests::{ParkingRequestBook, RequestError};
use pms_tariff::ChargeQuote;
use pms_telemetry::record_integrity_warning;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// 入场结果。
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub visitor: VisitorRecord,
    pub spot: Option<ParkingSpot>,
    pub alert: Alert,
}

/// 离场结果。
#[derive(Debug, Clone)]
pub struct ExitOutcome {
    pub visitor: VisitorRecord,
    /// 本次离场实际释放了车位。
    pub spot_released: bool,
    /// 释放前的超时分钟数。
    pub overtime_minutes: i64,
    /// 释放前处于超时状态时的费用。
    pub charge: Option<ChargeQuote>,
    pub alerts: Vec<Alert>,
}

/// 停车申请提交结果。
#[derive(Debug, Clone)]
pub struct SubmittedRequest {
    pub request: ParkingRequest,
    pub alert: Alert,
}

/// 停车申请审批结果：申请与已预约的车位。
#[derive(Debug, Clone)]
pub struct ApprovedRequest {
    pub request: ParkingRequest,
    pub spot: ParkingSpot,
}

/// 值班面板统计。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub spots: OccupancyCounts,
    pub visitors: VisitorCounts,
    pub pending_requests: usize,
    pub unread_alerts: usize,
    pub critical_alerts: usize,
}

/// 值班服务（单栋楼宇）。
#[derive(Clone)]
pub struct OccupancyService {
    building: BuildingContext,
    registry: Arc<SpotRegistry>,
    ledger: Arc<VisitorLedger>,
    requests: Arc<ParkingRequestBook>,
    clock: Arc<OccupancyClock>,
    emitter: AlertEmitter,
    board: Arc<AlertBoard>,
    episodes: Arc<Mutex<OvertimeEpisodes>>,
    tariff: Arc<RwLock<TariffConfig>>,
}

impl OccupancyService {
    pub fn new(building: BuildingContext, registry: SpotRegistry, tariff: TariffConfig) -> Self {
        Self::with_clock(building, registry, tariff, OccupancyClock::new())
    }

    pub fn with_clock(
        building: BuildingContext,
        registry: SpotRegistry,
        tariff: TariffConfig,
        clock: OccupancyClock,
    ) -> Self {
        Self {
            building,
            registry: Arc::new(registry),
            ledger: Arc::new(VisitorLedger::new()),
            requests: Arc::new(ParkingRequestBook::new()),
            clock: Arc::new(clock),
            emitter: AlertEmitter::new(),
            board: Arc::new(AlertBoard::new()),
            episodes: Arc::new(Mutex::new(OvertimeEpisodes::new())),
            tariff: Arc::new(RwLock::new(tariff)),
        }
    }

    pub fn building(&self) -> &BuildingContext {
        &self.building
    }

    pub fn registry(&self) -> &SpotRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &VisitorLedger {
        &self.ledger
    }

    /// 登记入场；车辆访客带车位编码时同时占用车位。
    ///
    /// 占用与登记对调用方是一个整体：任一步失败都不会留下半完成的状态。
    pub fn register_entry(
        &self,
        visitor: NewVisitor,
        now_ms: i64,
    ) -> Result<EntryOutcome, OccupancyError> {
        validate_new_visitor(&visitor)?;
        let visitor_id = uuid::Uuid::new_v4().to_string();
        let spot_code = match visitor.kind {
            VisitorKind::Vehicle => visitor
                .parking_spot_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
            VisitorKind::Pedestrian => None,
        };

        let claimed = match spot_code.as_deref() {
            Some(code) => {
                let plate = visitor
                    .vehicle_plate
                    .as_deref()
                    .map(|plate| plate.trim().to_ascii_uppercase());
                let claim = SpotClaim::new(
                    visitor_id.clone(),
                    Some(visitor.destination_unit.trim().to_string()),
                )
                .with_vehicle(visitor.name.trim(), plate, now_ms);
                Some(self.registry.claim_spot(code, claim)?)
            }
            None => None,
        };

        let record = match self
            .ledger
            .register_entry_with_id(visitor_id.clone(), visitor, now_ms)
        {
            Ok(record) => record,
            Err(err) => {
                if let Some(claimed) = claimed.as_ref() {
                    self.rollback_claim(claimed, &visitor_id);
                }
                return Err(err.into());
            }
        };

        if let Some(claimed) = claimed.as_ref() {
            if claimed.previous.status == SpotStatus::Reserved {
                self.complete_request_on_arrival(&claimed.spot.code, now_ms);
            }
        }

        let alert = self.board.push(self.emitter.on_entry(&record, now_ms))?;
        info!(
            target: "pms.occupancy",
            building_id = %self.building.building_id,
            visitor_id = %record.id,
            spot_code = ?record.bound_spot_code,
            "entry_registered"
        );
        Ok(EntryOutcome {
            visitor: record,
            spot: claimed.map(|claimed| claimed.spot),
            alert,
        })
    }

    fn rollback_claim(&self, claimed: &Claimed, visitor_id: &str) {
        let code = claimed.previous.code.as_str();
        match self.registry.restore(&claimed.previous, visitor_id) {
            Ok(restored) => warn!(
                target: "pms.occupancy",
                spot_code = %code,
                restored_status = %claimed.previous.status,
                restored = restored,
                "entry_claim_rolled_back"
            ),
            Err(err) => warn!(
                target: "pms.occupancy",
                spot_code = %code,
                error = %err,
                "entry_claim_rollback_failed"
            ),
        }
        if let Ok(mut episodes) = self.episodes.lock() {
            episodes.reset(code);
        }
    }

    fn complete_request_on_arrival(&self, code: &str, now_ms: i64) {
        match self.requests.complete_for_spot(code, now_ms) {
            Ok(Some(request)) => info!(
                target: "pms.occupancy",
                request_id = %request.id,
                spot_code = %code,
                "parking_request_fulfilled"
            ),
            Ok(None) => {}
            // 入场已生效，申请状态留给值班员处理。
            Err(err) => warn!(
                target: "pms.occupancy",
                spot_code = %code,
                error = %err,
                "parking_request_complete_failed"
            ),
        }
    }

    /// 登记离场并释放访客绑定的车位。
    ///
    /// 台账记录上的车位在登记表中不存在或已被他人占用时，生成一致性告警而不报错。
    pub fn register_exit(
        &self,
        visitor_id: &str,
        now_ms: i64,
    ) -> Result<ExitOutcome, OccupancyError> {
        let record = self.ledger.register_exit(visitor_id, now_ms)?;
        let mut alerts = Vec::new();
        let mut spot_released = false;
        let mut overtime_minutes = 0;
        let mut charge = None;

        if let Some(code) = record.bound_spot_code.as_deref() {
            match self.registry.release_visitor(code, &record.id) {
                Ok(ReleaseOutcome::Released { previous }) => {
                    spot_released = true;
                    if previous.status == SpotStatus::Overtime {
                        overtime_minutes = previous.overtime_minutes();
                        let tariff = self.tariff()?;
                        charge = Some(pms_tariff::quote(overtime_minutes, &tariff));
                    }
                    self.reset_episode(code)?;
                }
                Ok(ReleaseOutcome::AlreadyAvailable) => {}
                Err(err @ (RegistryError::UnknownSpot(_) | RegistryError::SpotNotBound { .. })) => {
                    record_integrity_warning();
                    warn!(
                        target: "pms.occupancy",
                        visitor_id = %record.id,
                        spot_code = %code,
                        error = %err,
                        "exit_spot_integrity_warning"
                    );
                    let alert = self.emitter.on_integrity_warning(
                        format!(
                            "Visitor {} exited but spot {} could not be released: {}.",
                            record.name, code, err
                        ),
                        Some(record.id.clone()),
                        now_ms,
                    );
                    alerts.push(self.board.push(alert)?);
                }
                Err(err) => return Err(err.into()),
            }
        }

        alerts.push(self.board.push(self.emitter.on_exit(&record, now_ms))?);
        info!(
            target: "pms.occupancy",
            building_id = %self.building.building_id,
            visitor_id = %record.id,
            spot_code = ?record.bound_spot_code,
            spot_released = spot_released,
            charge = ?charge.map(|quote| quote.amount),
            "exit_registered"
        );
        Ok(ExitOutcome {
            visitor: record,
            spot_released,
            overtime_minutes,
            charge,
            alerts,
        })
    }

    /// 值班员强制释放车位，与访客离场无关。
    pub fn force_release(&self, code: &str) -> Result<ReleaseOutcome, OccupancyError> {
        let outcome = self.registry.release(code)?;
        self.reset_episode(code)?;
        Ok(outcome)
    }

    pub fn reserve(&self, code: &str, resident_unit: &str) -> Result<ParkingSpot, OccupancyError> {
        Ok(self.registry.reserve(code, resident_unit)?)
    }

    /// 推进时钟 `delta_minutes` 分钟，返回本次产生的超时告警。
    pub fn advance(&self, delta_minutes: u32, now_ms: i64) -> Result<Vec<Alert>, OccupancyError> {
        let outcomes = self.clock.advance(&self.registry, delta_minutes)?;
        self.alert_overtime(&outcomes, now_ms)
    }

    /// 按墙钟补齐积压的整分钟。
    pub fn catch_up(&self, now_ms: i64) -> Result<Vec<Alert>, OccupancyError> {
        let outcomes = self.clock.catch_up(&self.registry, now_ms)?;
        self.alert_overtime(&outcomes, now_ms)
    }

    /// 处理一次计时推进的结果。
    ///
    /// 超时告警只由 `entered_overtime` 触发：该标记在登记表写锁内计算，
    /// 每个占用周期恰好出现一次，与并发的离场或强制释放无关。
    fn alert_overtime(
        &self,
        outcomes: &[TickOutcome],
        now_ms: i64,
    ) -> Result<Vec<Alert>, OccupancyError> {
        let mut alerts = Vec::new();
        if outcomes.is_empty() {
            return Ok(alerts);
        }
        let tariff = self.tariff()?;
        for outcome in outcomes {
            let spot = &outcome.spot;
            if spot.status != SpotStatus::Overtime {
                continue;
            }
            let Some(visitor_id) = spot.bound_visitor_id.as_deref() else {
                continue;
            };
            let quote = pms_tariff::quote(spot.overtime_minutes(), &tariff);
            let (alert_now, escalate_now) = {
                let mut episodes = self.episodes.lock().map_err(|_| OccupancyError::Lock)?;
                (
                    outcome.entered_overtime && episodes.should_alert(&spot.code, visitor_id),
                    quote.capped && episodes.should_escalate(&spot.code, visitor_id),
                )
            };
            if alert_now {
                let visitor = self.ledger.get(visitor_id)?;
                let alert = self
                    .emitter
                    .on_overtime_entered(spot, visitor.as_ref(), now_ms);
                alerts.push(self.board.push(alert)?);
            }
            if escalate_now {
                let alert = self
                    .emitter
                    .on_overtime_escalation(spot, quote.amount, now_ms);
                alerts.push(self.board.push(alert)?);
            }
        }
        Ok(alerts)
    }

    fn reset_episode(&self, code: &str) -> Result<(), OccupancyError> {
        let mut episodes = self.episodes.lock().map_err(|_| OccupancyError::Lock)?;
        episodes.reset(code);
        Ok(())
    }

    /// 按当前楼宇计费配置计算车位的超时费用（只读）。
    pub fn quote_overtime(&self, code: &str) -> Result<ChargeQuote, OccupancyError> {
        let spot = self.spot(code)?;
        self.quote_spot(&spot)
    }

    /// 对已取得的车位快照报价，费用与快照上的超时分钟一致。
    pub fn quote_spot(&self, spot: &ParkingSpot) -> Result<ChargeQuote, OccupancyError> {
        let tariff = self.tariff()?;
        Ok(pms_tariff::quote(spot.overtime_minutes(), &tariff))
    }

    pub fn tariff(&self) -> Result<TariffConfig, OccupancyError> {
        let tariff = self.tariff.read().map_err(|_| OccupancyError::Lock)?;
        Ok(tariff.clone())
    }

    /// 替换计费配置；新的免费时长只影响之后的占用。
    pub fn update_tariff(&self, tariff: TariffConfig) -> Result<TariffConfig, OccupancyError> {
        pms_tariff::validate(&tariff)?;
        let mut current = self.tariff.write().map_err(|_| OccupancyError::Lock)?;
        self.registry.set_max_free_minutes(tariff.free_minutes)?;
        *current = tariff.clone();
        info!(
            target: "pms.occupancy",
            building_id = %self.building.building_id,
            free_minutes = tariff.free_minutes,
            hourly_rate = tariff.hourly_rate,
            overtime_multiplier = tariff.overtime_multiplier,
            max_overtime_hours = tariff.max_overtime_hours,
            "tariff_updated"
        );
        Ok(tariff)
    }

    pub fn dashboard(&self) -> Result<DashboardStats, OccupancyError> {
        Ok(DashboardStats {
            spots: self.registry.counts()?,
            visitors: self.ledger.counts()?,
            pending_requests: self.requests.pending_count()?,
            unread_alerts: self.board.unread_count()?,
            critical_alerts: self.board.critical_unread_count()?,
        })
    }

    pub fn spots(&self) -> Result<Vec<ParkingSpot>, OccupancyError> {
        Ok(self.registry.list()?)
    }

    pub fn spot(&self, code: &str) -> Result<ParkingSpot, OccupancyError> {
        Ok(self
            .registry
            .get(code)?
            .ok_or_else(|| RegistryError::UnknownSpot(code.to_string()))?)
    }

    /// 门岗可选的空闲车位：排除台账中仍有在场访客绑定的车位
    /// （强制释放后访客尚未离场）。
    pub fn available_spots(&self) -> Result<Vec<ParkingSpot>, OccupancyError> {
        let mut spots = Vec::new();
        for spot in self.registry.available()? {
            if let Some(holder) = self.ledger.find_inside_by_spot(&spot.code)? {
                debug!(
                    target: "pms.occupancy",
                    spot_code = %spot.code,
                    visitor_id = %holder.id,
                    "available_spot_held_by_visitor"
                );
                continue;
            }
            spots.push(spot);
        }
        Ok(spots)
    }

    pub fn active_visitors(&self) -> Result<ActiveVisitors, OccupancyError> {
        Ok(self.ledger.active_visitors()?)
    }

    /// 访客检索，最新入场在前；`active_only` 时只返回在场访客。
    pub fn visitors(
        &self,
        active_only: bool,
        query: Option<&str>,
    ) -> Result<Vec<VisitorRecord>, OccupancyError> {
        let records = self.ledger.search(query.unwrap_or_default())?;
        Ok(records
            .into_iter()
            .filter(|record| !active_only || record.is_inside())
            .collect())
    }

    pub fn visitor(&self, visitor_id: &str) -> Result<Option<VisitorRecord>, OccupancyError> {
        Ok(self.ledger.get(visitor_id)?)
    }

    /// 住户提交访客停车申请，生成待审批告警。
    pub fn submit_parking_request(
        &self,
        request: NewParkingRequest,
        now_ms: i64,
    ) -> Result<SubmittedRequest, OccupancyError> {
        let request = self.requests.submit(request, now_ms)?;
        let alert = self
            .board
            .push(self.emitter.on_parking_request(&request, now_ms))?;
        Ok(SubmittedRequest { request, alert })
    }

    /// 审批申请：先为申请单元预约车位，再记录审批。
    ///
    /// 记录审批失败时取消刚做的预约。
    pub fn approve_parking_request(
        &self,
        request_id: &str,
        spot_code: &str,
        now_ms: i64,
    ) -> Result<ApprovedRequest, OccupancyError> {
        let pending = self
            .requests
            .get(request_id)?
            .ok_or_else(|| RequestError::NotFound(request_id.to_string()))?;
        if !pending.status.can_become(RequestStatus::Approved) {
            return Err(RequestError::InvalidTransition {
                id: pending.id,
                from: pending.status.as_str(),
                to: RequestStatus::Approved.as_str(),
            }
            .into());
        }
        let spot = self.registry.reserve(spot_code, &pending.resident_unit)?;
        let request = match self.requests.approve(request_id, &spot.code, now_ms) {
            Ok(request) => request,
            Err(err) => {
                if let Err(cancel_err) = self
                    .registry
                    .cancel_reservation(&spot.code, &pending.resident_unit)
                {
                    warn!(
                        target: "pms.occupancy",
                        spot_code = %spot.code,
                        error = %cancel_err,
                        "parking_request_reservation_rollback_failed"
                    );
                }
                return Err(err.into());
            }
        };
        info!(
            target: "pms.occupancy",
            building_id = %self.building.building_id,
            request_id = %request.id,
            spot_code = %spot.code,
            resident_unit = %request.resident_unit,
            "parking_request_approved"
        );
        Ok(ApprovedRequest { request, spot })
    }

    /// 驳回申请；已审批的申请同时取消车位预约（访客尚未占用时）。
    pub fn reject_parking_request(
        &self,
        request_id: &str,
        now_ms: i64,
    ) -> Result<ParkingRequest, OccupancyError> {
        let request = self.requests.reject(request_id, now_ms)?;
        if let Some(code) = request.spot_assigned.as_deref() {
            let cancelled = self
                .registry
                .cancel_reservation(code, &request.resident_unit)?;
            info!(
                target: "pms.occupancy",
                request_id = %request.id,
                spot_code = %code,
                reservation_cancelled = cancelled,
                "parking_request_rejected"
            );
        }
        Ok(request)
    }

    pub fn parking_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ParkingRequest>, OccupancyError> {
        Ok(self.requests.list(status)?)
    }

    pub fn parking_request(&self, request_id: &str) -> Result<ParkingRequest, OccupancyError> {
        Ok(self
            .requests
            .get(request_id)?
            .ok_or_else(|| RequestError::NotFound(request_id.to_string()))?)
    }

    pub fn alerts(&self, filter: AlertFilter) -> Result<Vec<Alert>, OccupancyError> {
        Ok(self.board.filter(filter)?)
    }

    pub fn mark_alert_read(&self, alert_id: &str) -> Result<Alert, OccupancyError> {
        Ok(self.board.mark_read(alert_id)?)
    }

    pub fn mark_all_alerts_read(&self) -> Result<usize, OccupancyError> {
        Ok(self.board.mark_all_read()?)
    }

    pub fn dismiss_alert(&self, alert_id: &str) -> Result<Alert, OccupancyError> {
        Ok(self.board.dismiss(alert_id)?)
    }
}
