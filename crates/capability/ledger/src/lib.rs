//! # 访客台账
//!
//! 记录访客入场与离场，独立于车位登记表：
//! - 入场时若为车辆并带车位编码，调用方须已在登记表上成功占用该车位，
//!   台账只记录绑定关系，不回调登记表；
//! - 离场时台账只关闭记录，释放车位由调用方凭 `bound_spot_code` 显式完成。
//!
//! 记录永久保留，作为历史。

use domain::{NewVisitor, VisitorKind, VisitorRecord, VisitorStatus};
use pms_telemetry::{record_entry, record_exit};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// 台账错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid visitor: {0}")]
    Invalid(String),
    #[error("visitor not found: {0}")]
    NotFound(String),
    #[error("visitor already exited: {0}")]
    AlreadyExited(String),
    #[error("spot {code} already bound to visitor {visitor_id}")]
    SpotAlreadyBound { code: String, visitor_id: String },
    #[error("lock failed")]
    Lock,
}

/// 在场访客统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitorCounts {
    pub inside: usize,
    pub vehicles_inside: usize,
    pub pedestrians_inside: usize,
    pub exited: usize,
}

/// 在场访客序列（按入场时间升序，最早在前）。
///
/// 持有调用时刻的快照，逐项惰性产出；`clone` 或 `restart` 即可从头再遍历。
#[derive(Debug, Clone)]
pub struct ActiveVisitors {
    items: Arc<[VisitorRecord]>,
    position: usize,
}

impl ActiveVisitors {
    /// 从头开始的新序列，共享同一快照。
    pub fn restart(&self) -> Self {
        Self {
            items: self.items.clone(),
            position: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Iterator for ActiveVisitors {
    type Item = VisitorRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.position)?.clone();
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ActiveVisitors {}

/// 入场登记前的输入校验。
///
/// 单独暴露，便于调用方在占用车位之前先行拒绝非法输入。
pub fn validate_new_visitor(visitor: &NewVisitor) -> Result<(), LedgerError> {
    if visitor.name.trim().is_empty() {
        return Err(LedgerError::Invalid("name required".to_string()));
    }
    if visitor.document_id.trim().is_empty() {
        return Err(LedgerError::Invalid("document_id required".to_string()));
    }
    if visitor.destination_unit.trim().is_empty() {
        return Err(LedgerError::Invalid("destination_unit required".to_string()));
    }
    match visitor.kind {
        VisitorKind::Vehicle => {
            let has_plate = visitor
                .vehicle_plate
                .as_deref()
                .is_some_and(|plate| !plate.trim().is_empty());
            if !has_plate {
                return Err(LedgerError::Invalid(
                    "vehicle_plate required for vehicle".to_string(),
                ));
            }
        }
        VisitorKind::Pedestrian => {
            if visitor.vehicle_plate.is_some() {
                return Err(LedgerError::Invalid(
                    "vehicle_plate only allowed for vehicle".to_string(),
                ));
            }
            if visitor.parking_spot_code.is_some() {
                return Err(LedgerError::Invalid(
                    "parking spot only allowed for vehicle".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// 内存访客台账（按登记顺序追加）。
pub struct VisitorLedger {
    records: RwLock<Vec<VisitorRecord>>,
}

impl VisitorLedger {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// 登记入场，生成新的访客 ID。
    pub fn register_entry(
        &self,
        visitor: NewVisitor,
        now_ms: i64,
    ) -> Result<VisitorRecord, LedgerError> {
        self.register_entry_with_id(uuid::Uuid::new_v4().to_string(), visitor, now_ms)
    }

    /// 以调用方预先生成的 ID 登记入场（先占车位、后登记时使用）。
    pub fn register_entry_with_id(
        &self,
        id: String,
        visitor: NewVisitor,
        now_ms: i64,
    ) -> Result<VisitorRecord, LedgerError> {
        validate_new_visitor(&visitor)?;
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::Lock)?;
        if records.iter().any(|record| record.id == id) {
            return Err(LedgerError::Invalid(format!("duplicate visitor id: {}", id)));
        }
        let bound_spot_code = visitor
            .parking_spot_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());
        if let Some(code) = bound_spot_code.as_deref() {
            if let Some(existing) = records
                .iter()
                .find(|record| record.is_inside() && record.bound_spot_code.as_deref() == Some(code))
            {
                return Err(LedgerError::SpotAlreadyBound {
                    code: code.to_string(),
                    visitor_id: existing.id.clone(),
                });
            }
        }

        let record = VisitorRecord {
            id,
            name: visitor.name.trim().to_string(),
            document_id: visitor.document_id.trim().to_string(),
            kind: visitor.kind,
            vehicle_plate: visitor
                .vehicle_plate
                .map(|plate| plate.trim().to_ascii_uppercase()),
            destination_unit: visitor.destination_unit.trim().to_string(),
            resident_name: visitor.resident_name.trim().to_string(),
            entry_time_ms: now_ms,
            exit_time_ms: None,
            bound_spot_code,
            status: VisitorStatus::Inside,
        };
        records.push(record.clone());
        record_entry();
        info!(
            target: "pms.ledger",
            visitor_id = %record.id,
            kind = %record.kind.as_str(),
            destination_unit = %record.destination_unit,
            spot_code = ?record.bound_spot_code,
            entry_time_ms = record.entry_time_ms,
            "visitor_entered"
        );
        Ok(record)
    }

    /// 登记离场，返回关闭后的记录；释放车位由调用方负责。
    pub fn register_exit(&self, visitor_id: &str, now_ms: i64) -> Result<VisitorRecord, LedgerError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::Lock)?;
        let record = records
            .iter_mut()
            .find(|record| record.id == visitor_id)
            .ok_or_else(|| LedgerError::NotFound(visitor_id.to_string()))?;
        if record.status == VisitorStatus::Exited {
            warn!(target: "pms.ledger", visitor_id = %visitor_id, "visitor_exit_duplicate");
            return Err(LedgerError::AlreadyExited(visitor_id.to_string()));
        }
        // 离场时间不早于入场时间。
        record.exit_time_ms = Some(now_ms.max(record.entry_time_ms));
        record.status = VisitorStatus::Exited;
        record_exit();
        info!(
            target: "pms.ledger",
            visitor_id = %record.id,
            spot_code = ?record.bound_spot_code,
            exit_time_ms = ?record.exit_time_ms,
            "visitor_exited"
        );
        Ok(record.clone())
    }

    pub fn get(&self, visitor_id: &str) -> Result<Option<VisitorRecord>, LedgerError> {
        let records = self.records.read().map_err(|_| LedgerError::Lock)?;
        Ok(records.iter().find(|record| record.id == visitor_id).cloned())
    }

    /// 在场访客，按入场时间升序（相同时间按登记顺序）。
    pub fn active_visitors(&self) -> Result<ActiveVisitors, LedgerError> {
        let records = self.records.read().map_err(|_| LedgerError::Lock)?;
        let mut items: Vec<VisitorRecord> = records
            .iter()
            .filter(|record| record.is_inside())
            .cloned()
            .collect();
        items.sort_by_key(|record| record.entry_time_ms);
        Ok(ActiveVisitors {
            items: items.into(),
            position: 0,
        })
    }

    /// 占用指定车位的在场访客。
    pub fn find_inside_by_spot(&self, code: &str) -> Result<Option<VisitorRecord>, LedgerError> {
        let records = self.records.read().map_err(|_| LedgerError::Lock)?;
        Ok(records
            .iter()
            .find(|record| record.is_inside() && record.bound_spot_code.as_deref() == Some(code))
            .cloned())
    }

    /// 全部记录，最新入场在前。
    pub fn history(&self) -> Result<Vec<VisitorRecord>, LedgerError> {
        let records = self.records.read().map_err(|_| LedgerError::Lock)?;
        let mut items = records.clone();
        items.reverse();
        items.sort_by(|a, b| b.entry_time_ms.cmp(&a.entry_time_ms));
        Ok(items)
    }

    /// 按姓名、证件号、目的单元或车牌检索，最新入场在前。
    ///
    /// 姓名与车牌不区分大小写；空查询返回全部记录。
    pub fn search(&self, query: &str) -> Result<Vec<VisitorRecord>, LedgerError> {
        let query = query.trim();
        let history = self.history()?;
        if query.is_empty() {
            return Ok(history);
        }
        let lowered = query.to_lowercase();
        Ok(history
            .into_iter()
            .filter(|record| {
                record.name.to_lowercase().contains(&lowered)
                    || record.document_id.contains(query)
                    || record.destination_unit.contains(query)
                    || record
                        .vehicle_plate
                        .as_deref()
                        .is_some_and(|plate| plate.to_lowercase().contains(&lowered))
            })
            .collect())
    }

    pub fn counts(&self) -> Result<VisitorCounts, LedgerError> {
        let records = self.records.read().map_err(|_| LedgerError::Lock)?;
        let mut counts = VisitorCounts::default();
        for record in records.iter() {
            match (record.status, record.kind) {
                (VisitorStatus::Exited, _) => counts.exited += 1,
                (VisitorStatus::Inside, VisitorKind::Vehicle) => {
                    counts.inside += 1;
                    counts.vehicles_inside += 1;
                }
                (VisitorStatus::Inside, VisitorKind::Pedestrian) => {
                    counts.inside += 1;
                    counts.pedestrians_inside += 1;
                }
            }
        }
        Ok(counts)
    }
}

impl Default for VisitorLedger {
    fn default() -> Self {
        Self::new()
    }
}
