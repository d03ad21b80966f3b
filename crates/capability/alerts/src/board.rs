//! 告警看板：持有当前告警集合，支持已读与忽略。

use crate::AlertError;
use domain::Alert;
use pms_telemetry::record_alert_emitted;
use std::sync::RwLock;
use tracing::info;

/// 告警筛选条件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertFilter {
    #[default]
    All,
    Unread,
    /// high 与 critical。
    Critical,
}

impl AlertFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(AlertFilter::All),
            "unread" => Some(AlertFilter::Unread),
            "critical" => Some(AlertFilter::Critical),
            _ => None,
        }
    }

    fn matches(&self, alert: &Alert) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::Unread => !alert.read,
            AlertFilter::Critical => alert.priority.is_urgent(),
        }
    }
}

/// 内存告警看板（最新在前）。
pub struct AlertBoard {
    alerts: RwLock<Vec<Alert>>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(Vec::new()),
        }
    }

    pub fn push(&self, alert: Alert) -> Result<Alert, AlertError> {
        let mut alerts = self.alerts.write().map_err(|_| AlertError::Lock)?;
        info!(
            target: "pms.alerts",
            alert_id = %alert.id,
            alert_type = %alert.alert_type.as_str(),
            priority = %alert.priority.as_str(),
            related_id = ?alert.related_id,
            "alert_emitted"
        );
        alerts.insert(0, alert.clone());
        record_alert_emitted();
        Ok(alert)
    }

    pub fn list(&self) -> Result<Vec<Alert>, AlertError> {
        self.filter(AlertFilter::All)
    }

    pub fn filter(&self, filter: AlertFilter) -> Result<Vec<Alert>, AlertError> {
        let alerts = self.alerts.read().map_err(|_| AlertError::Lock)?;
        Ok(alerts
            .iter()
            .filter(|alert| filter.matches(alert))
            .cloned()
            .collect())
    }

    pub fn get(&self, alert_id: &str) -> Result<Option<Alert>, AlertError> {
        let alerts = self.alerts.read().map_err(|_| AlertError::Lock)?;
        Ok(alerts.iter().find(|alert| alert.id == alert_id).cloned())
    }

    pub fn mark_read(&self, alert_id: &str) -> Result<Alert, AlertError> {
        let mut alerts = self.alerts.write().map_err(|_| AlertError::Lock)?;
        let alert = alerts
            .iter_mut()
            .find(|alert| alert.id == alert_id)
            .ok_or_else(|| AlertError::NotFound(alert_id.to_string()))?;
        alert.read = true;
        Ok(alert.clone())
    }

    /// 全部标为已读，返回本次变更的数量。
    pub fn mark_all_read(&self) -> Result<usize, AlertError> {
        let mut alerts = self.alerts.write().map_err(|_| AlertError::Lock)?;
        let mut changed = 0;
        for alert in alerts.iter_mut().filter(|alert| !alert.read) {
            alert.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    /// 忽略（移除）告警，不影响车位与台账。
    pub fn dismiss(&self, alert_id: &str) -> Result<Alert, AlertError> {
        let mut alerts = self.alerts.write().map_err(|_| AlertError::Lock)?;
        let index = alerts
            .iter()
            .position(|alert| alert.id == alert_id)
            .ok_or_else(|| AlertError::NotFound(alert_id.to_string()))?;
        let alert = alerts.remove(index);
        info!(target: "pms.alerts", alert_id = %alert.id, "alert_dismissed");
        Ok(alert)
    }

    pub fn unread_count(&self) -> Result<usize, AlertError> {
        let alerts = self.alerts.read().map_err(|_| AlertError::Lock)?;
        Ok(alerts.iter().filter(|alert| !alert.read).count())
    }

    /// 未读的 high / critical 告警数。
    pub fn critical_unread_count(&self) -> Result<usize, AlertError> {
        let alerts = self.alerts.read().map_err(|_| AlertError::Lock)?;
        Ok(alerts
            .iter()
            .filter(|alert| !alert.read && alert.priority.is_urgent())
            .count())
    }
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new()
    }
}
