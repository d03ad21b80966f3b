//! 告警生成：只根据输入的状态迁移构造告警，不回读其他组件。

use domain::{Alert, AlertPriority, AlertType, ParkingRequest, ParkingSpot, VisitorRecord};
use std::collections::HashSet;

/// 告警生成器。
#[derive(Debug, Clone, Default)]
pub struct AlertEmitter;

impl AlertEmitter {
    pub fn new() -> Self {
        Self
    }

    /// 访客入场告警（低优先级）。
    pub fn on_entry(&self, visitor: &VisitorRecord, now_ms: i64) -> Alert {
        let mut message = format!(
            "{} ({}) has entered to visit unit {}.",
            visitor.name,
            visitor.kind.as_str(),
            visitor.destination_unit
        );
        if let Some(code) = visitor.bound_spot_code.as_deref() {
            message.push_str(&format!(" Assigned parking spot {}.", code));
        }
        new_alert(
            AlertType::VisitorEntry,
            "New Visitor Entry",
            message,
            AlertPriority::Low,
            Some(visitor.id.clone()),
            now_ms,
        )
    }

    /// 访客离场告警（低优先级）。
    pub fn on_exit(&self, visitor: &VisitorRecord, now_ms: i64) -> Alert {
        new_alert(
            AlertType::VisitorExit,
            "Visitor Exit",
            format!(
                "{} has left after visiting unit {}.",
                visitor.name, visitor.destination_unit
            ),
            AlertPriority::Low,
            Some(visitor.id.clone()),
            now_ms,
        )
    }

    /// 车位进入超时告警（高优先级，需要处理）。
    ///
    /// 每个占用周期只应生成一次：调用方以登记表报告的 Occupied → Overtime
    /// 迁移触发，并用 [`OvertimeEpisodes`] 按周期去重。
    pub fn on_overtime_entered(
        &self,
        spot: &ParkingSpot,
        visitor: Option<&VisitorRecord>,
        now_ms: i64,
    ) -> Alert {
        let vehicle = spot
            .vehicle_plate
            .as_deref()
            .or_else(|| visitor.and_then(|visitor| visitor.vehicle_plate.as_deref()))
            .unwrap_or("unknown vehicle");
        let mut message = format!(
            "Vehicle {} in spot {} has exceeded the free parking time by {} min.",
            vehicle,
            spot.code,
            spot.overtime_minutes()
        );
        if let Some(visitor) = visitor {
            message.push_str(&format!(
                " Visitor {} for unit {}.",
                visitor.name, visitor.destination_unit
            ));
        }
        let mut alert = new_alert(
            AlertType::ParkingOvertime,
            "Parking Overtime",
            message,
            AlertPriority::High,
            Some(spot.id.clone()),
            now_ms,
        );
        alert.action_required = true;
        alert
    }

    /// 住户提交访客停车申请，等待值班员审批（中优先级）。
    pub fn on_parking_request(&self, request: &ParkingRequest, now_ms: i64) -> Alert {
        let mut alert = new_alert(
            AlertType::ParkingRequest,
            "Parking Request",
            format!(
                "Unit {} requested a visitor spot for {} ({}), {} h.",
                request.resident_unit,
                request.visitor_name,
                request.vehicle_plate,
                request.duration_hours
            ),
            AlertPriority::Medium,
            Some(request.id.clone()),
            now_ms,
        );
        alert.action_required = true;
        alert
    }

    /// 超时达到计费上限，升级人工处理（紧急）。
    pub fn on_overtime_escalation(&self, spot: &ParkingSpot, amount: i64, now_ms: i64) -> Alert {
        let mut alert = new_alert(
            AlertType::System,
            "Overtime Cap Reached",
            format!(
                "Spot {} reached the overtime billing cap ({} min over, charge {}). Manual review required.",
                spot.code,
                spot.overtime_minutes(),
                amount
            ),
            AlertPriority::Critical,
            Some(spot.id.clone()),
            now_ms,
        );
        alert.action_required = true;
        alert
    }

    /// 数据一致性告警：台账与登记表不一致时提示值班员，而不是中断操作。
    pub fn on_integrity_warning(
        &self,
        message: impl Into<String>,
        related_id: Option<String>,
        now_ms: i64,
    ) -> Alert {
        new_alert(
            AlertType::System,
            "Data Integrity Warning",
            message.into(),
            AlertPriority::Medium,
            related_id,
            now_ms,
        )
    }
}

fn new_alert(
    alert_type: AlertType,
    title: &str,
    message: String,
    priority: AlertPriority,
    related_id: Option<String>,
    now_ms: i64,
) -> Alert {
    Alert {
        id: uuid::Uuid::new_v4().to_string(),
        alert_type,
        title: title.to_string(),
        message,
        timestamp_ms: now_ms,
        priority,
        read: false,
        related_id,
        action_required: false,
    }
}

/// 占用周期内的告警标记。
///
/// 周期以（车位编码, 绑定访客 ID）区分：释放后迟到的标记只属于旧访客，
/// 不会挡住同一车位下一位访客的告警。车位释放时 `reset` 清理该车位的全部标记。
#[derive(Debug, Default)]
pub struct OvertimeEpisodes {
    alerted: HashSet<(String, String)>,
    escalated: HashSet<(String, String)>,
}

impl OvertimeEpisodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本周期首次调用返回 true。
    pub fn should_alert(&mut self, spot_code: &str, visitor_id: &str) -> bool {
        self.alerted.insert(episode(spot_code, visitor_id))
    }

    /// 本周期首次达到计费上限时返回 true。
    pub fn should_escalate(&mut self, spot_code: &str, visitor_id: &str) -> bool {
        self.escalated.insert(episode(spot_code, visitor_id))
    }

    pub fn is_alerted(&self, spot_code: &str, visitor_id: &str) -> bool {
        self.alerted.contains(&episode(spot_code, visitor_id))
    }

    pub fn reset(&mut self, spot_code: &str) {
        self.alerted.retain(|(code, _)| code != spot_code);
        self.escalated.retain(|(code, _)| code != spot_code);
    }
}

fn episode(spot_code: &str, visitor_id: &str) -> (String, String) {
    (spot_code.to_string(), visitor_id.to_string())
}
