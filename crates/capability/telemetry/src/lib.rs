//! 追踪、请求 ID 与占用指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 占用指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub claims: u64,
    pub claims_rejected: u64,
    pub reservations: u64,
    pub releases: u64,
    pub ticks: u64,
    pub overtime_entered: u64,
    pub entries: u64,
    pub exits: u64,
    pub alerts_emitted: u64,
    pub integrity_warnings: u64,
}

/// 占用指标（进程内计数）。
pub struct TelemetryMetrics {
    claims: AtomicU64,
    claims_rejected: AtomicU64,
    reservations: AtomicU64,
    releases: AtomicU64,
    ticks: AtomicU64,
    overtime_entered: AtomicU64,
    entries: AtomicU64,
    exits: AtomicU64,
    alerts_emitted: AtomicU64,
    integrity_warnings: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            claims: AtomicU64::new(0),
            claims_rejected: AtomicU64::new(0),
            reservations: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            overtime_entered: AtomicU64::new(0),
            entries: AtomicU64::new(0),
            exits: AtomicU64::new(0),
            alerts_emitted: AtomicU64::new(0),
            integrity_warnings: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            claims: self.claims.load(Ordering::Relaxed),
            claims_rejected: self.claims_rejected.load(Ordering::Relaxed),
            reservations: self.reservations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            overtime_entered: self.overtime_entered.load(Ordering::Relaxed),
            entries: self.entries.load(Ordering::Relaxed),
            exits: self.exits.load(Ordering::Relaxed),
            alerts_emitted: self.alerts_emitted.load(Ordering::Relaxed),
            integrity_warnings: self.integrity_warnings.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录车位占用成功次数。
pub fn record_claim() {
    metrics().claims.fetch_add(1, Ordering::Relaxed);
}

/// 记录车位占用被拒次数（车位不可用）。
pub fn record_claim_rejected() {
    metrics().claims_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录住户预约次数。
pub fn record_reservation() {
    metrics().reservations.fetch_add(1, Ordering::Relaxed);
}

/// 记录车位释放次数（不含幂等空释放）。
pub fn record_release() {
    metrics().releases.fetch_add(1, Ordering::Relaxed);
}

/// 记录计时推进次数。
pub fn record_tick() {
    metrics().ticks.fetch_add(1, Ordering::Relaxed);
}

/// 记录 Occupied → Overtime 迁移次数。
pub fn record_overtime_entered() {
    metrics().overtime_entered.fetch_add(1, Ordering::Relaxed);
}

/// 记录访客入场次数。
pub fn record_entry() {
    metrics().entries.fetch_add(1, Ordering::Relaxed);
}

/// 记录访客离场次数。
pub fn record_exit() {
    metrics().exits.fetch_add(1, Ordering::Relaxed);
}

/// 记录告警生成次数。
pub fn record_alert_emitted() {
    metrics().alerts_emitted.fetch_add(1, Ordering::Relaxed);
}

/// 记录数据一致性告警次数。
pub fn record_integrity_warning() {
    metrics()
        .integrity_warnings
        .fetch_add(1, Ordering::Relaxed);
}
