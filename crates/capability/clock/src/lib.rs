//! 占用计时时钟：核心中唯一推进时间的组件。
//!
//! `advance(n)` 与连续 n 次 `advance(1)` 结果一致；时钟暂停后调用
//! `catch_up` 会把积压的整分钟一次性推进，余下的不足一分钟部分留到下次。

use pms_registry::{RegistryError, SpotRegistry, TickOutcome};
use pms_telemetry::record_tick;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

const MINUTE_MS: i64 = 60_000;

/// 时钟错误。
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("lock failed")]
    Lock,
}

/// 占用计时时钟。
///
/// 只记录“已结算到的时间点”，不持有车位状态。
#[derive(Debug, Default)]
pub struct OccupancyClock {
    settled_at_ms: Mutex<Option<i64>>,
}

impl OccupancyClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定时间点作为计时起点。
    pub fn starting_at(now_ms: i64) -> Self {
        Self {
            settled_at_ms: Mutex::new(Some(now_ms)),
        }
    }

    /// 推进所有计时中车位 `delta_minutes` 分钟。
    pub fn advance(
        &self,
        registry: &SpotRegistry,
        delta_minutes: u32,
    ) -> Result<Vec<TickOutcome>, ClockError> {
        if delta_minutes == 0 {
            return Ok(Vec::new());
        }
        let outcomes = registry.tick_all(delta_minutes)?;
        record_tick();
        debug!(
            target: "pms.clock",
            delta_minutes = delta_minutes,
            ticked_spots = outcomes.len(),
            "clock_advanced"
        );
        Ok(outcomes)
    }

    /// 按墙钟补齐自上次结算以来的整分钟。
    ///
    /// 首次调用只建立起点。时间倒退时不推进，也不移动起点。
    pub fn catch_up(
        &self,
        registry: &SpotRegistry,
        now_ms: i64,
    ) -> Result<Vec<TickOutcome>, ClockError> {
        let minutes = {
            let mut settled = self.settled_at_ms.lock().map_err(|_| ClockError::Lock)?;
            let Some(settled_at) = *settled else {
                *settled = Some(now_ms);
                return Ok(Vec::new());
            };
            let elapsed = now_ms - settled_at;
            if elapsed < 0 {
                warn!(
                    target: "pms.clock",
                    settled_at_ms = settled_at,
                    now_ms = now_ms,
                    "clock_went_backwards"
                );
                return Ok(Vec::new());
            }
            let minutes = (elapsed / MINUTE_MS).min(i64::from(u32::MAX));
            *settled = Some(settled_at + minutes * MINUTE_MS);
            minutes as u32
        };
        self.advance(registry, minutes)
    }

    /// 已结算到的时间点（毫秒）。
    pub fn settled_at_ms(&self) -> Option<i64> {
        self.settled_at_ms.lock().ok().and_then(|settled| *settled)
    }
}

/// 外部固定间隔触发器：每隔 `interval` 调用一次 `on_tick`。
///
/// 错过的间隔不会补发，由 `catch_up` 以更大的分钟数吸收。
pub fn spawn_ticker<F>(interval: Duration, mut on_tick: F) -> tokio::task::JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即完成。
        ticker.tick().await;
        loop {
            ticker.tick().await;
            on_tick();
        }
    })
}
