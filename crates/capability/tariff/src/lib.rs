//! 超时计费：按半小时块向上取整，超出上限的部分按上限计费。

use domain::TariffConfig;
use tracing::debug;

const BLOCK_MINUTES: i64 = 30;

/// 计费配置错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TariffError {
    #[error("invalid tariff: {0}")]
    Invalid(String),
}

/// 一次计费的明细。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeQuote {
    /// 截断到上限后的计费分钟数。
    pub billed_minutes: i64,
    pub blocks: i64,
    pub amount: i64,
    /// 输入超过上限，需人工复核。
    pub capped: bool,
}

/// 超时费用（整数货币单位）。
///
/// `compute_charge(1, 2000×2) = 2000`，`compute_charge(31, 2000×2) = 4000`。
pub fn compute_charge(overtime_minutes: i64, tariff: &TariffConfig) -> i64 {
    quote(overtime_minutes, tariff).amount
}

/// 计算超时费用并返回明细。负数分钟按 0 处理。
pub fn quote(overtime_minutes: i64, tariff: &TariffConfig) -> ChargeQuote {
    let cap = tariff.max_overtime_minutes();
    let capped = overtime_minutes > cap;
    let billed_minutes = overtime_minutes.clamp(0, cap.max(0));
    let blocks = (billed_minutes + BLOCK_MINUTES - 1) / BLOCK_MINUTES;
    let block_rate = tariff.hourly_rate as f64 * tariff.overtime_multiplier / 2.0;
    let amount = (blocks as f64 * block_rate).round() as i64;
    debug!(
        target: "pms.tariff",
        overtime_minutes = overtime_minutes,
        billed_minutes = billed_minutes,
        blocks = blocks,
        amount = amount,
        capped = capped,
        "charge_quoted"
    );
    ChargeQuote {
        billed_minutes,
        blocks,
        amount,
        capped,
    }
}

/// 校验管理端提交的计费配置。
pub fn validate(tariff: &TariffConfig) -> Result<(), TariffError> {
    if tariff.free_minutes <= 0 {
        return Err(TariffError::Invalid(
            "free_minutes must be positive".to_string(),
        ));
    }
    if tariff.hourly_rate < 0 {
        return Err(TariffError::Invalid(
            "hourly_rate must not be negative".to_string(),
        ));
    }
    if !tariff.overtime_multiplier.is_finite() || tariff.overtime_multiplier < 1.0 {
        return Err(TariffError::Invalid(
            "overtime_multiplier must be at least 1".to_string(),
        ));
    }
    Ok(())
}
