/// 楼宇停车计费配置。
///
/// 管理端可在两次计费之间修改；单次计费过程中按值传入，不可变。
#[derive(Debug, Clone, PartialEq)]
pub struct TariffConfig {
    pub free_minutes: i64,
    /// 每小时费率（整数货币单位）。
    pub hourly_rate: i64,
    pub overtime_multiplier: f64,
    pub max_overtime_hours: u32,
}

impl TariffConfig {
    /// 超时计费上限（分钟）。
    pub fn max_overtime_minutes(&self) -> i64 {
        i64::from(self.max_overtime_hours) * 60
    }
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            free_minutes: 120,
            hourly_rate: 2000,
            overtime_multiplier: 2.0,
            max_overtime_hours: 4,
        }
    }
}
