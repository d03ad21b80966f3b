//! 应用运行配置加载。

use domain::{BuildingContext, TariffConfig};
use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub building_id: String,
    pub building_name: String,
    pub visitor_spots: u32,
    pub spot_prefix: String,
    pub free_minutes: i64,
    pub hourly_rate: i64,
    pub overtime_multiplier: f64,
    pub max_overtime_hours: u32,
    pub clock_enabled: bool,
    pub tick_interval_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let building_id = env::var("PMS_BUILDING_ID")
            .map_err(|_| ConfigError::Missing("PMS_BUILDING_ID".to_string()))?;
        let building_name =
            read_optional("PMS_BUILDING_NAME").unwrap_or_else(|| building_id.clone());
        let http_addr = env::var("PMS_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let visitor_spots = read_u32_with_default("PMS_VISITOR_SPOTS", 20)?;
        let spot_prefix = env::var("PMS_SPOT_PREFIX").unwrap_or_else(|_| "V".to_string());
        let free_minutes = read_i64_with_default("PMS_FREE_MINUTES", 120)?;
        if free_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "PMS_FREE_MINUTES".to_string(),
                free_minutes.to_string(),
            ));
        }
        let hourly_rate = read_i64_with_default("PMS_HOURLY_RATE", 2000)?;
        let overtime_multiplier = read_f64_with_default("PMS_OVERTIME_MULTIPLIER", 2.0)?;
        let max_overtime_hours = read_u32_with_default("PMS_MAX_OVERTIME_HOURS", 4)?;
        let clock_enabled = read_bool_with_default("PMS_CLOCK_ENABLED", true);
        let tick_interval_seconds = read_u64_with_default("PMS_TICK_INTERVAL_SECONDS", 60)?;
        if tick_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "PMS_TICK_INTERVAL_SECONDS".to_string(),
                "0".to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            building_id,
            building_name,
            visitor_spots,
            spot_prefix,
            free_minutes,
            hourly_rate,
            overtime_multiplier,
            max_overtime_hours,
            clock_enabled,
            tick_interval_seconds,
        })
    }

    /// 楼宇上下文。
    pub fn building(&self) -> BuildingContext {
        BuildingContext::new(self.building_id.clone(), self.building_name.clone())
    }

    /// 楼宇计费配置。
    pub fn tariff(&self) -> TariffConfig {
        TariffConfig {
            free_minutes: self.free_minutes,
            hourly_rate: self.hourly_rate,
            overtime_multiplier: self.overtime_multiplier,
            max_overtime_hours: self.max_overtime_hours,
        }
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_i64_with_default(key: &str, default: i64) -> Result<i64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<i64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_f64_with_default(key: &str, default: f64) -> Result<f64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
