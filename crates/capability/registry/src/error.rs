//! 车位登记表错误类型

use domain::SpotStatus;

/// 车位登记表错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("spot {code} unavailable: currently {status}")]
    SpotUnavailable { code: String, status: SpotStatus },
    #[error("spot {code} not bound to visitor {visitor_id}")]
    SpotNotBound { code: String, visitor_id: String },
    #[error("unknown spot: {0}")]
    UnknownSpot(String),
    #[error("invalid spot: {0}")]
    Invalid(String),
    #[error("lock failed")]
    Lock,
}
