//! 值班告警：由状态迁移生成告警，并在看板上维护已读 / 忽略。

pub mod board;
pub mod emitter;

pub use board::{AlertBoard, AlertFilter};
pub use emitter::{AlertEmitter, OvertimeEpisodes};

/// 告警看板错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlertError {
    #[error("alert not found: {0}")]
    NotFound(String),
    #[error("lock failed")]
    Lock,
}
