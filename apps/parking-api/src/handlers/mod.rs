//! Handlers 模块

pub mod alerts;
pub mod dashboard;
pub mod health;
pub mod requests;
pub mod spots;
pub mod visitors;

pub use alerts::*;
pub use dashboard::*;
pub use health::*;
pub use requests::*;
pub use spots::*;
pub use visitors::*;
