//! 基础设施：日志初始化

pub mod logging;

pub use logging::{init_default_logging, init_logging};
