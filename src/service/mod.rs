//! 后台执行注册

pub mod launchd;

pub use launchd::{LaunchdService, ServiceStatus};
