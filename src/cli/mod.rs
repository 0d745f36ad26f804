//! CLI command handling

pub mod check;
pub mod config_cmd;
pub mod output;
pub mod service;
pub mod status;
pub mod watch;

pub use check::*;
pub use config_cmd::*;
pub use output::*;
pub use service::*;
pub use status::*;
pub use watch::*;

use crate::config::MonitorConfig;
use crate::monitor::StateStore;
use anyhow::Result;
use std::path::Path;

/// 加载配置；未指定路径时使用默认位置
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    let config = match path {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::load(&MonitorConfig::default_path())?,
    };
    Ok(config)
}

/// 按配置决定是否使用持久化状态
pub fn state_store(config: &MonitorConfig) -> Option<StateStore> {
    config
        .persist_state
        .then(|| StateStore::new(StateStore::default_path()))
}
