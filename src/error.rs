//! 错误类型定义
//!
//! - `MonitorError`: 生命周期、状态存储相关错误
//! - `ChannelError`: 单个通知渠道发送失败（记录日志，不影响其他渠道）
//! - `ConfigurationError`: 配置文件无效或渠道缺少必要能力（启动时报告一次）
//!
//! `FetchFailed` 不是错误类型，而是 [`crate::detector::Outcome`] 的一个取值。

use std::path::PathBuf;
use thiserror::Error;

/// 库内通用 Result
pub type Result<T> = std::result::Result<T, MonitorError>;

/// 监控服务错误
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("monitor already running")]
    AlreadyRunning,

    #[error("monitor stopped")]
    Stopped,

    #[error("state store error at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl MonitorError {
    pub fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Store {
            path: path.into(),
            source,
        }
    }
}

/// 通知渠道发送失败
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint rejected alert with status {status}")]
    Rejected { status: u16 },

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel task failed: {0}")]
    Task(String),
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("channel {channel} unavailable: {reason}")]
    ChannelUnavailable { channel: String, reason: String },
}

impl ConfigurationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn channel_unavailable(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ChannelUnavailable {
            channel: channel.into(),
            reason: reason.into(),
        }
    }
}
