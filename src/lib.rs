//! Ticket Drop Monitor - 轮询售票页面，门票从无到有时立即提醒

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod monitor;
pub mod notification;
pub mod server;
pub mod service;

pub use config::{ChannelsConfig, MonitorConfig, WebhookSettings};
pub use detector::{Detector, KeywordDetector, Outcome};
pub use error::{ChannelError, ConfigurationError, MonitorError, Result};
pub use monitor::{
    AlertEvent, AlertReason, Availability, BackoffPolicy, MonitorService, MonitorState,
    Observation, Poller, PollerConfig, StateStore, StateTracker,
};
pub use notification::{AlertChannel, AlertMessage, NotificationBuilder, NotificationDispatcher, Sent};
pub use service::LaunchdService;
