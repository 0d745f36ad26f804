//! 通知系统构建器 - 按配置开关探测并注册渠道
//!
//! 探测失败的渠道以 `ConfigurationError` 报告一次，其余渠道照常工作（降级模式）。

use super::channels::{DesktopChannel, SoundChannel, TerminalChannel, WebhookChannel, WebhookConfig};
use super::dispatcher::NotificationDispatcher;
use crate::config::ChannelsConfig;
use crate::error::ConfigurationError;
use std::sync::Arc;
use tracing::warn;

/// 构建结果
pub struct BuiltNotifier {
    pub dispatcher: NotificationDispatcher,
    /// 未能启用的渠道
    pub issues: Vec<ConfigurationError>,
}

/// 通知系统构建器
pub struct NotificationBuilder {
    target: String,
    channels: ChannelsConfig,
    dry_run: bool,
}

impl NotificationBuilder {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            channels: ChannelsConfig::default(),
            dry_run: false,
        }
    }

    /// 设置渠道开关
    pub fn channels(mut self, channels: ChannelsConfig) -> Self {
        self.channels = channels;
        self
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 构建 NotificationDispatcher
    pub fn build(self) -> BuiltNotifier {
        let mut dispatcher = NotificationDispatcher::new(self.target).with_dry_run(self.dry_run);
        let mut issues = Vec::new();

        if self.channels.terminal {
            dispatcher.register_channel(Arc::new(TerminalChannel::stdout()));
        }

        if self.channels.sound {
            match SoundChannel::detect(self.channels.sound_file.as_deref()) {
                Ok(channel) => dispatcher.register_channel(Arc::new(channel)),
                Err(e) => issues.push(e),
            }
        }

        if self.channels.desktop {
            match DesktopChannel::detect() {
                Ok(channel) => dispatcher.register_channel(Arc::new(channel)),
                Err(e) => issues.push(e),
            }
        }

        if let Some(settings) = self.channels.webhook.as_ref().filter(|w| w.enabled) {
            match WebhookChannel::new(WebhookConfig::from(settings)) {
                Ok(channel) => dispatcher.register_channel(Arc::new(channel)),
                Err(e) => issues.push(e),
            }
        }

        for issue in &issues {
            warn!(error = %issue, "Alert channel disabled");
        }
        if dispatcher.channel_count() == 0 {
            warn!("No alert channels enabled, availability changes will only be logged");
        }

        BuiltNotifier { dispatcher, issues }
    }
}
