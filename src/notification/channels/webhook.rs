//! Webhook 推送渠道
//!
//! 以 JSON POST 提醒消息，可选 Bearer token（ntfy、自建推送网关等）

use crate::config::WebhookSettings;
use crate::error::{ChannelError, ConfigurationError};
use crate::notification::channel::{AlertChannel, AlertMessage, Sent};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Webhook 渠道配置
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// 推送地址
    pub url: String,
    /// Bearer token（可选）
    pub token: Option<String>,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: None,
            timeout_secs: 10,
        }
    }
}

impl From<&WebhookSettings> for WebhookConfig {
    fn from(settings: &WebhookSettings) -> Self {
        Self {
            url: settings.url.clone(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
            ..Default::default()
        }
    }
}

/// Webhook 渠道
#[derive(Debug)]
pub struct WebhookChannel {
    client: Client,
    config: WebhookConfig,
}

impl WebhookChannel {
    pub fn new(config: WebhookConfig) -> Result<Self, ConfigurationError> {
        if config.url.trim().is_empty() {
            return Err(ConfigurationError::channel_unavailable("webhook", "url is required"));
        }
        reqwest::Url::parse(&config.url).map_err(|e| {
            ConfigurationError::channel_unavailable("webhook", format!("invalid url: {}", e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ConfigurationError::channel_unavailable("webhook", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, message: &AlertMessage) -> Result<Sent, ChannelError> {
        let mut request = self.client.post(&self.config.url).json(message);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(url = %self.config.url, status = %status, "Webhook accepted alert");
        Ok(Sent::Delivered)
    }
}
