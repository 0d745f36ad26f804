//! 配置 - `~/.config/ticket-drop-monitor/config.json`
//!
//! 文件不存在时使用默认值；命令行参数覆盖文件中的值。

use crate::error::ConfigurationError;
use crate::monitor::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 默认监控的活动页面
pub const DEFAULT_TARGET_URL: &str =
    "https://in.bookmyshow.com/events/travis-scott-circus-maximus-stadium-tour-india/ET00439284";

/// 页面出现这些关键字即视为有票
pub const DEFAULT_KEYWORDS: [&str; 5] = [
    "buy now",
    "book now",
    "book tickets",
    "buy tickets",
    "get tickets",
];

const MAX_DETECTOR_TIMEOUT_SECS: u64 = 60;

/// 监控配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// 被监控的页面 URL
    pub target_url: String,
    /// 判定有票的关键字（不区分大小写）
    pub keywords: Vec<String>,
    /// 轮询间隔（秒）
    pub poll_interval_seconds: u64,
    /// 失败退避倍数
    pub backoff_multiplier: f64,
    /// 退避上限（秒）
    pub max_backoff_seconds: u64,
    /// 单次检测超时（秒）
    pub detector_timeout_seconds: u64,
    /// 持续有票时重复提醒的冷却时间；不设置则只在状态跳变时提醒
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realert_cooldown_seconds: Option<u64>,
    /// 后台定时检测间隔（launchd StartInterval）
    pub background_interval_seconds: u64,
    /// HTTP 查询接口监听地址
    pub listen_address: String,
    /// 是否持久化最近一次状态
    pub persist_state: bool,
    /// 通知渠道
    pub channels: ChannelsConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            poll_interval_seconds: 5,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 300,
            detector_timeout_seconds: 10,
            realert_cooldown_seconds: None,
            background_interval_seconds: 60,
            listen_address: "127.0.0.1:3000".to_string(),
            persist_state: true,
            channels: ChannelsConfig::default(),
        }
    }
}

/// 通知渠道开关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelsConfig {
    /// 终端横幅（同步 UI 提醒）
    pub terminal: bool,
    /// 提示音
    pub sound: bool,
    /// 系统通知
    pub desktop: bool,
    /// 提示音文件，不设置时使用平台默认音效
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<PathBuf>,
    /// 推送 webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookSettings>,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            terminal: true,
            sound: true,
            desktop: true,
            sound_file: None,
            webhook: None,
        }
    }
}

/// Webhook 推送配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSettings {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl MonitorConfig {
    /// 默认配置目录
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("ticket-drop-monitor")
    }

    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// 从文件加载；文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// 写入默认配置文件
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.poll_interval_seconds == 0 {
            return Err(ConfigurationError::invalid("pollIntervalSeconds must be > 0"));
        }
        if !(self.backoff_multiplier >= 1.0) {
            return Err(ConfigurationError::invalid("backoffMultiplier must be >= 1.0"));
        }
        if self.max_backoff_seconds < self.poll_interval_seconds {
            return Err(ConfigurationError::invalid(
                "maxBackoffSeconds must be >= pollIntervalSeconds",
            ));
        }
        if self.detector_timeout_seconds == 0
            || self.detector_timeout_seconds > MAX_DETECTOR_TIMEOUT_SECS
        {
            return Err(ConfigurationError::invalid(format!(
                "detectorTimeoutSeconds must be within 1..={}",
                MAX_DETECTOR_TIMEOUT_SECS
            )));
        }
        if self.background_interval_seconds == 0 {
            return Err(ConfigurationError::invalid(
                "backgroundIntervalSeconds must be > 0",
            ));
        }
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigurationError::invalid("keywords must not be empty"));
        }
        reqwest::Url::parse(&self.target_url).map_err(|e| {
            ConfigurationError::invalid(format!("targetUrl {}: {}", self.target_url, e))
        })?;
        if let Some(webhook) = &self.channels.webhook {
            if webhook.enabled && webhook.url.trim().is_empty() {
                return Err(ConfigurationError::invalid("webhook url must not be empty"));
            }
        }
        Ok(())
    }

    /// 由配置推导退避策略
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_secs(self.poll_interval_seconds),
            Duration::from_secs(self.max_backoff_seconds),
            self.backoff_multiplier,
        )
    }

    pub fn detector_timeout(&self) -> Duration {
        Duration::from_secs(self.detector_timeout_seconds)
    }

    pub fn realert_cooldown(&self) -> Option<Duration> {
        self.realert_cooldown_seconds.map(Duration::from_secs)
    }
}
