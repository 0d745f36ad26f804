//! 提醒渠道 trait 定义

use crate::error::ChannelError;
use crate::monitor::{AlertEvent, AlertReason};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 提醒消息（由 `AlertEvent` 渲染，所有渠道共用）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMessage {
    /// 标题
    pub title: String,
    /// 正文
    pub body: String,
    /// 提醒原因
    pub reason: AlertReason,
    /// 触发时间
    pub triggered_at: DateTime<Utc>,
    /// 被监控的页面
    pub target: String,
}

impl AlertMessage {
    /// 根据提醒事件生成消息
    pub fn from_event(event: &AlertEvent, target: impl Into<String>) -> Self {
        let body = match event.reason {
            AlertReason::BecameAvailable => "Hurry! Book now before they’re gone!",
            AlertReason::StillAvailable => "Tickets are still on sale. Go book now!",
        };
        Self {
            title: "🚨 Tickets Available!".to_string(),
            body: body.to_string(),
            reason: event.reason,
            triggered_at: event.triggered_at,
            target: target.into(),
        }
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    /// 已送达
    Delivered,
    /// 跳过（dry-run 等）
    Skipped(String),
}

/// 提醒渠道 trait
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// 渠道名称（用于日志和配置）
    fn name(&self) -> &str;

    /// 发送提醒；失败只影响本渠道
    async fn send(&self, message: &AlertMessage) -> Result<Sent, ChannelError>;
}
