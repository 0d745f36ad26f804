//! 通知分发器 - 把一次提醒扇出到所有渠道
//!
//! 每个渠道在独立任务中发送，一个渠道失败（或 panic）不影响其他渠道。
//! 分发器本身不重试。

use super::channel::{AlertChannel, AlertMessage, Sent};
use crate::error::ChannelError;
use crate::monitor::AlertEvent;
use std::sync::Arc;
use tracing::{info, warn};

/// 单个渠道的发送结果
pub type ChannelOutcome = (String, Result<Sent, ChannelError>);

/// 一次分发的汇总
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub results: Vec<ChannelOutcome>,
}

impl DispatchReport {
    /// 成功送达的渠道数
    pub fn delivered(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(Sent::Delivered)))
            .count()
    }

    /// 失败的渠道名称
    pub fn failed_channels(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// 通知分发器
pub struct NotificationDispatcher {
    /// 所有注册的渠道
    channels: Vec<Arc<dyn AlertChannel>>,
    /// 被监控的页面（写进消息）
    target: String,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl NotificationDispatcher {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            channels: Vec::new(),
            target: target.into(),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册渠道
    pub fn register_channel(&mut self, channel: Arc<dyn AlertChannel>) {
        info!(channel = channel.name(), "Registering alert channel");
        self.channels.push(channel);
    }

    /// 发送到所有渠道并等待结果
    pub async fn dispatch(&self, event: &AlertEvent) -> DispatchReport {
        let message = Arc::new(AlertMessage::from_event(event, &self.target));
        let mut pending = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let name = channel.name().to_string();
            if self.dry_run {
                info!(channel = %name, "[DRY-RUN] Would send alert");
                pending.push((name, None));
                continue;
            }

            let channel = Arc::clone(channel);
            let message = Arc::clone(&message);
            let handle = tokio::spawn(async move { channel.send(&message).await });
            pending.push((name, Some(handle)));
        }

        let mut report = DispatchReport::default();
        for (name, handle) in pending {
            let result = match handle {
                None => Ok(Sent::Skipped("dry-run".to_string())),
                Some(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(ChannelError::Task(e.to_string())),
                },
            };

            match &result {
                Ok(Sent::Delivered) => info!(channel = %name, "Alert delivered"),
                Ok(Sent::Skipped(reason)) => info!(channel = %name, reason = %reason, "Alert skipped"),
                Err(e) => warn!(channel = %name, error = %e, "Alert channel failed"),
            }
            report.results.push((name, result));
        }

        report
    }

    /// 获取已注册的渠道数量
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 获取已注册的渠道名称
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::AlertReason;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 测试用的 mock 渠道
    struct MockChannel {
        name: String,
        fail: bool,
        send_count: AtomicUsize,
    }

    impl MockChannel {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                fail: false,
                send_count: AtomicUsize::new(0),
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                fail: true,
                ..Self::new(name)
            }
        }

        fn get_send_count(&self) -> usize {
            self.send_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AlertChannel for MockChannel {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send(&self, _message: &AlertMessage) -> Result<Sent, ChannelError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ChannelError::Rejected { status: 500 })
            } else {
                Ok(Sent::Delivered)
            }
        }
    }

    struct PanickingChannel;

    #[async_trait]
    impl AlertChannel for PanickingChannel {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn send(&self, _message: &AlertMessage) -> Result<Sent, ChannelError> {
            panic!("channel blew up");
        }
    }

    fn event() -> AlertEvent {
        AlertEvent {
            triggered_at: Utc::now(),
            reason: AlertReason::BecameAvailable,
        }
    }

    #[test]
    fn test_dispatcher_register_channel() {
        let mut dispatcher = NotificationDispatcher::new("https://example.com");
        assert_eq!(dispatcher.channel_count(), 0);

        dispatcher.register_channel(Arc::new(MockChannel::new("test")));
        assert_eq!(dispatcher.channel_count(), 1);
        assert_eq!(dispatcher.channel_names(), vec!["test"]);
    }

    #[tokio::test]
    async fn test_dispatch_reaches_all_channels() {
        let mut dispatcher = NotificationDispatcher::new("https://example.com");
        let a = Arc::new(MockChannel::new("a"));
        let b = Arc::new(MockChannel::new("b"));
        dispatcher.register_channel(a.clone());
        dispatcher.register_channel(b.clone());

        let report = dispatcher.dispatch(&event()).await;

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].0, "a");
        assert_eq!(report.results[1].0, "b");
        assert_eq!(report.delivered(), 2);
        assert_eq!(a.get_send_count(), 1);
        assert_eq!(b.get_send_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_others() {
        let mut dispatcher = NotificationDispatcher::new("https://example.com");
        let bad = Arc::new(MockChannel::failing("bad"));
        let good = Arc::new(MockChannel::new("good"));
        dispatcher.register_channel(bad.clone());
        dispatcher.register_channel(Arc::new(PanickingChannel));
        dispatcher.register_channel(good.clone());

        let report = dispatcher.dispatch(&event()).await;

        assert_eq!(bad.get_send_count(), 1);
        assert_eq!(good.get_send_count(), 1);
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failed_channels(), vec!["bad", "panicking"]);
    }

    #[tokio::test]
    async fn test_dispatcher_dry_run() {
        let mut dispatcher = NotificationDispatcher::new("https://example.com").with_dry_run(true);
        let channel = Arc::new(MockChannel::new("test"));
        dispatcher.register_channel(channel.clone());

        let report = dispatcher.dispatch(&event()).await;

        assert!(matches!(&report.results[0].1, Ok(Sent::Skipped(r)) if r == "dry-run"));
        assert_eq!(channel.get_send_count(), 0); // 不应该实际发送
    }
}
