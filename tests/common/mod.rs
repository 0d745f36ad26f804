#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use ticket_drop_monitor::error::ChannelError;
use ticket_drop_monitor::{
    AlertChannel, AlertMessage, Detector, MonitorConfig, MonitorService, NotificationDispatcher,
    Outcome, Sent, StateStore,
};

/// 按脚本依次返回结果，用完后返回 Unavailable
pub struct ScriptedDetector {
    script: Mutex<VecDeque<Outcome>>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(script: &[Outcome]) -> Self {
        Self {
            script: Mutex::new(script.iter().copied().collect()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// 每次检测耗时 delay，用于构造并发
    pub fn always(outcome: Outcome, delay: Duration) -> Self {
        Self {
            script: Mutex::new(std::iter::repeat(outcome).take(1000).collect()),
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn check(&self, _target: &str) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Unavailable)
    }
}

/// 记录收到的提醒
#[derive(Default)]
pub struct RecordingChannel {
    pub messages: Mutex<Vec<AlertMessage>>,
}

impl RecordingChannel {
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &AlertMessage) -> Result<Sent, ChannelError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(Sent::Delivered)
    }
}

/// 总是失败的渠道
pub struct BrokenChannel;

#[async_trait]
impl AlertChannel for BrokenChannel {
    fn name(&self) -> &str {
        "broken"
    }

    async fn send(&self, _message: &AlertMessage) -> Result<Sent, ChannelError> {
        Err(ChannelError::Rejected { status: 500 })
    }
}

/// 发送需要一小时的渠道
pub struct StalledChannel;

#[async_trait]
impl AlertChannel for StalledChannel {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn send(&self, _message: &AlertMessage) -> Result<Sent, ChannelError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Sent::Delivered)
    }
}

/// 不持久化状态的服务
pub fn build_service(
    detector: Arc<ScriptedDetector>,
    channels: Vec<Arc<dyn AlertChannel>>,
) -> MonitorService {
    let config = MonitorConfig::default();
    let mut dispatcher = NotificationDispatcher::new(config.target_url.clone());
    for channel in channels {
        dispatcher.register_channel(channel);
    }
    MonitorService::new(&config, detector, dispatcher, None)
}

/// 使用指定状态文件的服务
pub fn build_service_with_store(detector: Arc<ScriptedDetector>, path: &Path) -> MonitorService {
    let config = MonitorConfig::default();
    let dispatcher = NotificationDispatcher::new(config.target_url.clone());
    MonitorService::new(&config, detector, dispatcher, Some(StateStore::new(path)))
}
