//! 监控服务 - 组合 Detector → Poller → StateTracker → Notifier，并管理生命周期
//!
//! 所有观测（周期、手动、后台）都经过 [`AlertPipeline`]：在互斥锁内 apply，
//! 检测器调用不持锁；提醒在后台任务中分发，不阻塞轮询。

use super::lock_unpoisoned;
use super::poller::{ObservationSink, Poller, PollerConfig};
use super::state::{AlertEvent, MonitorState, Observation, StateTracker};
use super::store::{StateLock, StateStore};
use crate::config::MonitorConfig;
use crate::detector::{Detector, KeywordDetector};
use crate::error::{ConfigurationError, Result};
use crate::notification::{NotificationBuilder, NotificationDispatcher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

/// 停止时等待进行中通知的上限
const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

/// 状态跟踪路径（单写者）
pub struct AlertPipeline {
    tracker: Mutex<StateTracker>,
    store: Option<StateStore>,
    dispatcher: Arc<NotificationDispatcher>,
    notifications: TaskTracker,
    alerts_raised: AtomicU64,
}

impl AlertPipeline {
    pub fn new(
        tracker: StateTracker,
        dispatcher: NotificationDispatcher,
        store: Option<StateStore>,
    ) -> Self {
        Self {
            tracker: Mutex::new(tracker),
            store,
            dispatcher: Arc::new(dispatcher),
            notifications: TaskTracker::new(),
            alerts_raised: AtomicU64::new(0),
        }
    }

    /// 对外查询的状态；其他进程（后台检测）写入了更新的状态时以文件为准
    pub fn current_state(&self) -> MonitorState {
        let memory = lock_unpoisoned(&self.tracker).state().clone();
        match self.store.as_ref().and_then(StateStore::peek) {
            Some(persisted) if persisted.last_checked_at > memory.last_checked_at => persisted,
            _ => memory,
        }
    }

    /// 已产生的提醒数量
    pub fn alerts_raised(&self) -> u64 {
        self.alerts_raised.load(Ordering::SeqCst)
    }

    /// 获取状态文件锁；失败时只在内存中 apply
    fn lock_store(&self) -> Option<StateLock> {
        let store = self.store.as_ref()?;
        match store.lock() {
            Ok(lock) => Some(lock),
            Err(e) => {
                warn!(error = %e, "State store unavailable, applying in memory only");
                None
            }
        }
    }

    /// 同步持久化状态后 apply，再写回
    fn apply_persisted(
        tracker: &mut StateTracker,
        mut lock: StateLock,
        observation: &Observation,
    ) -> (MonitorState, Option<AlertEvent>) {
        match lock.read() {
            Ok(Some(persisted)) => tracker.restore(persisted),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read persisted state"),
        }

        let result = tracker.apply(observation);
        if let Err(e) = lock.write(&result.0) {
            warn!(error = %e, "Failed to persist state");
        }
        result
    }

    /// 后台分发提醒
    fn notify(&self, event: AlertEvent) {
        let dispatcher = Arc::clone(&self.dispatcher);
        self.notifications.spawn(async move {
            let report = dispatcher.dispatch(&event).await;
            let failed = report.failed_channels();
            if failed.is_empty() {
                info!(
                    reason = %event.reason,
                    delivered = report.delivered(),
                    "Alert dispatched"
                );
            } else {
                warn!(
                    reason = %event.reason,
                    delivered = report.delivered(),
                    failed = ?failed,
                    "Alert dispatched with channel failures"
                );
            }
        });
    }

    /// 等待进行中的通知完成
    async fn drain(&self, timeout: Duration) {
        self.notifications.close();
        if tokio::time::timeout(timeout, self.notifications.wait()).await.is_err() {
            warn!(
                pending = self.notifications.len(),
                "Timed out waiting for alert delivery"
            );
        }
        self.notifications.reopen();
    }
}

impl ObservationSink for AlertPipeline {
    fn on_observation(&self, observation: Observation) -> MonitorState {
        // 先拿文件锁再拿内存锁，等待其他进程时不占用 tracker
        let file_lock = self.lock_store();
        let (state, alert) = {
            let mut tracker = lock_unpoisoned(&self.tracker);
            match file_lock {
                Some(lock) => Self::apply_persisted(&mut tracker, lock, &observation),
                None => tracker.apply(&observation),
            }
        };

        if let Some(event) = alert {
            self.alerts_raised.fetch_add(1, Ordering::SeqCst);
            self.notify(event);
        }
        state
    }

    fn snapshot(&self) -> MonitorState {
        lock_unpoisoned(&self.tracker).state().clone()
    }
}

/// 监控服务
pub struct MonitorService {
    pipeline: Arc<AlertPipeline>,
    poller: Poller,
    target: String,
    issues: Vec<ConfigurationError>,
}

impl MonitorService {
    /// 用已构建的组件组装服务；有 store 时从持久化状态恢复
    pub fn new(
        config: &MonitorConfig,
        detector: Arc<dyn Detector>,
        dispatcher: NotificationDispatcher,
        store: Option<StateStore>,
    ) -> Self {
        let initial = match store.as_ref().map(|s| s.load()) {
            Some(Ok(Some(state))) => {
                info!(
                    last_confirmed = ?state.last_confirmed,
                    consecutive_failures = state.consecutive_failures,
                    "Restored persisted state"
                );
                state
            }
            Some(Err(e)) => {
                warn!(error = %e, "Failed to load persisted state, starting fresh");
                MonitorState::default()
            }
            _ => MonitorState::default(),
        };

        let tracker = StateTracker::with_state(initial).with_realert_cooldown(config.realert_cooldown());
        let pipeline = Arc::new(AlertPipeline::new(tracker, dispatcher, store));
        let poller = Poller::new(
            PollerConfig {
                target: config.target_url.clone(),
                backoff: config.backoff_policy(),
                detector_timeout: config.detector_timeout(),
            },
            detector,
            Arc::clone(&pipeline) as Arc<dyn ObservationSink>,
        );

        Self {
            pipeline,
            poller,
            target: config.target_url.clone(),
            issues: Vec::new(),
        }
    }

    /// 按配置创建关键字检测器和通知渠道
    pub fn from_config(config: &MonitorConfig, dry_run: bool, store: Option<StateStore>) -> Result<Self> {
        config.validate()?;

        let detector = KeywordDetector::new(&config.keywords, config.detector_timeout())?;
        let built = NotificationBuilder::new(&config.target_url)
            .channels(config.channels.clone())
            .dry_run(dry_run)
            .build();

        let mut service = Self::new(config, Arc::new(detector), built.dispatcher, store);
        service.issues = built.issues;
        Ok(service)
    }

    /// 启动周期轮询
    pub fn start(&self) -> Result<()> {
        self.poller.start()?;
        info!(
            url = %self.target,
            interval_secs = self.poller.current_interval().as_secs_f64(),
            degraded_channels = self.issues.len(),
            "Monitor started"
        );
        Ok(())
    }

    /// 停止轮询并等待进行中的提醒送达
    pub async fn stop(&self) {
        self.poller.stop().await;
        self.pipeline.drain(NOTIFICATION_DRAIN_TIMEOUT).await;
        info!(alerts_raised = self.pipeline.alerts_raised(), "Monitor stopped");
    }

    /// 当前状态快照（只读）
    pub fn current_state(&self) -> MonitorState {
        self.pipeline.current_state()
    }

    /// 手动立即检测
    pub async fn check_now(&self) -> Result<MonitorState> {
        self.poller.check_now().await
    }

    /// 等待已触发的提醒送达（一次性检测退出前调用）
    pub async fn flush_alerts(&self) {
        self.pipeline.drain(NOTIFICATION_DRAIN_TIMEOUT).await;
    }

    pub fn alerts_raised(&self) -> u64 {
        self.pipeline.alerts_raised()
    }

    pub fn current_interval(&self) -> Duration {
        self.poller.current_interval()
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// 启动时未能启用的渠道
    pub fn configuration_issues(&self) -> &[ConfigurationError] {
        &self.issues
    }
}
