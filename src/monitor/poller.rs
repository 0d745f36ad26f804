//! 轮询器 - 按节奏调用检测器，失败时指数退避
//!
//! 每个周期：sleep(当前间隔) → 检测 → 交给 `ObservationSink` → 按失败次数重算间隔。
//! `check_now` 在周期之外立即检测一次，走同一条状态路径，然后重置周期计时器。

use super::backoff::BackoffPolicy;
use super::lock_unpoisoned;
use super::state::{MonitorState, Observation};
use crate::detector::{Detector, Outcome};
use crate::error::{MonitorError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 观测结果的接收方（状态跟踪路径）
pub trait ObservationSink: Send + Sync {
    /// 应用一次观测，返回应用后的状态（可能阻塞，在阻塞线程池中调用）
    fn on_observation(&self, observation: Observation) -> MonitorState;

    /// 最近一次应用后的状态
    fn snapshot(&self) -> MonitorState;
}

/// 轮询配置
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// 检测目标
    pub target: String,
    /// 退避策略（base 即正常轮询间隔）
    pub backoff: BackoffPolicy,
    /// 单次检测超时
    pub detector_timeout: Duration,
}

struct Shared {
    config: PollerConfig,
    detector: Arc<dyn Detector>,
    sink: Arc<dyn ObservationSink>,
    reset: Notify,
    cancel: CancellationToken,
}

impl Shared {
    /// 由最近一次应用的状态决定，与 apply 的顺序一致
    fn current_interval(&self) -> Duration {
        self.config
            .backoff
            .interval_for(self.sink.snapshot().consecutive_failures)
    }

    /// 调用检测器；超时或 panic 都视为 FetchFailed
    async fn observe(&self) -> Observation {
        let detector = Arc::clone(&self.detector);
        let target = self.config.target.clone();
        let mut task = tokio::spawn(async move { detector.check(&target).await });

        let outcome = match tokio::time::timeout(self.config.detector_timeout, &mut task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(error = %e, "Detector task failed");
                Outcome::FetchFailed
            }
            Err(_) => {
                task.abort();
                warn!(
                    timeout_secs = self.config.detector_timeout.as_secs_f64(),
                    "Detector timed out"
                );
                Outcome::FetchFailed
            }
        };

        Observation::new(outcome)
    }

    /// 检测一次并应用
    async fn run_check(&self) -> MonitorState {
        let observation = self.observe().await;
        debug!(outcome = %observation.outcome, "Observation");

        // 状态文件锁可能被后台检测进程持有
        let sink = Arc::clone(&self.sink);
        let state = match tokio::task::spawn_blocking(move || sink.on_observation(observation)).await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Failed to apply observation");
                self.sink.snapshot()
            }
        };

        if state.consecutive_failures > 0 {
            warn!(
                consecutive_failures = state.consecutive_failures,
                next_interval_secs = self
                    .config
                    .backoff
                    .interval_for(state.consecutive_failures)
                    .as_secs_f64(),
                "Check failed, backing off"
            );
        }
        state
    }

    async fn run(self: Arc<Self>) {
        info!(
            url = %self.config.target,
            interval_secs = self.current_interval().as_secs_f64(),
            "Poller starting"
        );

        loop {
            let wait = self.current_interval();
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.reset.notified() => {
                    debug!("Cycle timer reset by manual check");
                    continue;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            if self.cancel.is_cancelled() {
                break;
            }
            self.run_check().await;
        }

        info!("Poller stopped");
    }
}

/// 轮询器
pub struct Poller {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(
        config: PollerConfig,
        detector: Arc<dyn Detector>,
        sink: Arc<dyn ObservationSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                detector,
                sink,
                reset: Notify::new(),
                cancel: CancellationToken::new(),
            }),
            handle: Mutex::new(None),
        }
    }

    /// 启动周期轮询（需要在 tokio runtime 中调用）
    pub fn start(&self) -> Result<()> {
        if self.shared.cancel.is_cancelled() {
            return Err(MonitorError::Stopped);
        }
        let mut handle = lock_unpoisoned(&self.handle);
        if handle.is_some() {
            return Err(MonitorError::AlreadyRunning);
        }
        *handle = Some(tokio::spawn(Arc::clone(&self.shared).run()));
        Ok(())
    }

    /// 立即检测一次，并重置周期计时器
    pub async fn check_now(&self) -> Result<MonitorState> {
        if self.shared.cancel.is_cancelled() {
            return Err(MonitorError::Stopped);
        }
        let state = self.shared.run_check().await;
        self.shared.reset.notify_one();
        Ok(state)
    }

    /// 停止轮询；返回后不会再调用检测器（进行中的检测允许完成）
    pub async fn stop(&self) {
        self.shared.cancel.cancel();
        let handle = lock_unpoisoned(&self.handle).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Poller task ended abnormally");
            }
        }
    }

    /// 当前周期间隔（含退避）
    pub fn current_interval(&self) -> Duration {
        self.shared.current_interval()
    }

    pub fn is_running(&self) -> bool {
        !self.shared.cancel.is_cancelled() && lock_unpoisoned(&self.handle).is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}
