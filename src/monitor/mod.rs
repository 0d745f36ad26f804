//! 可用性监控核心 - 轮询 → 状态跟踪 → 提醒分发

pub mod backoff;
pub mod poller;
pub mod service;
pub mod state;
pub mod store;

use std::sync::{Mutex, MutexGuard};

pub use backoff::BackoffPolicy;
pub use poller::{ObservationSink, Poller, PollerConfig};
pub use service::{AlertPipeline, MonitorService};
pub use state::{AlertEvent, AlertReason, Availability, MonitorState, Observation, StateTracker};
pub use store::{StateLock, StateStore};

/// 获取锁；持锁线程 panic 后仍使用其中的数据
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
