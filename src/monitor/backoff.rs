//! 失败退避 - 由连续失败次数推导下一次轮询间隔

use std::time::Duration;

/// 退避策略（不持久化，每次由 `consecutive_failures` 重新计算）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub base_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
}

impl BackoffPolicy {
    pub fn new(base_interval: Duration, max_interval: Duration, multiplier: f64) -> Self {
        Self {
            base_interval,
            max_interval: max_interval.max(base_interval),
            multiplier: if multiplier.is_finite() { multiplier.max(1.0) } else { 1.0 },
        }
    }

    /// `min(base * multiplier^failures, max)`；无失败时即 `base`
    pub fn interval_for(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.base_interval;
        }

        let exponent = consecutive_failures.min(i32::MAX as u32) as i32;
        let factor = self.multiplier.powi(exponent);
        let secs = self.base_interval.as_secs_f64() * factor;

        if !secs.is_finite() || secs >= self.max_interval.as_secs_f64() {
            self.max_interval
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(300), 2.0)
    }
}
