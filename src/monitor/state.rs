//! 状态跟踪 - 边沿触发的可用性状态机
//!
//! 只有 Unavailable（或初始）→ Available 的跳变才产生 `AlertEvent`；
//! 持续 Available 不重复提醒，`FetchFailed` 只累加失败计数。

use crate::detector::Outcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// 一次轮询的观测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub outcome: Outcome,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(outcome: Outcome) -> Self {
        Self::at(outcome, Utc::now())
    }

    pub fn at(outcome: Outcome, observed_at: DateTime<Utc>) -> Self {
        Self {
            outcome,
            observed_at,
        }
    }
}

/// 最近一次确认的可用性（不含失败）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    #[default]
    Unavailable,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// 监控状态快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    pub last_confirmed: Availability,
    pub consecutive_failures: u32,
    pub last_checked_at: Option<DateTime<Utc>>,
    /// 最近一次检测结果（含失败）
    #[serde(default)]
    pub last_outcome: Option<Outcome>,
    /// 最近一次提醒时间（用于冷却重提醒）
    #[serde(default)]
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// 提醒原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertReason {
    /// Unavailable → Available
    BecameAvailable,
    /// 持续有票且超过冷却时间（需显式开启）
    StillAvailable,
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertReason::BecameAvailable => write!(f, "became-available"),
            AlertReason::StillAvailable => write!(f, "still-available"),
        }
    }
}

/// 提醒事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub triggered_at: DateTime<Utc>,
    pub reason: AlertReason,
}

/// 状态跟踪器，`MonitorState` 的唯一写入者
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    state: MonitorState,
    realert_cooldown: Option<Duration>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有状态恢复
    pub fn with_state(state: MonitorState) -> Self {
        Self {
            state,
            realert_cooldown: None,
        }
    }

    /// 持续有票时按冷却时间重复提醒
    pub fn with_realert_cooldown(mut self, cooldown: Option<Duration>) -> Self {
        self.realert_cooldown = cooldown;
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// 用外部（持久化）状态替换当前状态
    pub fn restore(&mut self, state: MonitorState) {
        self.state = state;
    }

    /// 应用一次观测，返回新状态和可能产生的提醒
    pub fn apply(&mut self, observation: &Observation) -> (MonitorState, Option<AlertEvent>) {
        let at = observation.observed_at;
        self.state.last_checked_at = Some(at);
        self.state.last_outcome = Some(observation.outcome);

        let alert = match observation.outcome {
            Outcome::FetchFailed => {
                self.state.consecutive_failures = self.state.consecutive_failures.saturating_add(1);
                debug!(
                    consecutive_failures = self.state.consecutive_failures,
                    "Fetch failed, keeping last confirmed state"
                );
                None
            }
            Outcome::Unavailable => {
                self.state.consecutive_failures = 0;
                if self.state.last_confirmed.is_available() {
                    info!("Tickets no longer available");
                }
                self.state.last_confirmed = Availability::Unavailable;
                None
            }
            Outcome::Available => {
                self.state.consecutive_failures = 0;
                let reason = match self.state.last_confirmed {
                    Availability::Unavailable => Some(AlertReason::BecameAvailable),
                    Availability::Available if self.cooldown_elapsed(at) => {
                        Some(AlertReason::StillAvailable)
                    }
                    Availability::Available => None,
                };
                self.state.last_confirmed = Availability::Available;

                reason.map(|reason| {
                    self.state.last_alert_at = Some(at);
                    info!(reason = %reason, "Availability alert raised");
                    AlertEvent {
                        triggered_at: at,
                        reason,
                    }
                })
            }
        };

        (self.state.clone(), alert)
    }

    fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        let (Some(cooldown), Some(last)) = (self.realert_cooldown, self.state.last_alert_at) else {
            return false;
        };
        match chrono::Duration::from_std(cooldown) {
            Ok(cooldown) => now - last >= cooldown,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let tracker = StateTracker::new();
        assert_eq!(tracker.state().last_confirmed, Availability::Unavailable);
        assert_eq!(tracker.state().consecutive_failures, 0);
        assert_eq!(tracker.state().last_checked_at, None);
    }

    #[test]
    fn test_fetch_failed_keeps_last_confirmed() {
        let mut tracker = StateTracker::new();
        tracker.apply(&Observation::at(Outcome::Available, at(0)));

        let (state, alert) = tracker.apply(&Observation::at(Outcome::FetchFailed, at(1)));
        assert!(alert.is_none());
        assert_eq!(state.last_confirmed, Availability::Available);
        assert_eq!(state.consecutive_failures, 1);
        assert_eq!(state.last_checked_at, Some(at(1)));
    }

    #[test]
    fn test_drop_disappearing_does_not_alert() {
        let mut tracker = StateTracker::new();
        let (_, first) = tracker.apply(&Observation::at(Outcome::Available, at(0)));
        assert!(first.is_some());

        let (state, alert) = tracker.apply(&Observation::at(Outcome::Unavailable, at(1)));
        assert!(alert.is_none());
        assert_eq!(state.last_confirmed, Availability::Unavailable);
    }

    #[test]
    fn test_failure_between_available_does_not_realert() {
        let mut tracker = StateTracker::new();
        let outcomes = [
            Outcome::Available,
            Outcome::FetchFailed,
            Outcome::FetchFailed,
            Outcome::Available,
        ];
        let alerts = outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| tracker.apply(&Observation::at(*o, at(i as i64))).1)
            .count();
        assert_eq!(alerts, 1);
    }

    #[test]
    fn test_cooldown_realert() {
        let mut tracker = StateTracker::new().with_realert_cooldown(Some(Duration::from_secs(60)));

        let (_, first) = tracker.apply(&Observation::at(Outcome::Available, at(0)));
        assert_eq!(first.unwrap().reason, AlertReason::BecameAvailable);

        let (_, within) = tracker.apply(&Observation::at(Outcome::Available, at(30)));
        assert!(within.is_none());

        let (state, after) = tracker.apply(&Observation::at(Outcome::Available, at(61)));
        assert_eq!(after.unwrap().reason, AlertReason::StillAvailable);
        assert_eq!(state.last_alert_at, Some(at(61)));

        // 冷却从上次提醒重新计时
        let (_, again) = tracker.apply(&Observation::at(Outcome::Available, at(90)));
        assert!(again.is_none());
    }

    fn run(outcomes: &[Outcome]) -> (Vec<u32>, Vec<usize>) {
        let mut tracker = StateTracker::new();
        let mut failures = Vec::new();
        let mut alerts_at = Vec::new();
        for (i, outcome) in outcomes.iter().enumerate() {
            let (state, alert) = tracker.apply(&Observation::at(*outcome, at(i as i64)));
            failures.push(state.consecutive_failures);
            if alert.is_some() {
                alerts_at.push(i);
            }
        }
        (failures, alerts_at)
    }

    #[test]
    fn test_three_observation_sequences() {
        use Outcome::*;

        let (_, alerts) = run(&[Unavailable, Unavailable, Available]);
        assert_eq!(alerts, vec![2]);

        let (failures, alerts) = run(&[FetchFailed, FetchFailed, Available]);
        assert_eq!(failures, vec![1, 2, 0]);
        assert_eq!(alerts, vec![2]);

        let (_, alerts) = run(&[Available, Available, Available]);
        assert_eq!(alerts, vec![0]);
    }

    #[test]
    fn test_alert_count_equals_edge_count() {
        use Outcome::*;
        let all = [Available, Unavailable, FetchFailed];

        // 枚举长度 6 的全部序列
        for code in 0..3usize.pow(6) {
            let mut n = code;
            let outcomes: Vec<Outcome> = (0..6)
                .map(|_| {
                    let o = all[n % 3];
                    n /= 3;
                    o
                })
                .collect();

            let mut confirmed = Availability::Unavailable;
            let mut edges = 0;
            for outcome in &outcomes {
                match outcome {
                    Available if !confirmed.is_available() => {
                        edges += 1;
                        confirmed = Availability::Available;
                    }
                    Available => {}
                    Unavailable => confirmed = Availability::Unavailable,
                    FetchFailed => {}
                }
            }

            let (_, alerts) = run(&outcomes);
            assert_eq!(alerts.len(), edges, "sequence {:?}", outcomes);
        }
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let mut tracker = StateTracker::new();
        let (state, _) = tracker.apply(&Observation::at(Outcome::FetchFailed, at(0)));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lastConfirmed"], "unavailable");
        assert_eq!(json["consecutiveFailures"], 1);
        assert!(json["lastCheckedAt"].is_string());
    }

    #[test]
    fn test_alert_reason_serialization() {
        let json = serde_json::to_string(&AlertReason::BecameAvailable).unwrap();
        assert_eq!(json, "\"became-available\"");
    }
}
