//! Output formatting for CLI commands

use crate::monitor::MonitorState;
use serde::Serialize;

/// Format output as JSON
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// 人类可读的状态摘要
pub fn format_state(state: &MonitorState) -> String {
    let availability = if state.last_confirmed.is_available() {
        "🎟️  Tickets available"
    } else {
        "⏳ No tickets yet"
    };

    let mut lines = vec![availability.to_string()];
    match state.last_checked_at {
        Some(at) => lines.push(format!("   最近检测: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))),
        None => lines.push("   最近检测: 从未".to_string()),
    }
    if let Some(outcome) = state.last_outcome {
        lines.push(format!("   检测结果: {}", outcome));
    }
    if state.consecutive_failures > 0 {
        lines.push(format!("   ⚠️ 连续失败: {} 次", state.consecutive_failures));
    }
    if let Some(at) = state.last_alert_at {
        lines.push(format!("   最近提醒: {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Outcome;
    use crate::monitor::{Observation, StateTracker};

    #[test]
    fn test_format_initial_state() {
        let text = format_state(&MonitorState::default());
        assert!(text.contains("No tickets yet"));
        assert!(text.contains("从未"));
        assert!(!text.contains("连续失败"));
    }

    #[test]
    fn test_format_failures_and_alert() {
        let mut tracker = StateTracker::new();
        tracker.apply(&Observation::new(Outcome::Available));
        let (state, _) = tracker.apply(&Observation::new(Outcome::FetchFailed));

        let text = format_state(&state);
        assert!(text.contains("Tickets available"));
        assert!(text.contains("连续失败: 1 次"));
        assert!(text.contains("最近提醒"));
    }
}
