//! 系统通知渠道 - macOS 用 osascript，Linux 用 notify-send

use super::command::{find_program, CommandSpec};
use crate::error::{ChannelError, ConfigurationError};
use crate::notification::channel::{AlertChannel, AlertMessage, Sent};
use async_trait::async_trait;
use std::path::PathBuf;

/// 通知后端
#[derive(Debug, Clone, PartialEq)]
pub enum DesktopBackend {
    Osascript(PathBuf),
    NotifySend(PathBuf),
}

/// 系统通知渠道
pub struct DesktopChannel {
    backend: DesktopBackend,
}

impl DesktopChannel {
    pub fn new(backend: DesktopBackend) -> Self {
        Self { backend }
    }

    /// 检测当前平台可用的通知后端
    pub fn detect() -> Result<Self, ConfigurationError> {
        if let Some(path) = find_program(&["osascript"]) {
            return Ok(Self::new(DesktopBackend::Osascript(path)));
        }
        if let Some(path) = find_program(&["notify-send"]) {
            return Ok(Self::new(DesktopBackend::NotifySend(path)));
        }
        Err(ConfigurationError::channel_unavailable(
            "desktop",
            "neither osascript nor notify-send is available",
        ))
    }

    /// 生成发送命令
    pub fn command_for(&self, message: &AlertMessage) -> CommandSpec {
        match &self.backend {
            DesktopBackend::Osascript(path) => {
                let script = format!(
                    "display notification \"{}\" with title \"{}\" sound name \"default\"",
                    escape_applescript(&message.body),
                    escape_applescript(&message.title),
                );
                CommandSpec::new(path).arg("-e").arg(script)
            }
            DesktopBackend::NotifySend(path) => CommandSpec::new(path)
                .arg("--urgency=critical")
                .arg("--app-name=tdm")
                .arg(&message.title)
                .arg(&message.body),
        }
    }
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl AlertChannel for DesktopChannel {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn send(&self, message: &AlertMessage) -> Result<Sent, ChannelError> {
        self.command_for(message).run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{AlertEvent, AlertReason};
    use chrono::Utc;

    fn message() -> AlertMessage {
        let event = AlertEvent {
            triggered_at: Utc::now(),
            reason: AlertReason::BecameAvailable,
        };
        AlertMessage::from_event(&event, "https://example.com")
    }

    #[test]
    fn test_osascript_command() {
        let channel = DesktopChannel::new(DesktopBackend::Osascript(PathBuf::from("/usr/bin/osascript")));
        let cmd = channel.command_for(&message());

        assert_eq!(cmd.program, PathBuf::from("/usr/bin/osascript"));
        assert_eq!(cmd.args[0], "-e");
        assert!(cmd.args[1].starts_with("display notification"));
        assert!(cmd.args[1].contains("with title \"🚨 Tickets Available!\""));
    }

    #[test]
    fn test_notify_send_command() {
        let channel = DesktopChannel::new(DesktopBackend::NotifySend(PathBuf::from("notify-send")));
        let cmd = channel.command_for(&message());

        assert_eq!(cmd.args.len(), 4);
        assert_eq!(cmd.args[2], "🚨 Tickets Available!");
    }

    #[test]
    fn test_escape_applescript() {
        assert_eq!(escape_applescript(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
    }

    #[tokio::test]
    async fn test_send_reports_command_failure() {
        // `false` 忽略参数并以非零状态退出
        let channel = DesktopChannel::new(DesktopBackend::NotifySend(PathBuf::from("false")));
        let result = channel.send(&message()).await;
        assert!(matches!(result, Err(ChannelError::CommandFailed { .. })));
    }
}
