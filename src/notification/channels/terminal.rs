//! 终端横幅渠道 - 前台进程中的同步提醒

use crate::error::ChannelError;
use crate::notification::channel::{AlertChannel, AlertMessage, Sent};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// 终端横幅渠道
pub struct TerminalChannel {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl TerminalChannel {
    /// 输出到 stdout
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

/// 渲染横幅文本
pub fn render_banner(message: &AlertMessage) -> String {
    format!(
        "\x07\n==============================\n {}\n {}\n {}\n [{}] {}\n==============================\n",
        message.title,
        message.body,
        message.target,
        message.triggered_at.format("%Y-%m-%d %H:%M:%S UTC"),
        message.reason,
    )
}

#[async_trait]
impl AlertChannel for TerminalChannel {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn send(&self, message: &AlertMessage) -> Result<Sent, ChannelError> {
        let banner = render_banner(message);
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(banner.as_bytes())?;
        writer.flush()?;
        Ok(Sent::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{AlertEvent, AlertReason};
    use chrono::Utc;
    use std::sync::Arc;

    /// 可共享的内存 writer
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_terminal_banner_written() {
        let buf = SharedBuf::default();
        let channel = TerminalChannel::with_writer(Box::new(buf.clone()));
        let event = AlertEvent {
            triggered_at: Utc::now(),
            reason: AlertReason::BecameAvailable,
        };

        let result = channel.send(&AlertMessage::from_event(&event, "https://example.com/e")).await;

        assert!(matches!(result, Ok(Sent::Delivered)));
        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("Tickets Available!"));
        assert!(out.contains("https://example.com/e"));
        assert!(out.contains("became-available"));
    }
}
