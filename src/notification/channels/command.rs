//! 外部命令执行 - 声音和系统通知渠道共用

use crate::error::ChannelError;
use crate::notification::channel::Sent;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// 要执行的外部命令
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 执行命令并等待退出
    pub async fn run(&self) -> Result<Sent, ChannelError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ChannelError::Launch {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(Sent::Delivered)
        } else {
            Err(ChannelError::CommandFailed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// 在 PATH 中查找第一个可用的程序
pub fn find_program(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().find_map(|name| which::which(name).ok())
}
