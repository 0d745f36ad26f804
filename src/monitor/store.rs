//! 状态存储 - 只保存最近一次 `MonitorState`（JSON，带文件锁）
//!
//! 前台轮询和后台定时检测是两个进程，通过同一个文件上的排他锁
//! 串行化 读取 → apply → 写回。

use super::state::MonitorState;
use crate::error::{MonitorError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 状态文件
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 默认位置 `~/.config/ticket-drop-monitor/state.json`
    pub fn default_path() -> PathBuf {
        crate::config::MonitorConfig::config_dir().join("state.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取状态（不存在时返回 None）
    pub fn load(&self) -> Result<Option<MonitorState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut lock = self.lock()?;
        lock.read()
    }

    /// 不加锁读取，供查询使用；文件缺失、正在写入或损坏时返回 None
    pub fn peek(&self) -> Option<MonitorState> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "State file not readable yet");
                None
            }
        }
    }

    /// 获取排他锁，锁在返回值 drop 时释放
    pub fn lock(&self) -> Result<StateLock> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| MonitorError::store(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| MonitorError::store(&self.path, e))?;

        file.lock_exclusive()
            .map_err(|e| MonitorError::store(&self.path, e))?;

        Ok(StateLock {
            file,
            path: self.path.clone(),
        })
    }
}

/// 持有排他锁的状态文件
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// 读取当前状态；空文件或内容损坏时返回 None
    pub fn read(&mut self) -> Result<Option<MonitorState>> {
        let mut content = String::new();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_string(&mut content))
            .map_err(|e| MonitorError::store(&self.path, e))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt state file");
                Ok(None)
            }
        }
    }

    /// 覆盖写入状态
    pub fn write(&mut self, state: &MonitorState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        self.file
            .set_len(0)
            .and_then(|_| self.file.seek(SeekFrom::Start(0)))
            .and_then(|_| self.file.write_all(json.as_bytes()))
            .and_then(|_| self.file.sync_data())
            .map_err(|e| MonitorError::store(&self.path, e))
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
