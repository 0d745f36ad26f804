//! 检测器 - 抓取目标页面并给出三态结果
//!
//! `Detector` 是注入的能力：一次 `check` 必须在有限时间内结束，
//! 任何传输、超时或解析错误都表现为 [`Outcome::FetchFailed`]，不会向外抛出。

pub mod keyword;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use keyword::KeywordDetector;

/// 单次检测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// 页面显示可购票
    Available,
    /// 页面正常但无票
    Unavailable,
    /// 页面抓取或解析失败
    FetchFailed,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::FetchFailed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Available => write!(f, "available"),
            Outcome::Unavailable => write!(f, "unavailable"),
            Outcome::FetchFailed => write!(f, "fetch_failed"),
        }
    }
}

/// 可用性检测能力
#[async_trait]
pub trait Detector: Send + Sync {
    /// 对目标执行一次抓取和检查
    async fn check(&self, target: &str) -> Outcome;
}
