//! Check 命令 - 一次性检测（后台定时任务入口）
//!
//! 与前台轮询走同一条 检测 → 状态跟踪 → 提醒 路径，退出前等待提醒送达。

use crate::cli::{format_json, format_state, state_store};
use crate::config::MonitorConfig;
use crate::monitor::MonitorService;
use crate::server::CheckNowResponse;
use anyhow::Result;
use clap::Args;
use tracing::info;

/// Check 命令参数
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,

    /// 只记录提醒，不实际发送
    #[arg(long)]
    pub dry_run: bool,

    /// 不读写持久化状态（每次都从无票开始）
    #[arg(long)]
    pub no_persist: bool,
}

impl CheckArgs {
    /// 命令行参数覆盖配置
    pub fn apply(&self, config: &mut MonitorConfig) {
        if self.no_persist {
            config.persist_state = false;
        }
    }
}

/// 处理 check 命令
pub async fn handle_check(args: CheckArgs, mut config: MonitorConfig) -> Result<()> {
    args.apply(&mut config);
    let service = MonitorService::from_config(&config, args.dry_run, state_store(&config))?;

    let state = service.check_now().await?;
    service.flush_alerts().await;
    info!(
        outcome = ?state.last_outcome,
        alerts_raised = service.alerts_raised(),
        "Background check finished"
    );

    if args.json {
        println!("{}", format_json(&CheckNowResponse::from(&state)));
    } else {
        println!("{}", format_state(&state));
    }
    Ok(())
}
