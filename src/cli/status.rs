//! Status 命令 - 查看持久化的监控状态

use crate::cli::{format_json, format_state};
use crate::monitor::{MonitorState, StateStore};
use anyhow::Result;
use clap::Args;

/// Status 命令参数
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 处理 status 命令；从未检测过时显示初始状态
pub fn handle_status(args: StatusArgs) -> Result<()> {
    let store = StateStore::new(StateStore::default_path());
    let state = store.load()?.unwrap_or_else(MonitorState::default);

    if args.json {
        println!("{}", format_json(&state));
    } else {
        println!("{}", format_state(&state));
        println!("   状态文件: {}", store.path().display());
    }
    Ok(())
}
