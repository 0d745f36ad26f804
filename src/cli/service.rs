//! Service 命令 - 注册/取消后台定时检测

use crate::config::MonitorConfig;
use crate::service::LaunchdService;
use anyhow::Result;
use clap::{Args, Subcommand};

/// Service 命令参数
#[derive(Args, Debug)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub action: ServiceAction,
}

#[derive(Subcommand, Debug)]
pub enum ServiceAction {
    /// 安装后台定时检测
    Install {
        /// 强制重新安装
        #[arg(long)]
        force: bool,
    },
    /// 卸载后台定时检测
    Uninstall,
    /// 查看服务状态
    Status,
}

/// 处理 service 命令
pub fn handle_service(args: ServiceArgs, config: &MonitorConfig) -> Result<()> {
    let service = LaunchdService::new(config.background_interval_seconds)?;

    match args.action {
        ServiceAction::Install { force } => {
            if force {
                let _ = service.uninstall();
            }
            service.install()?;
            println!("✅ 后台检测已安装");
            println!("   每 {} 秒运行一次 tdm check", service.interval_secs());
            println!("   查看状态: tdm service status");
        }
        ServiceAction::Uninstall => {
            service.uninstall()?;
            println!("✅ 后台检测已卸载");
        }
        ServiceAction::Status => {
            let status = service.status()?;
            let (stdout_log, stderr_log) = service.log_paths();
            if !status.installed {
                println!("⚪ 未安装");
                println!("   安装: tdm service install");
            } else if status.loaded {
                println!("🟢 已加载，每 {} 秒检测一次", service.interval_secs());
                if let Some(code) = status.last_exit_status {
                    println!("   上次退出码: {}", code);
                }
            } else {
                println!("🟡 已安装但未加载");
            }
            println!("   plist: {}", service.plist_path().display());
            println!("   日志: {}", stdout_log.display());
            println!("   错误日志: {}", stderr_log.display());
        }
    }
    Ok(())
}
