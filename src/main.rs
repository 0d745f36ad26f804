//! Ticket Drop Monitor CLI
//!
//! 轮询售票页面，门票开售时立即提醒

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ticket_drop_monitor::cli::{
    handle_check, handle_config, handle_service, handle_status, handle_watch, load_config,
    CheckArgs, ConfigArgs, ServiceArgs, StatusArgs, WatchArgs,
};
use ticket_drop_monitor::MonitorConfig;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tdm")]
#[command(about = "Ticket Drop Monitor - 门票开售提醒")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/ticket-drop-monitor/config.json）
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 前台持续监控，并提供 HTTP 查询接口
    Watch(WatchArgs),
    /// 立即检测一次（后台定时任务使用）
    Check(CheckArgs),
    /// 查看最近一次的监控状态
    Status(StatusArgs),
    /// 查看生效配置或写入默认配置
    Config(ConfigArgs),
    /// 管理后台定时检测服务
    Service(ServiceArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug tdm watch
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ticket_drop_monitor=info,tdm=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Watch(args) => handle_watch(args, load_config(config_path)?).await?,
        Commands::Check(args) => handle_check(args, load_config(config_path)?).await?,
        Commands::Status(args) => handle_status(args)?,
        Commands::Config(args) => {
            // --init 时旧文件可能已损坏，不加载
            let config = if args.init {
                MonitorConfig::default()
            } else {
                load_config(config_path)?
            };
            handle_config(args, config, cli.config.clone())?
        }
        Commands::Service(args) => handle_service(args, &load_config(config_path)?)?,
    }

    Ok(())
}
