//! Watch 命令 - 前台持续监控，并提供 HTTP 查询接口

use crate::cli::state_store;
use crate::config::MonitorConfig;
use crate::monitor::MonitorService;
use crate::server;
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Watch 命令参数
#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// 监控的售票页面，覆盖配置文件
    #[arg(long, short)]
    pub target: Option<String>,

    /// 基础轮询间隔（秒），覆盖配置文件
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// HTTP 监听地址，覆盖配置文件
    #[arg(long)]
    pub listen: Option<String>,

    /// 本次运行不读写持久化状态
    #[arg(long)]
    pub no_persist: bool,

    /// 不启动 HTTP 接口
    #[arg(long)]
    pub no_server: bool,

    /// 只记录提醒，不实际发送
    #[arg(long)]
    pub dry_run: bool,
}

impl WatchArgs {
    /// 命令行参数覆盖配置
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(target) = &self.target {
            config.target_url = target.clone();
        }
        if let Some(interval) = self.interval {
            config.poll_interval_seconds = interval;
            config.max_backoff_seconds = config.max_backoff_seconds.max(interval);
        }
        if let Some(listen) = &self.listen {
            config.listen_address = listen.clone();
        }
        if self.no_persist {
            config.persist_state = false;
        }
    }
}

/// 处理 watch 命令，直到收到 Ctrl+C
pub async fn handle_watch(args: WatchArgs, mut config: MonitorConfig) -> Result<()> {
    args.apply(&mut config);

    let service = Arc::new(MonitorService::from_config(&config, args.dry_run, state_store(&config))?);
    for issue in service.configuration_issues() {
        eprintln!("⚠️ {}", issue);
    }

    let shutdown = CancellationToken::new();
    let server_task = if args.no_server {
        None
    } else {
        let listener = TcpListener::bind(&config.listen_address)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_address))?;
        let token = shutdown.clone();
        let service = Arc::clone(&service);
        Some(tokio::spawn(async move {
            server::serve(listener, service, async move { token.cancelled().await }).await
        }))
    };

    service.start()?;
    println!("👀 正在监控 {}", config.target_url);
    println!("   每 {} 秒检测一次，按 Ctrl+C 停止", config.poll_interval_seconds);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Shutdown signal received");

    shutdown.cancel();
    service.stop().await;

    if let Some(task) = server_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "HTTP server failed"),
            Err(e) => error!(error = %e, "HTTP server task panicked"),
        }
    }

    println!("✅ 监控已停止");
    Ok(())
}
