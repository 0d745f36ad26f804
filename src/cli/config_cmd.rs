//! Config 命令 - 查看生效配置或写入默认配置

use crate::cli::format_json;
use crate::config::MonitorConfig;
use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

/// Config 命令参数
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// 写入默认配置文件
    #[arg(long)]
    pub init: bool,

    /// 覆盖已存在的配置文件
    #[arg(long, requires = "init")]
    pub force: bool,
}

/// 处理 config 命令
pub fn handle_config(args: ConfigArgs, config: MonitorConfig, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(MonitorConfig::default_path);

    if args.init {
        if path.exists() && !args.force {
            bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
        }
        MonitorConfig::default().save(&path)?;
        println!("✅ 已写入默认配置: {}", path.display());
        return Ok(());
    }

    if let Err(e) = config.validate() {
        eprintln!("⚠️ {}", e);
    }
    println!("# {}", path.display());
    println!("{}", format_json(&config));
    Ok(())
}
