//! launchd service management for macOS
//!
//! 注册一个周期性运行 `tdm check` 的 LaunchAgent，应用不在前台时也会检测。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// launchd 允许的最小周期
pub const MIN_INTERVAL_SECS: u64 = 60;

/// Service status information
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub installed: bool,
    pub loaded: bool,
    pub last_exit_status: Option<i32>,
}

/// launchd service manager for the periodic background check
pub struct LaunchdService {
    plist_path: PathBuf,
    log_dir: PathBuf,
    interval_secs: u64,
}

impl LaunchdService {
    pub const SERVICE_LABEL: &'static str = "com.ticket-drop-monitor.check";
    const PLIST_NAME: &'static str = "com.ticket-drop-monitor.check.plist";

    pub fn new(interval_secs: u64) -> Result<Self> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        let plist_path = home.join("Library/LaunchAgents").join(Self::PLIST_NAME);
        let log_dir = home.join(".config/ticket-drop-monitor/logs");

        Ok(Self::with_paths(plist_path, log_dir, interval_secs))
    }

    /// 指定 plist 与日志位置
    pub fn with_paths(plist_path: PathBuf, log_dir: PathBuf, interval_secs: u64) -> Self {
        Self {
            plist_path,
            log_dir,
            interval_secs: interval_secs.max(MIN_INTERVAL_SECS),
        }
    }

    pub fn plist_path(&self) -> &Path {
        &self.plist_path
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Generate plist content for launchd
    pub fn generate_plist(&self, program: &Path) -> Result<String> {
        let stdout_log = self.log_dir.join("check.stdout.log");
        let stderr_log = self.log_dir.join("check.stderr.log");
        let home = dirs::home_dir().context("Failed to get home directory")?;

        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{program}</string>
        <string>check</string>
    </array>
    <key>StartInterval</key>
    <integer>{interval}</integer>
    <key>RunAtLoad</key>
    <true/>
    <key>StandardOutPath</key>
    <string>{stdout}</string>
    <key>StandardErrorPath</key>
    <string>{stderr}</string>
    <key>EnvironmentVariables</key>
    <dict>
        <key>HOME</key>
        <string>{home}</string>
        <key>PATH</key>
        <string>/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin:/opt/homebrew/bin</string>
    </dict>
</dict>
</plist>
"#,
            label = Self::SERVICE_LABEL,
            program = program.display(),
            interval = self.interval_secs,
            stdout = stdout_log.display(),
            stderr = stderr_log.display(),
            home = home.display(),
        ))
    }

    /// Install the launchd service
    pub fn install(&self) -> Result<()> {
        std::fs::create_dir_all(&self.log_dir).context("Failed to create log directory")?;

        if let Some(parent) = self.plist_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create LaunchAgents directory")?;
        }

        let program = std::env::current_exe().context("Failed to get current executable path")?;
        let plist_content = self.generate_plist(&program)?;
        std::fs::write(&self.plist_path, &plist_content).context("Failed to write plist file")?;

        // Load the service, cleanup on failure
        if let Err(e) = self.load() {
            let _ = std::fs::remove_file(&self.plist_path);
            return Err(e);
        }

        Ok(())
    }

    /// Uninstall the launchd service
    pub fn uninstall(&self) -> Result<()> {
        let _ = self.unload();

        // launchd operations are asynchronous
        std::thread::sleep(std::time::Duration::from_millis(500));

        if self.plist_path.exists() {
            std::fs::remove_file(&self.plist_path).context("Failed to remove plist file")?;
        }

        Ok(())
    }

    fn load(&self) -> Result<()> {
        let status = Command::new("launchctl")
            .args(["load", "-w"])
            .arg(&self.plist_path)
            .status()
            .context("Failed to execute launchctl load")?;

        if !status.success() {
            anyhow::bail!("launchctl load failed with status: {}", status);
        }

        Ok(())
    }

    fn unload(&self) -> Result<()> {
        let status = Command::new("launchctl")
            .args(["unload"])
            .arg(&self.plist_path)
            .status()
            .context("Failed to execute launchctl unload")?;

        if !status.success() {
            anyhow::bail!("launchctl unload failed with status: {}", status);
        }

        Ok(())
    }

    /// Get service status
    pub fn status(&self) -> Result<ServiceStatus> {
        if !self.plist_path.exists() {
            return Ok(ServiceStatus {
                installed: false,
                loaded: false,
                last_exit_status: None,
            });
        }

        let output = Command::new("launchctl")
            .args(["list", Self::SERVICE_LABEL])
            .output()
            .context("Failed to execute launchctl list")?;

        if !output.status.success() {
            return Ok(ServiceStatus {
                installed: true,
                loaded: false,
                last_exit_status: None,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(ServiceStatus {
            installed: true,
            loaded: true,
            last_exit_status: parse_last_exit_status(&stdout),
        })
    }

    /// Get log file paths
    pub fn log_paths(&self) -> (PathBuf, PathBuf) {
        (
            self.log_dir.join("check.stdout.log"),
            self.log_dir.join("check.stderr.log"),
        )
    }
}

/// 解析 `launchctl list <label>` 输出中的 `"LastExitStatus" = 0;`
fn parse_last_exit_status(output: &str) -> Option<i32> {
    output
        .lines()
        .find(|line| line.contains("\"LastExitStatus\""))
        .and_then(|line| {
            line.split('=')
                .nth(1)
                .map(|s| s.trim().trim_end_matches(';').trim())
                .and_then(|s| s.parse::<i32>().ok())
        })
}
