//! 提示音渠道 - 调用系统播放器播放提醒音

use super::command::{find_program, CommandSpec};
use crate::error::{ChannelError, ConfigurationError};
use crate::notification::channel::{AlertChannel, AlertMessage, Sent};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

const MACOS_DEFAULT_SOUND: &str = "/System/Library/Sounds/Glass.aiff";
const FREEDESKTOP_DEFAULT_SOUND: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";

/// 提示音渠道
pub struct SoundChannel {
    command: CommandSpec,
}

impl SoundChannel {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }

    /// 检测可用的播放器（afplay / paplay / aplay）
    pub fn detect(sound_file: Option<&Path>) -> Result<Self, ConfigurationError> {
        let player = find_program(&["afplay", "paplay", "aplay"]).ok_or_else(|| {
            ConfigurationError::channel_unavailable("sound", "no audio player (afplay, paplay, aplay) found")
        })?;

        let file = match sound_file {
            Some(file) => file.to_path_buf(),
            None => default_sound_for(&player),
        };
        if !file.exists() {
            return Err(ConfigurationError::channel_unavailable(
                "sound",
                format!("sound file {} not found", file.display()),
            ));
        }

        debug!(player = %player.display(), file = %file.display(), "Sound channel ready");
        Ok(Self::new(
            CommandSpec::new(player).arg(file.display().to_string()),
        ))
    }
}

fn default_sound_for(player: &Path) -> PathBuf {
    if player.ends_with("afplay") {
        PathBuf::from(MACOS_DEFAULT_SOUND)
    } else {
        PathBuf::from(FREEDESKTOP_DEFAULT_SOUND)
    }
}

#[async_trait]
impl AlertChannel for SoundChannel {
    fn name(&self) -> &str {
        "sound"
    }

    async fn send(&self, _message: &AlertMessage) -> Result<Sent, ChannelError> {
        self.command.run().await
    }
}
