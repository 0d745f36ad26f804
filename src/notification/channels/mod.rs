//! 具体渠道实现

pub mod command;
pub mod desktop;
pub mod sound;
pub mod terminal;
pub mod webhook;

pub use command::CommandSpec;
pub use desktop::{DesktopBackend, DesktopChannel};
pub use sound::SoundChannel;
pub use terminal::TerminalChannel;
pub use webhook::{WebhookChannel, WebhookConfig};
