//! 通知层 - 把一次提醒扇出到多个独立渠道
//!
//! # 设计目标
//! 1. 统一接口：所有渠道实现 `AlertChannel` trait
//! 2. 渠道隔离：每个渠道独立发送，一个失败不影响其他渠道
//! 3. 不重试：失败以 `ChannelError` 报告给调用方记录
//! 4. 不阻塞轮询：`MonitorService` 在后台任务中分发
//!
//! # 使用示例
//! ```ignore
//! use ticket_drop_monitor::notification::NotificationBuilder;
//!
//! let built = NotificationBuilder::new(url).channels(config.channels.clone()).build();
//! let report = built.dispatcher.dispatch(&event).await;
//! ```

pub mod builder;
pub mod channel;
pub mod channels;
pub mod dispatcher;

pub use builder::{BuiltNotifier, NotificationBuilder};
pub use channel::{AlertChannel, AlertMessage, Sent};
pub use dispatcher::{DispatchReport, NotificationDispatcher};
