//! 驱动层模块
//!
//! 本模块提供 Inspire 灵巧手的设备驱动功能，包括：
//! - 类型化的寄存器读写（角度、速度、受力、力控阈值、状态、故障）
//! - 参数校验（在任何 I/O 之前拒绝非法输入）
//! - 最近设定值快照（ArcSwap 无锁读取）
//! - 紧急释放与夹爪模式
//!
//! 串口事务是 fail-soft 的：超时或截断的响应解码为 0，而不是报错。

mod builder;
pub mod config;
mod error;
mod hand;
pub mod state;

pub use builder::HandBuilder;
pub use config::{CLOSE_POSE, HOME_POSE, HandConfig, OPEN_POSE};
pub use error::DriverError;
pub use hand::{InspireHand, ReleaseGroup};
pub use state::HandSnapshot;
