//! Inspire SDK - 因时灵巧手 Rust SDK
//!
//! 通过串口控制 Inspire 六自由度灵巧手，并基于力传感器反馈执行自适应抓取。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 帧编解码、寄存器地址、状态/故障解码
//! - **串口层** (`serial`): 串口抽象与"单请求在途"事务（fail-soft）
//! - **驱动层** (`driver`): 类型化的寄存器操作、参数校验、设定值快照
//! - **控制层** (`control`): 抓取状态机、力值聚合、传感器数据中心
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use inspire_sdk::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! inspire_sdk::init_logging("info");
//!
//! let hand = Arc::new(HandBuilder::new().port("/dev/ttyUSB0").build()?);
//! let sensors = Arc::new(SensorHub::new());
//!
//! let runner = GraspRunner::new(hand, sensors);
//! let handle = runner.start(vec![1], GraspConfig::default())?;
//! let outcome = handle.join()?;
//! println!("success={} ({})", outcome.success, outcome.message());
//! # Ok(())
//! # }
//! ```

mod logging;
pub mod prelude;

pub use inspire_control as control;
pub use inspire_driver as driver;
pub use inspire_protocol as protocol;
pub use inspire_serial as serial;

pub use logging::init_logging;

// --- 用户以此为界 ---

// 协议层
pub use protocol::{DofVector, Finger, FingerErrorFlags, FingerStatus, ProtocolError};

// 串口层
pub use serial::{SerialAdapter, SerialPortAdapter, TransportError};

// 驱动层
pub use driver::{DriverError, HandBuilder, HandConfig, InspireHand, ReleaseGroup};

// 控制层
pub use control::{
    ControlError, GraspConfig, GraspEvent, GraspHandle, GraspOutcome, GraspRunner, GraspState,
    SensorHub,
};

/// 串口灵巧手的类型别名
pub type SerialHand = InspireHand<SerialPortAdapter>;
