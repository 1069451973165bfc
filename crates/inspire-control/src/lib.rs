//! # Inspire Control
//!
//! 基于力传感器反馈的自适应抓取控制。
//!
//! ## 模块
//!
//! - `config`: 抓取参数（每次会话构造一次，运行中不可变）
//! - `force`: 传感器数据源抽象与多传感器平均
//! - `sensor`: 内存中的传感器数据中心（解析传感器板的文本输出）
//! - `stats`: 滑动窗口与标准差
//! - `events`: 状态/进度/完成/力值事件与观察者
//! - `actuator`: 灵巧手与动作执行器的协作接口
//! - `machine`: 抓取状态机（确定性，按 tick 推进）
//! - `runner`: 在独立工作线程上以固定周期驱动状态机
//!
//! ## 状态转换
//!
//! ```text
//! Idle → Initializing → Closing ⇄ Analyzing → Completed
//!                          ↓
//!                      Releasing → Completed
//! (任意活动状态) → Stopped
//! ```

pub mod actuator;
pub mod config;
pub mod events;
pub mod force;
pub mod machine;
pub mod runner;
pub mod sensor;
pub mod stats;

pub use actuator::{ActionExecutor, HandActuator};
pub use config::{ConfigError, GraspConfig};
pub use events::{ChannelObserver, GraspEvent, GraspObserver, NoopObserver};
pub use force::{ForceAggregator, ForceSample, ForceThresholds, SensorFeed, SensorId};
pub use machine::{GraspOutcome, GraspReason, GraspSession, GraspState, GraspStateMachine, Tick};
pub use runner::{GraspHandle, GraspRunner, RunnerConfig};
pub use sensor::{SensorHub, SensorReading, parse_sensor_line};

use inspire_driver::DriverError;
use thiserror::Error;

/// 控制层错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 已有抓取会话在运行
    #[error("A grasp session is already running")]
    AlreadyRunning,

    #[error("No sensor selected")]
    NoSensors,

    #[error("Unknown sensor: {0}")]
    UnknownSensor(SensorId),

    #[error("Cannot {operation} in state {state}")]
    InvalidState {
        state: GraspState,
        operation: &'static str,
    },

    #[error("Invalid sensor line: {0:?}")]
    SensorLine(String),

    #[error("Grasp worker error: {0}")]
    Worker(String),
}
