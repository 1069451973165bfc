//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use inspire_sdk::prelude::*;
//! ```

// 驱动层
pub use crate::driver::{DriverError, HandBuilder, HandConfig, InspireHand, ReleaseGroup};

// 控制层
pub use crate::control::{
    ActionExecutor, ChannelObserver, ControlError, GraspConfig, GraspEvent, GraspHandle,
    GraspObserver, GraspOutcome, GraspReason, GraspRunner, GraspState, HandActuator, RunnerConfig,
    SensorFeed, SensorHub,
};

// 协议层
pub use crate::protocol::{DofVector, Finger, HandErrorReport, HandStatusReport, ProtocolError};

// 串口层
pub use crate::serial::{SerialAdapter, TransportError};
