//! # Inspire Protocol
//!
//! 灵巧手串口二进制协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 帧格式常量
//! - `registers`: 命令字与寄存器地址
//! - `dof`: 6 自由度向量与字编码
//! - `frame`: 帧构建、校验与解析
//! - `feedback`: 状态/故障报告解析
//!
//! ## 字节序
//!
//! 协议中所有多字节数值均为小端（低字节在前），`-1` 固定编码为 `0xFF 0xFF`，
//! 表示"该轴保持不变"。
//!
//! ```rust
//! use inspire_protocol::{HandFrame, Register, decode_dof_vector, PAYLOAD_OFFSET};
//!
//! let request = HandFrame::write_request(1, Register::AngleTarget, &[1000; 6]);
//! assert_eq!(&request[..2], &[0xEB, 0x90]);
//!
//! // 截断的响应解码为全 0
//! assert_eq!(decode_dof_vector(&request[..5], PAYLOAD_OFFSET).0, [0; 6]);
//! ```

pub mod constants;
pub mod dof;
pub mod feedback;
pub mod frame;
pub mod registers;

// 重新导出常用类型
pub use constants::*;
pub use dof::{DofVector, Finger, decode_word, encode_word};
pub use feedback::{FingerErrorFlags, FingerStatus, HandErrorReport, HandStatusReport};
pub use frame::{
    HandFrame, build_frame, checksum, decode_byte_report, decode_dof_vector, encode_raw,
    try_decode_byte_report, try_decode_dof_vector, verify_checksum,
};
pub use registers::{Command, Register};

/// 协议层错误
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid frame header: {:02X} {:02X}", .found[0], .found[1])]
    InvalidHeader { found: [u8; 2] },

    #[error("Invalid length field: {declared}")]
    InvalidLengthField { declared: usize },

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Invalid command byte: 0x{0:02X}")]
    InvalidCommand(u8),

    #[error("Expected {expected} values, got {actual}")]
    InvalidDofCount { expected: usize, actual: usize },

    #[error("Value {value} on axis {axis} out of range [{min}, {max}]")]
    ValueOutOfRange {
        axis: usize,
        value: i32,
        min: i32,
        max: i32,
    },
}
