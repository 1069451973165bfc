//! # Inspire Serial Transport Layer
//!
//! 串口传输层，提供统一的字节流抽象和"单请求在途"的事务封装。
//!
//! - [`SerialAdapter`]: 底层字节流 trait（打开/关闭/写/带超时读）
//! - [`SerialPortAdapter`]: 基于 `serialport` 的真实串口实现
//! - [`HandTransport`]: 持有适配器和互斥锁，提供严格与宽松（fail-soft）两种事务接口
//! - `mock::SimulatedHand`: 模拟灵巧手（需要 `mock` feature 或测试环境）

use std::time::Duration;
use thiserror::Error;

pub mod serial;
pub mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use serial::SerialPortAdapter;
pub use transport::HandTransport;

/// 传输层统一错误类型
///
/// 由传输层内部判定错误类别，上层按结构化的值分支，而不是匹配错误文本。
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Read timeout")]
    Timeout,

    #[error("Short read: expected {expected} bytes, received {}", .received.len())]
    ShortRead { expected: usize, received: Vec<u8> },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device Error: {0}")]
    Device(#[from] SerialDeviceError),

    #[error("Port not open")]
    NotOpen,
}

impl TransportError {
    /// 是否为线路噪声类的瞬时错误（超时或截断）
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::ShortRead { .. } => true,
            TransportError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialDeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    InvalidConfig,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct SerialDeviceError {
    pub kind: SerialDeviceErrorKind,
    pub message: String,
}

impl SerialDeviceError {
    pub fn new(kind: SerialDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 是否为致命错误（重试无意义）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            SerialDeviceErrorKind::NotFound | SerialDeviceErrorKind::AccessDenied
        )
    }
}

impl From<serialport::Error> for SerialDeviceError {
    fn from(err: serialport::Error) -> Self {
        let kind = match err.kind() {
            serialport::ErrorKind::NoDevice => SerialDeviceErrorKind::NotFound,
            serialport::ErrorKind::InvalidInput => SerialDeviceErrorKind::InvalidConfig,
            serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
                SerialDeviceErrorKind::NotFound
            },
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                SerialDeviceErrorKind::AccessDenied
            },
            serialport::ErrorKind::Io(_) => SerialDeviceErrorKind::Backend,
            serialport::ErrorKind::Unknown => SerialDeviceErrorKind::Unknown,
        };
        Self::new(kind, err.description)
    }
}

impl From<serialport::Error> for TransportError {
    fn from(err: serialport::Error) -> Self {
        TransportError::Device(err.into())
    }
}

/// 串口字节流适配器
///
/// 实现者只负责原始字节的收发；事务语义（清空残留、补读、fail-soft）
/// 由 [`HandTransport`] 统一处理。
pub trait SerialAdapter: Send {
    /// 打开端口（已打开时为空操作）
    fn open(&mut self) -> Result<(), TransportError>;

    /// 关闭端口（未打开时为空操作）
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// 丢弃输入缓冲区中尚未读取的字节
    fn clear_input(&mut self) -> Result<(), TransportError>;

    /// 写出全部字节
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// 读取最多 `buf.len()` 字节，最多等待 `timeout`
    ///
    /// 超时未收到任何字节时返回 `Ok(0)`。
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;
}

impl<A: SerialAdapter + ?Sized> SerialAdapter for Box<A> {
    fn open(&mut self) -> Result<(), TransportError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn clear_input(&mut self) -> Result<(), TransportError> {
        (**self).clear_input()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(data)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        (**self).read_timeout(buf, timeout)
    }
}
