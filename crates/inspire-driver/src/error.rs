//! 驱动层错误类型定义

use inspire_protocol::ProtocolError;
use inspire_serial::TransportError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 参数校验失败（在任何 I/O 之前拒绝）
    #[error("Validation error: {0}")]
    Validation(String),

    /// 严格模式下的协议错误（校验和、帧头、长度）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 传输层错误（仅在打开/关闭端口时出现，事务本身是 fail-soft 的）
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 配置文件读取或解析失败
    #[error("Config error: {0}")]
    Config(String),
}

impl DriverError {
    pub fn validation(reason: impl std::fmt::Display) -> Self {
        DriverError::Validation(reason.to_string())
    }
}
