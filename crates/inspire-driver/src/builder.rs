//! Builder 模式实现
//!
//! 提供链式构造 `InspireHand` 实例的便捷方式。

use crate::config::HandConfig;
use crate::error::DriverError;
use crate::hand::InspireHand;
use inspire_protocol::DofVector;
use inspire_serial::{SerialAdapter, SerialPortAdapter};
use std::time::Duration;

/// InspireHand Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use inspire_driver::HandBuilder;
///
/// let hand = HandBuilder::new()
///     .port("/dev/ttyUSB0")
///     .baud_rate(115_200)
///     .build()
///     .unwrap();
/// let angles = hand.get_angles(true).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandBuilder {
    config: HandConfig,
}

impl HandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从完整配置开始
    pub fn from_config(config: HandConfig) -> Self {
        Self { config }
    }

    /// 设置串口路径
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.config.port = port.into();
        self
    }

    /// 设置波特率（默认 115200）
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    /// 设置设备 ID（默认 1）
    pub fn hand_id(mut self, hand_id: u8) -> Self {
        self.config.hand_id = hand_id;
        self
    }

    /// 设置单次事务超时（默认 1 秒）
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 启用严格模式（校验响应帧）
    pub fn strict_checksum(mut self, strict: bool) -> Self {
        self.config.strict_checksum = strict;
        self
    }

    /// 设置 `reset()` 使用的初始角度
    pub fn initial_angle(mut self, angle: DofVector) -> Self {
        self.config.initial_angle = angle;
        self
    }

    /// 打开真实串口并构建
    ///
    /// # Errors
    /// - `DriverError::Validation`: 配置不合法
    /// - `DriverError::Transport`: 串口打开失败
    pub fn build(self) -> Result<InspireHand<SerialPortAdapter>, DriverError> {
        let adapter = SerialPortAdapter::new(self.config.port.clone(), self.config.baud_rate);
        self.build_with_adapter(adapter)
    }

    /// 使用自定义适配器构建（例如模拟设备）
    pub fn build_with_adapter<A: SerialAdapter>(self, adapter: A) -> Result<InspireHand<A>, DriverError> {
        self.config.validate()?;
        let hand = InspireHand::new(adapter, self.config);
        hand.connect()?;
        Ok(hand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspire_serial::mock::SimulatedHand;

    #[test]
    fn test_builder_chain() {
        let hand = HandBuilder::new()
            .port("/dev/ttyACM0")
            .hand_id(1)
            .timeout(Duration::from_millis(50))
            .strict_checksum(true)
            .initial_angle(DofVector::splat(500))
            .build_with_adapter(SimulatedHand::default())
            .unwrap();
        assert!(hand.is_connected());
        assert_eq!(hand.config().port, "/dev/ttyACM0");
        assert_eq!(hand.timeout(), Duration::from_millis(50));
        assert!(hand.config().strict_checksum);
        assert_eq!(hand.config().initial_angle, DofVector::splat(500));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = HandBuilder::new()
            .port("")
            .build_with_adapter(SimulatedHand::default());
        assert!(matches!(result, Err(DriverError::Validation(_))));
    }

    #[test]
    fn test_build_missing_port_fails() {
        let result = HandBuilder::new().port("/dev/inspire-missing-port").build();
        assert!(matches!(result, Err(DriverError::Transport(_))));
    }
}
