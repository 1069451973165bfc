//! 灵巧手连接配置
//!
//! 可从 TOML 加载，所有字段都有默认值：
//!
//! ```toml
//! port = "/dev/ttyUSB0"
//! baud_rate = 115200
//! hand_id = 1
//! timeout_ms = 1000
//! strict_checksum = false
//! initial_angle = [1000, 1000, 1000, 1000, 1000, 200]
//! ```

use crate::DriverError;
use inspire_protocol::{DEFAULT_HAND_ID, DofVector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 张开手掌（大拇指旋转保持在 200）
pub const OPEN_POSE: DofVector = DofVector::new([1000, 1000, 1000, 1000, 1000, 200]);

/// 握拳
pub const CLOSE_POSE: DofVector = DofVector::new([400, 400, 400, 400, 700, 200]);

/// 中位
pub const HOME_POSE: DofVector = DofVector::splat(500);

/// I/O 超时允许范围
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 10..=10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// 串口路径
    pub port: String,
    pub baud_rate: u32,
    /// 设备 ID（帧中的第 3 个字节）
    pub hand_id: u8,
    /// 单次事务的 I/O 超时（毫秒）
    pub timeout_ms: u64,
    /// 严格模式：校验响应帧头、长度与校验和，失败时返回 `ProtocolError`
    pub strict_checksum: bool,
    /// `reset()` 使用的初始角度
    pub initial_angle: DofVector,
    /// 夹爪模式下"全开"的角度
    pub binary_open: DofVector,
    /// 夹爪模式下"全闭"的角度
    pub binary_close: DofVector,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: inspire_serial::serial::DEFAULT_BAUD_RATE,
            hand_id: DEFAULT_HAND_ID,
            timeout_ms: 1000,
            strict_checksum: false,
            initial_angle: OPEN_POSE,
            binary_open: OPEN_POSE,
            binary_close: CLOSE_POSE,
        }
    }
}

impl HandConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), DriverError> {
        if self.port.trim().is_empty() {
            return Err(DriverError::validation("port must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(DriverError::validation("baud_rate must be positive"));
        }
        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(DriverError::validation(format!(
                "timeout_ms must be within {}..={}, got {}",
                TIMEOUT_RANGE_MS.start(),
                TIMEOUT_RANGE_MS.end(),
                self.timeout_ms
            )));
        }
        for (name, pose) in [
            ("initial_angle", &self.initial_angle),
            ("binary_open", &self.binary_open),
            ("binary_close", &self.binary_close),
        ] {
            pose.validate_range(0, inspire_protocol::DOF_VALUE_MAX)
                .map_err(|e| DriverError::validation(format!("{name}: {e}")))?;
        }
        Ok(())
    }

    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(text: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(text).map_err(|e| DriverError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DriverError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}
