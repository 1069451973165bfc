//! CLI 配置文件
//!
//! ```toml
//! [hand]
//! port = "/dev/ttyUSB0"
//! hand_id = 1
//!
//! [grasp]
//! finger_indices = [1, 2, 3]
//! force_threshold_z = 3.0
//!
//! [sensors]
//! port = "/dev/ttyACM0"
//! ids = [1, 2]
//! ```
//!
//! 命令行参数优先于配置文件。

use anyhow::{Context, Result};
use inspire_sdk::control::SensorId;
use inspire_sdk::{GraspConfig, HandConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub hand: HandConfig,
    pub grasp: GraspConfig,
    pub sensors: SensorConfig,
}

/// 力传感器板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// 传感器板串口；未设置时只能在模拟模式下抓取
    pub port: Option<String>,
    pub baud_rate: u32,
    /// 参与平均的传感器编号
    pub ids: Vec<SensorId>,
    /// 启动抓取前等待传感器上线的时间（毫秒）
    pub wait_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
            ids: vec![1],
            wait_ms: 3000,
        }
    }
}

impl CliConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("invalid CLI config")?;
        config.hand.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// 指定路径时加载，否则使用默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
