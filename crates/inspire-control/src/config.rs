//! 抓取参数
//!
//! 每次会话开始前构造一次，运行期间不可变。可从 TOML 加载：
//!
//! ```toml
//! initial_action = "pinch_ready"
//! finger_indices = [0, 1, 2, 3, 4]
//! close_step = 10
//! step_interval = 0.5
//! force_threshold_z = 3.0
//! release_mode = false
//! ```

use crate::force::ForceThresholds;
use inspire_protocol::{DOF_VALUE_MAX, HAND_DOF};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 力阈值的合法范围（超出时钳位）
pub const THRESHOLD_MIN: f64 = 0.01;
pub const THRESHOLD_MAX: f64 = 50.0;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraspConfig {
    /// 开始闭合前执行的预设动作名
    pub initial_action: Option<String>,
    /// 参与闭合/释放的手指（0..=5）
    pub finger_indices: Vec<usize>,
    pub close_step: i32,
    pub release_step: i32,
    /// 初始化阶段下发的关节速度
    pub close_speed: i32,
    /// 每次手指动作后的等待时间（秒）
    pub step_interval: f64,
    pub force_threshold_x: f64,
    pub force_threshold_y: f64,
    pub force_threshold_z: f64,
    /// 判定稳定前需要持续观察的时间（秒）
    pub stable_duration: f64,
    pub stable_std_threshold: f64,
    pub sample_window: usize,
    /// 释放模式：超阈值时张开，低于阈值时继续闭合，直到迭代上限
    pub release_mode: bool,
    pub max_iterations: u32,
    pub max_finger_angle: i32,
    pub min_finger_angle: i32,
}

impl Default for GraspConfig {
    fn default() -> Self {
        Self {
            initial_action: None,
            finger_indices: vec![0, 1, 2, 3, 4],
            close_step: 10,
            release_step: 10,
            close_speed: 1000,
            step_interval: 0.5,
            force_threshold_x: 2.0,
            force_threshold_y: 2.0,
            force_threshold_z: 2.0,
            stable_duration: 2.0,
            stable_std_threshold: 0.1,
            sample_window: 20,
            release_mode: false,
            max_iterations: 100,
            max_finger_angle: DOF_VALUE_MAX,
            min_finger_angle: 0,
        }
    }
}

impl GraspConfig {
    pub fn thresholds(&self) -> ForceThresholds {
        ForceThresholds {
            x: self.force_threshold_x,
            y: self.force_threshold_y,
            z: self.force_threshold_z,
        }
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_secs_f64(self.step_interval.max(0.0))
    }

    pub fn stable_duration(&self) -> Duration {
        Duration::from_secs_f64(self.stable_duration.max(0.0))
    }

    /// 规范化：阈值钳位到 [0.01, 50]，`max_iterations` 至少为 1，空动作名视为无动作
    pub fn normalized(mut self) -> Self {
        for t in [
            &mut self.force_threshold_x,
            &mut self.force_threshold_y,
            &mut self.force_threshold_z,
        ] {
            *t = if t.is_nan() {
                THRESHOLD_MIN
            } else {
                (*t).clamp(THRESHOLD_MIN, THRESHOLD_MAX)
            };
        }
        self.max_iterations = self.max_iterations.max(1);
        if self
            .initial_action
            .as_deref()
            .is_some_and(|a| a.trim().is_empty())
        {
            self.initial_action = None;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.finger_indices.is_empty() {
            return Err(ConfigError::invalid("finger_indices", "must not be empty"));
        }
        if let Some(&i) = self.finger_indices.iter().find(|&&i| i >= HAND_DOF) {
            return Err(ConfigError::invalid(
                "finger_indices",
                format!("index {i} out of range 0..{HAND_DOF}"),
            ));
        }
        for (field, angle) in [
            ("min_finger_angle", self.min_finger_angle),
            ("max_finger_angle", self.max_finger_angle),
        ] {
            if !(0..=DOF_VALUE_MAX).contains(&angle) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{angle} outside 0..={DOF_VALUE_MAX}"),
                ));
            }
        }
        if self.min_finger_angle > self.max_finger_angle {
            return Err(ConfigError::invalid(
                "min_finger_angle",
                format!(
                    "{} greater than max_finger_angle {}",
                    self.min_finger_angle, self.max_finger_angle
                ),
            ));
        }
        if !(0..=DOF_VALUE_MAX).contains(&self.close_speed) {
            return Err(ConfigError::invalid(
                "close_speed",
                format!("{} outside 0..={DOF_VALUE_MAX}", self.close_speed),
            ));
        }
        for (field, step) in [("close_step", self.close_step), ("release_step", self.release_step)] {
            if step < 0 {
                return Err(ConfigError::invalid(field, "must not be negative"));
            }
        }
        if self.sample_window == 0 {
            return Err(ConfigError::invalid("sample_window", "must be at least 1"));
        }
        for (field, value) in [
            ("step_interval", self.step_interval),
            ("stable_duration", self.stable_duration),
            ("stable_std_threshold", self.stable_std_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }

    /// 解析、规范化并校验
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Self>(text)?.normalized();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}
