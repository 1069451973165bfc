//! 力传感器数据源与多传感器平均

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub type SensorId = u32;

/// 三轴力样本（多个传感器的算术平均）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ForceSample {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 任一轴的绝对值达到阈值
    pub fn exceeds(&self, thresholds: &ForceThresholds) -> bool {
        self.x.abs() >= thresholds.x || self.y.abs() >= thresholds.y || self.z.abs() >= thresholds.z
    }

    /// 三轴的绝对值都低于阈值
    pub fn below_all(&self, thresholds: &ForceThresholds) -> bool {
        !self.exceeds(thresholds)
    }
}

impl fmt::Display for ForceSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X={:.3}, Y={:.3}, Z={:.3}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceThresholds {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 传感器数据源
///
/// 只做最新值查询，不能阻塞。
pub trait SensorFeed: Send + Sync {
    /// 传感器的最新读数；未知或尚无数据时为 `None`
    fn latest_values(&self, id: SensorId) -> Option<[f32; 3]>;

    fn has_data(&self, id: SensorId) -> bool {
        self.latest_values(id).is_some()
    }

    /// 传感器是否已被数据源识别（即使暂时没有数据）
    fn is_known(&self, id: SensorId) -> bool;
}

impl<F: SensorFeed + ?Sized> SensorFeed for Arc<F> {
    fn latest_values(&self, id: SensorId) -> Option<[f32; 3]> {
        (**self).latest_values(id)
    }

    fn has_data(&self, id: SensorId) -> bool {
        (**self).has_data(id)
    }

    fn is_known(&self, id: SensorId) -> bool {
        (**self).is_known(id)
    }
}

/// 把选定传感器的读数平均成一个样本
#[derive(Clone)]
pub struct ForceAggregator {
    feed: Arc<dyn SensorFeed>,
    sensors: Vec<SensorId>,
}

impl ForceAggregator {
    pub fn new(feed: Arc<dyn SensorFeed>, sensors: Vec<SensorId>) -> Self {
        Self { feed, sensors }
    }

    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    /// 第一个数据源不认识的传感器
    pub fn unknown_sensor(&self) -> Option<SensorId> {
        self.sensors.iter().copied().find(|&id| !self.feed.is_known(id))
    }

    /// 所有有数据的传感器的逐轴平均；一个都没有时为 `None`
    pub fn sample(&self) -> Option<ForceSample> {
        let mut sum = [0.0f64; 3];
        let mut count = 0usize;
        for &id in &self.sensors {
            if !self.feed.has_data(id) {
                continue;
            }
            let Some(values) = self.feed.latest_values(id) else {
                continue;
            };
            for (acc, v) in sum.iter_mut().zip(values) {
                *acc += f64::from(v);
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(ForceSample::new(sum[0] / n, sum[1] / n, sum[2] / n))
    }
}

impl fmt::Debug for ForceAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForceAggregator")
            .field("sensors", &self.sensors)
            .finish_non_exhaustive()
    }
}
