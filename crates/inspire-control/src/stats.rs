//! 滑动窗口统计

use crate::force::ForceSample;
use std::collections::VecDeque;

/// 固定容量的滑动窗口，满时丢弃最旧的样本
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// 总体标准差（除以 n）
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self
            .samples
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.samples.len() as f64;
        Some(variance.sqrt())
    }
}

/// 三轴力历史
#[derive(Debug, Clone)]
pub struct ForceHistory {
    x: RollingWindow,
    y: RollingWindow,
    z: RollingWindow,
}

impl ForceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            x: RollingWindow::new(capacity),
            y: RollingWindow::new(capacity),
            z: RollingWindow::new(capacity),
        }
    }

    pub fn push(&mut self, sample: ForceSample) {
        self.x.push(sample.x);
        self.y.push(sample.y);
        self.z.push(sample.z);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.x.is_full()
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
    }

    /// 三轴标准差；窗口为空时为 `None`
    pub fn std_devs(&self) -> Option<[f64; 3]> {
        Some([self.x.std_dev()?, self.y.std_dev()?, self.z.std_dev()?])
    }
}
