//! 内存中的力传感器数据中心
//!
//! 传感器板以文本行输出读数，例如 `sensor2: 0.125, -1.5, 3.0`。
//! [`SensorHub`] 解析这些行，按传感器保存最新值和样本计数，
//! 并作为 [`SensorFeed`] 供抓取状态机查询。

use crate::ControlError;
use crate::force::{SensorFeed, SensorId};
use parking_lot::Mutex;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::LazyLock;
use std::time::Instant;
use tracing::{debug, trace};

/// 单条解析后的传感器读数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub id: SensorId,
    pub values: [f32; 3],
}

#[derive(Debug, Clone, Copy)]
struct SensorRecord {
    latest: [f32; 3],
    count: u64,
    updated_at: Option<Instant>,
}

impl SensorRecord {
    const EMPTY: Self = Self {
        latest: [0.0; 3],
        count: 0,
        updated_at: None,
    };
}

#[derive(Debug, Default)]
pub struct SensorHub {
    sensors: Mutex<BTreeMap<SensorId, SensorRecord>>,
}

impl SensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先登记一个传感器（尚无数据）
    pub fn register(&self, id: SensorId) {
        self.sensors.lock().entry(id).or_insert(SensorRecord::EMPTY);
    }

    pub fn update(&self, id: SensorId, values: [f32; 3]) {
        let mut sensors = self.sensors.lock();
        let record = sensors.entry(id).or_insert_with(|| {
            debug!("New sensor discovered: {}", id);
            SensorRecord::EMPTY
        });
        record.latest = values;
        record.count += 1;
        record.updated_at = Some(Instant::now());
    }

    /// 解析一行文本并更新对应传感器
    pub fn ingest_line(&self, line: &str) -> Result<SensorReading, ControlError> {
        let reading =
            parse_sensor_line(line).ok_or_else(|| ControlError::SensorLine(line.trim().to_string()))?;
        trace!("sensor{}: {:?}", reading.id, reading.values);
        self.update(reading.id, reading.values);
        Ok(reading)
    }

    /// 逐行读取直到 EOF，返回成功解析的行数
    ///
    /// 无法解析的行被跳过；非 UTF-8 字节按替换字符处理，不会中断读取。
    pub fn ingest_reader<R: BufRead>(&self, mut reader: R) -> std::io::Result<usize> {
        let mut parsed = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(parsed);
            }
            let line = String::from_utf8_lossy(&buf);
            if self.ingest_line(&line).is_ok() {
                parsed += 1;
            }
        }
    }

    /// 清空数据；传感器仍保持已知，但 `has_data` 变为 false
    pub fn clear(&self, id: Option<SensorId>) {
        let mut sensors = self.sensors.lock();
        match id {
            Some(id) => {
                if let Some(record) = sensors.get_mut(&id) {
                    *record = SensorRecord::EMPTY;
                }
            },
            None => sensors.values_mut().for_each(|r| *r = SensorRecord::EMPTY),
        }
    }

    pub fn sensor_ids(&self) -> Vec<SensorId> {
        self.sensors.lock().keys().copied().collect()
    }

    pub fn sample_count(&self, id: SensorId) -> u64 {
        self.sensors.lock().get(&id).map_or(0, |r| r.count)
    }

    /// 最近一次更新的时刻
    pub fn last_update(&self, id: SensorId) -> Option<Instant> {
        self.sensors.lock().get(&id).and_then(|r| r.updated_at)
    }
}

impl SensorFeed for SensorHub {
    fn latest_values(&self, id: SensorId) -> Option<[f32; 3]> {
        self.sensors
            .lock()
            .get(&id)
            .filter(|r| r.count > 0)
            .map(|r| r.latest)
    }

    fn is_known(&self, id: SensorId) -> bool {
        self.sensors.lock().contains_key(&id)
    }
}

/// `sensor<id>: <x>, <y>, <z>`，冒号和逗号之后允许空白
static SENSOR_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"sensor(\d+):\s*([-+]?\d*\.?\d+),\s*([-+]?\d*\.?\d+),\s*([-+]?\d*\.?\d+)").ok()
});

/// 在一行文本中查找传感器读数
///
/// 匹配可以出现在行内任意位置（传感器板会在前面加时间戳等前缀）。
/// 数值形如 `-1`、`+.5`、`3.25`。
pub fn parse_sensor_line(line: &str) -> Option<SensorReading> {
    let caps = SENSOR_LINE.as_ref()?.captures(line)?;
    let id = caps[1].parse::<SensorId>().ok()?;
    let mut values = [0.0f32; 3];
    for (value, group) in values.iter_mut().zip(2..=4) {
        *value = caps[group].parse().ok()?;
    }
    Some(SensorReading { id, values })
}
