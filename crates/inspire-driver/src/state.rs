//! 最近一次成功写入的设定值
//!
//! 写操作成功后更新快照，读取方通过 `ArcSwap::load` 无锁获取，
//! 控制循环用它避免多余的串口读取。

use inspire_protocol::{DofVector, Finger, SENTINEL};
use std::time::Instant;

/// 设定值快照
///
/// 未写过的量为 `None`。含哨兵的写入会与旧值合并：哨兵轴保留旧值。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandSnapshot {
    pub angle_target: Option<DofVector>,
    pub speed: Option<DofVector>,
    pub force_limit: Option<DofVector>,
    /// 最近一次更新的时间
    pub updated_at: Option<Instant>,
}

impl HandSnapshot {
    pub(crate) fn with_angle_target(&self, values: DofVector) -> Self {
        Self {
            angle_target: Some(merge(self.angle_target, values)),
            updated_at: Some(Instant::now()),
            ..self.clone()
        }
    }

    pub(crate) fn with_speed(&self, values: DofVector) -> Self {
        Self {
            speed: Some(merge(self.speed, values)),
            updated_at: Some(Instant::now()),
            ..self.clone()
        }
    }

    pub(crate) fn with_force_limit(&self, values: DofVector) -> Self {
        Self {
            force_limit: Some(merge(self.force_limit, values)),
            updated_at: Some(Instant::now()),
            ..self.clone()
        }
    }

    /// 某根手指的已知目标角度（未知或哨兵时为 `None`）
    pub fn target_of(&self, finger: Finger) -> Option<i32> {
        self.angle_target
            .map(|t| t[finger])
            .filter(|&v| v != SENTINEL)
    }
}

fn merge(previous: Option<DofVector>, update: DofVector) -> DofVector {
    match previous {
        None => update,
        Some(mut merged) => {
            for finger in Finger::ALL {
                if !update.is_unchanged(finger) {
                    merged[finger.index()] = update[finger];
                }
            }
            merged
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_sentinel_axes() {
        let snapshot = HandSnapshot::default().with_angle_target(DofVector::splat(800));
        let snapshot =
            snapshot.with_angle_target(DofVector::new([1000, 1000, 1000, 1000, -1, -1]));
        assert_eq!(
            snapshot.angle_target,
            Some(DofVector::new([1000, 1000, 1000, 1000, 800, 800]))
        );
        assert!(snapshot.updated_at.is_some());
        assert_eq!(snapshot.speed, None);
    }

    #[test]
    fn test_first_write_with_sentinel() {
        let snapshot = HandSnapshot::default().with_force_limit(DofVector::new([-1, 1, 2, 3, 4, 5]));
        assert_eq!(snapshot.force_limit.unwrap()[0], -1);
        let snapshot = snapshot.with_angle_target(DofVector::new([-1, 10, 10, 10, 10, 10]));
        assert_eq!(snapshot.target_of(Finger::Little), None);
        assert_eq!(snapshot.target_of(Finger::Ring), Some(10));
    }
}
