//! 多自由度向量
//!
//! 角度设定、角度实际值、速度、力控阈值、受力都以"每轴一个整数"的 6 元向量表示。

use crate::constants::{DOF_VALUE_MAX, HAND_DOF, SENTINEL, SENTINEL_BYTES};
use crate::ProtocolError;
use std::fmt;
use std::ops::{Index, IndexMut};

/// 自由度（轴）编号
///
/// 顺序与寄存器中的排列一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Finger {
    /// 小拇指
    Little = 0,
    /// 无名指
    Ring = 1,
    /// 中指
    Middle = 2,
    /// 食指
    Index = 3,
    /// 大拇指弯曲
    ThumbBend = 4,
    /// 大拇指旋转（翻转）
    ThumbRotate = 5,
}

impl Finger {
    /// 全部轴，按寄存器顺序
    pub const ALL: [Finger; HAND_DOF] = [
        Finger::Little,
        Finger::Ring,
        Finger::Middle,
        Finger::Index,
        Finger::ThumbBend,
        Finger::ThumbRotate,
    ];

    /// 四指（小拇指 ~ 食指）
    pub const FOUR_FINGERS: [Finger; 4] =
        [Finger::Little, Finger::Ring, Finger::Middle, Finger::Index];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// 从轴编号构造，超出范围返回 `None`
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < HAND_DOF {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}

/// 6 自由度整数向量
///
/// `-1` 是哨兵值，表示"该轴保持不变"。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DofVector(pub [i32; HAND_DOF]);

impl DofVector {
    /// 全部为 0
    pub const ZERO: DofVector = DofVector([0; HAND_DOF]);

    /// 全部为哨兵值（所有轴保持不变）
    pub const UNCHANGED: DofVector = DofVector([SENTINEL; HAND_DOF]);

    pub const fn new(values: [i32; HAND_DOF]) -> Self {
        Self(values)
    }

    /// 所有轴使用同一个值
    pub const fn splat(value: i32) -> Self {
        Self([value; HAND_DOF])
    }

    /// 从切片构造，长度必须为 6
    pub fn from_slice(values: &[i32]) -> Result<Self, ProtocolError> {
        let array: [i32; HAND_DOF] =
            values.try_into().map_err(|_| ProtocolError::InvalidDofCount {
                expected: HAND_DOF,
                actual: values.len(),
            })?;
        Ok(Self(array))
    }

    pub const fn as_array(&self) -> &[i32; HAND_DOF] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &i32> {
        self.0.iter()
    }

    /// 返回修改了单个轴的副本
    pub fn with(mut self, finger: Finger, value: i32) -> Self {
        self.0[finger.index()] = value;
        self
    }

    /// 该轴是否为哨兵值
    pub fn is_unchanged(&self, finger: Finger) -> bool {
        self.0[finger.index()] == SENTINEL
    }

    /// 校验每轴取值在 `[min, max]` 内
    pub fn validate_range(&self, min: i32, max: i32) -> Result<(), ProtocolError> {
        for (axis, &value) in self.0.iter().enumerate() {
            if value < min || value > max {
                return Err(ProtocolError::ValueOutOfRange {
                    axis,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// 校验为合法的"可带哨兵"设定值（-1 ~ 1000）
    pub fn validate_command(&self) -> Result<(), ProtocolError> {
        self.validate_range(SENTINEL, DOF_VALUE_MAX)
    }

    /// 将原始 16 位无符号值按补码解释为有符号值
    ///
    /// 受力寄存器为有符号数，`v > 32767` 时转换为 `v - 65536`。
    pub fn to_signed(self) -> Self {
        Self(self.0.map(|v| if v > i16::MAX as i32 { v - 65_536 } else { v }))
    }
}

impl From<[i32; HAND_DOF]> for DofVector {
    fn from(values: [i32; HAND_DOF]) -> Self {
        Self(values)
    }
}

impl From<DofVector> for [i32; HAND_DOF] {
    fn from(dof: DofVector) -> Self {
        dof.0
    }
}

impl Index<usize> for DofVector {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for DofVector {
    fn index_mut(&mut self, index: usize) -> &mut i32 {
        &mut self.0[index]
    }
}

impl Index<Finger> for DofVector {
    type Output = i32;

    fn index(&self, finger: Finger) -> &i32 {
        &self.0[finger.index()]
    }
}

impl fmt::Display for DofVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

/// 编码单个数值为两字节（低字节在前）
///
/// 哨兵值 `-1` 固定编码为 `0xFF 0xFF`。
pub fn encode_word(value: i32) -> [u8; 2] {
    if value == SENTINEL {
        return SENTINEL_BYTES;
    }
    [(value & 0xFF) as u8, ((value >> 8) & 0xFF) as u8]
}

/// 解码两字节（低字节在前）为数值
///
/// `0xFF 0xFF` 解码为哨兵值 `-1`。
pub fn decode_word(low: u8, high: u8) -> i32 {
    if [low, high] == SENTINEL_BYTES {
        return SENTINEL;
    }
    ((high as i32) << 8) | low as i32
}
