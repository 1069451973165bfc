//! 状态与故障报告解析
//!
//! 状态寄存器和故障寄存器每轴各占 1 字节：
//! - 状态字节是枚举值；
//! - 故障字节是位域（Bit 0 对应最低位，bilge 默认 LSB first，与设备一致）。

use crate::constants::HAND_DOF;
use crate::dof::Finger;
use bilge::prelude::*;

/// 单轴运动状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::FromPrimitive)]
#[repr(u8)]
pub enum FingerStatus {
    /// 正在松开
    Releasing = 0,
    /// 正在抓取
    Grasping = 1,
    /// 到达目标位置停止
    PositionReached = 2,
    /// 到达力控阈值停止
    ForceReached = 3,
    /// 电流保护停止
    CurrentProtection = 5,
    /// 电缸堵转停止
    LockedRotor = 6,
    /// 电缸故障停止
    Fault = 7,
    /// 未定义的状态码
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl FingerStatus {
    /// 原始状态码
    pub fn code(self) -> u8 {
        match self {
            FingerStatus::Releasing => 0,
            FingerStatus::Grasping => 1,
            FingerStatus::PositionReached => 2,
            FingerStatus::ForceReached => 3,
            FingerStatus::CurrentProtection => 5,
            FingerStatus::LockedRotor => 6,
            FingerStatus::Fault => 7,
            FingerStatus::Unknown(code) => code,
        }
    }

    /// 是否处于运动中
    pub fn is_moving(self) -> bool {
        matches!(self, FingerStatus::Releasing | FingerStatus::Grasping)
    }

    /// 是否因保护或故障而停止
    pub fn is_fault(self) -> bool {
        matches!(
            self,
            FingerStatus::CurrentProtection | FingerStatus::LockedRotor | FingerStatus::Fault
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            FingerStatus::Releasing => "releasing",
            FingerStatus::Grasping => "grasping",
            FingerStatus::PositionReached => "position reached",
            FingerStatus::ForceReached => "force limit reached",
            FingerStatus::CurrentProtection => "stopped by current protection",
            FingerStatus::LockedRotor => "stopped by locked rotor",
            FingerStatus::Fault => "stopped by actuator fault",
            FingerStatus::Unknown(_) => "unknown",
        }
    }
}

/// 单轴故障位域
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct FingerErrorFlags {
    pub locked_rotor: bool,        // Bit 0: 堵转
    pub over_temperature: bool,    // Bit 1: 过温
    pub over_current: bool,        // Bit 2: 过流
    pub motor_fault: bool,         // Bit 3: 电机异常
    pub communication_error: bool, // Bit 4: 通信异常
    pub reserved: u3,              // Bit 5-7: 保留
}

impl FingerErrorFlags {
    /// 从原始字节解析
    pub fn from_byte(byte: u8) -> Self {
        Self::from(u8::new(byte))
    }

    /// 任意故障位被置位（保留位不计）
    pub fn any(&self) -> bool {
        self.locked_rotor()
            || self.over_temperature()
            || self.over_current()
            || self.motor_fault()
            || self.communication_error()
    }
}

/// 6 轴状态报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandStatusReport(pub [FingerStatus; HAND_DOF]);

impl HandStatusReport {
    pub fn from_bytes(bytes: [u8; HAND_DOF]) -> Self {
        Self(bytes.map(FingerStatus::from))
    }

    pub fn finger(&self, finger: Finger) -> FingerStatus {
        self.0[finger.index()]
    }

    /// 任意轴处于保护或故障停止状态
    pub fn has_fault(&self) -> bool {
        self.0.iter().any(|s| s.is_fault())
    }

    pub fn codes(&self) -> [u8; HAND_DOF] {
        self.0.map(FingerStatus::code)
    }
}

/// 6 轴故障报告
#[derive(Debug, Clone, Copy)]
pub struct HandErrorReport(pub [FingerErrorFlags; HAND_DOF]);

impl HandErrorReport {
    pub fn from_bytes(bytes: [u8; HAND_DOF]) -> Self {
        Self(bytes.map(FingerErrorFlags::from_byte))
    }

    pub fn finger(&self, finger: Finger) -> FingerErrorFlags {
        self.0[finger.index()]
    }

    pub fn has_fault(&self) -> bool {
        self.0.iter().any(|f| f.any())
    }

    /// 原始字节
    pub fn bytes(&self) -> [u8; HAND_DOF] {
        self.0.map(|f| u8::from(f).value())
    }
}
