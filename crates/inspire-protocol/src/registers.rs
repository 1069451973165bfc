//! 命令字与寄存器地址定义
//!
//! 灵巧手所有功能都通过"读/写寄存器"完成，帧中携带命令字和 16 位寄存器地址。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 命令字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Command {
    /// 读寄存器
    Read = 0x11,
    /// 写寄存器
    Write = 0x12,
}

/// 寄存器地址
///
/// 多自由度寄存器每轴占 2 字节（小端），报告类寄存器每轴占 1 字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum Register {
    /// 清除错误（写 1）
    ClearError = 0x03EC,
    /// 参数保存到 Flash（写 1）
    SaveParameters = 0x03ED,
    /// 力传感器校准（写 1，设备端耗时约 15 秒）
    ForceCalibration = 0x03F1,
    /// 角度设定值
    AngleTarget = 0x05CE,
    /// 力控阈值
    ForceLimit = 0x05DA,
    /// 速度设定值
    Speed = 0x05F2,
    /// 角度实际值
    AngleActual = 0x060A,
    /// 受力实际值（有符号）
    Force = 0x062E,
    /// 电流实际值
    Current = 0x063A,
    /// 故障信息（每轴 1 字节位域）
    Error = 0x0646,
    /// 状态信息（每轴 1 字节）
    Status = 0x064C,
    /// 温度（每轴 1 字节，摄氏度）
    Temperature = 0x0652,
}

impl Register {
    /// 16 位寄存器地址
    pub const fn address(self) -> u16 {
        self as u16
    }

    /// 该寄存器的数据是否为每轴 1 字节的报告格式
    pub const fn is_byte_report(self) -> bool {
        matches!(self, Register::Error | Register::Status | Register::Temperature)
    }
}
