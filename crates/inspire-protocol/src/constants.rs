//! 协议常量定义
//!
//! 集中定义帧格式和寄存器读写相关的常量，避免在代码中散落"魔法数"。

/// 帧头（固定两字节）
pub const FRAME_HEADER: [u8; 2] = [0xEB, 0x90];

/// 灵巧手自由度数量（四指 + 大拇指弯曲 + 大拇指旋转）
pub const HAND_DOF: usize = 6;

/// 默认设备 ID
pub const DEFAULT_HAND_ID: u8 = 1;

/// 校验和起始偏移（从设备 ID 开始累加）
pub const CHECKSUM_START: usize = 2;

/// 帧固定开销：帧头(2) + ID(1) + 长度(1) + 校验和(1)
///
/// 长度字节覆盖 `命令(1) + 地址(2) + 数据(N)`，所以整帧长度 = 长度字节 + 5。
pub const FRAME_OVERHEAD: usize = 5;

/// 长度字节中命令和地址占用的部分
pub const LENGTH_FIELD_BASE: usize = 3;

/// 响应数据区起始偏移（帧头 + ID + 长度 + 命令 + 地址）
pub const PAYLOAD_OFFSET: usize = 7;

/// "保持不变"哨兵值
pub const SENTINEL: i32 = -1;

/// 哨兵值的线上编码
pub const SENTINEL_BYTES: [u8; 2] = [0xFF, 0xFF];

/// 角度/速度/力限制等多自由度数值的上限
pub const DOF_VALUE_MAX: i32 = 1000;

/// 多自由度读取的请求字节数（6 轴 × 2 字节）
pub const MULTI_DOF_READ_BYTES: i32 = 0x0C;

/// 状态/错误/温度等单字节报告的请求字节数（6 轴 × 1 字节）
pub const BYTE_REPORT_READ_BYTES: i32 = 0x06;

/// 多自由度读取的响应长度
pub const MULTI_DOF_RESPONSE_LEN: usize = 20;

/// 写入应答长度
pub const WRITE_ACK_LEN: usize = 9;

/// 单字节报告（错误/状态/温度）响应长度
pub const BYTE_REPORT_RESPONSE_LEN: usize = 14;

/// 力传感器校准应答长度
pub const CALIBRATION_RESPONSE_LEN: usize = 18;
