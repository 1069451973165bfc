//! 帧编码与解码
//!
//! 帧格式：
//!
//! ```text
//! EB 90 | ID | LEN | CMD | ADDR_L ADDR_H | DATA... | SUM
//! ```
//!
//! - `LEN` = 命令(1) + 地址(2) + 数据字节数
//! - `SUM` = 从 ID 开始到最后一个数据字节的累加和（取低 8 位）
//! - 多字节数值一律低字节在前
//!
//! 解码提供两条路径：
//! - **宽松路径**（`decode_dof_vector` / `decode_byte_report`）：永不失败，
//!   长度不足的部分按 0 处理，不校验校验和，供实时控制循环使用；
//! - **严格路径**（`HandFrame::parse` / `try_decode_*`）：校验帧头、长度字段和校验和，
//!   返回 `ProtocolError`。

use crate::constants::{
    CHECKSUM_START, FRAME_HEADER, FRAME_OVERHEAD, HAND_DOF, LENGTH_FIELD_BASE, PAYLOAD_OFFSET,
};
use crate::dof::{DofVector, decode_word, encode_word};
use crate::registers::{Command, Register};
use crate::ProtocolError;
use bytes::{BufMut, Bytes, BytesMut};
use smallvec::SmallVec;

/// 计算校验和：`bytes[2..]` 累加，取低 8 位
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .skip(CHECKSUM_START)
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// 校验一整帧（最后一个字节为校验和）
pub fn verify_checksum(frame: &[u8]) -> Result<(), ProtocolError> {
    let Some((&actual, body)) = frame.split_last() else {
        return Err(ProtocolError::InvalidLength {
            expected: FRAME_OVERHEAD + LENGTH_FIELD_BASE,
            actual: 0,
        });
    };
    let expected = checksum(body);
    if expected != actual {
        return Err(ProtocolError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

/// 以原始数据字节编码一帧
///
/// 数据区长度受 `LEN` 字节限制（≤ 252），本协议最长数据为 12 字节。
pub fn encode_raw(device_id: u8, command: u8, address: u16, data: &[u8]) -> Bytes {
    debug_assert!(data.len() + LENGTH_FIELD_BASE <= u8::MAX as usize);

    let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + LENGTH_FIELD_BASE + data.len());
    buf.put_slice(&FRAME_HEADER);
    buf.put_u8(device_id);
    buf.put_u8((LENGTH_FIELD_BASE + data.len()) as u8);
    buf.put_u8(command);
    buf.put_u16_le(address);
    buf.put_slice(data);
    let sum = checksum(&buf);
    buf.put_u8(sum);
    buf.freeze()
}

/// 构建请求帧
///
/// 每个负载值编码为 2 字节（低字节在前），`-1` 编码为 `0xFF 0xFF`。
/// 相同输入总是得到相同字节。
pub fn build_frame(device_id: u8, command: Command, address: u16, payload: &[i32]) -> Bytes {
    let data: SmallVec<[u8; HAND_DOF * 2]> =
        payload.iter().flat_map(|&value| encode_word(value)).collect();
    encode_raw(device_id, command.into(), address, &data)
}

/// 宽松解码 6 轴数值
///
/// 从 `offset` 开始每轴读取 2 字节（低字节在前）。响应长度不足 `offset + 12`
/// 时返回全 0 向量，不会失败。设备在线路噪声下偶尔返回截断帧，
/// 控制循环依赖这一点保持运行。
pub fn decode_dof_vector(response: &[u8], offset: usize) -> DofVector {
    let Some(data) = offset
        .checked_add(HAND_DOF * 2)
        .and_then(|end| response.get(offset..end))
    else {
        return DofVector::ZERO;
    };

    let mut values = [0; HAND_DOF];
    for (value, pair) in values.iter_mut().zip(data.chunks_exact(2)) {
        *value = decode_word(pair[0], pair[1]);
    }
    DofVector(values)
}

/// 宽松解码 6 轴单字节报告（状态/错误/温度）
///
/// 缺失的字节按 0 处理。
pub fn decode_byte_report(response: &[u8], offset: usize) -> [u8; HAND_DOF] {
    let mut report = [0u8; HAND_DOF];
    for (i, byte) in report.iter_mut().enumerate() {
        *byte = offset
            .checked_add(i)
            .and_then(|idx| response.get(idx))
            .copied()
            .unwrap_or(0);
    }
    report
}

/// 严格解码多自由度响应
pub fn try_decode_dof_vector(response: &[u8]) -> Result<DofVector, ProtocolError> {
    let frame = HandFrame::parse(response)?;
    if frame.data.len() < HAND_DOF * 2 {
        return Err(ProtocolError::InvalidLength {
            expected: PAYLOAD_OFFSET + HAND_DOF * 2 + 1,
            actual: response.len(),
        });
    }
    Ok(decode_dof_vector(&frame.data, 0))
}

/// 严格解码单字节报告响应
pub fn try_decode_byte_report(response: &[u8]) -> Result<[u8; HAND_DOF], ProtocolError> {
    let frame = HandFrame::parse(response)?;
    if frame.data.len() < HAND_DOF {
        return Err(ProtocolError::InvalidLength {
            expected: PAYLOAD_OFFSET + HAND_DOF + 1,
            actual: response.len(),
        });
    }
    Ok(decode_byte_report(&frame.data, 0))
}

/// 已解析的帧（请求或响应）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandFrame {
    pub device_id: u8,
    /// 原始命令字（设备响应中原样回显）
    pub command: u8,
    pub address: u16,
    /// 数据区（不含校验和）
    pub data: Bytes,
}

impl HandFrame {
    /// 构造读请求帧
    ///
    /// 负载为要读取的字节数（以 2 字节字编码）。
    pub fn read_request(device_id: u8, register: Register, byte_count: i32) -> Bytes {
        build_frame(device_id, Command::Read, register.address(), &[byte_count])
    }

    /// 构造写请求帧
    pub fn write_request(device_id: u8, register: Register, values: &[i32]) -> Bytes {
        build_frame(device_id, Command::Write, register.address(), values)
    }

    /// 严格解析：校验帧头、长度字段与校验和
    ///
    /// 输入末尾多余的字节会被忽略。
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let min_len = FRAME_OVERHEAD + LENGTH_FIELD_BASE;
        if bytes.len() < min_len {
            return Err(ProtocolError::InvalidLength {
                expected: min_len,
                actual: bytes.len(),
            });
        }

        if bytes[..2] != FRAME_HEADER {
            return Err(ProtocolError::InvalidHeader {
                found: [bytes[0], bytes[1]],
            });
        }

        let declared = bytes[3] as usize;
        if declared < LENGTH_FIELD_BASE {
            return Err(ProtocolError::InvalidLengthField { declared });
        }

        let total = declared + FRAME_OVERHEAD;
        if bytes.len() < total {
            return Err(ProtocolError::InvalidLength {
                expected: total,
                actual: bytes.len(),
            });
        }

        let frame = &bytes[..total];
        verify_checksum(frame)?;

        Ok(Self {
            device_id: frame[2],
            command: frame[4],
            address: u16::from_le_bytes([frame[5], frame[6]]),
            data: Bytes::copy_from_slice(&frame[PAYLOAD_OFFSET..total - 1]),
        })
    }

    /// 解析命令字
    pub fn command(&self) -> Result<Command, ProtocolError> {
        Command::try_from(self.command).map_err(|_| ProtocolError::InvalidCommand(self.command))
    }

    /// 已知寄存器（未知地址返回 `None`）
    pub fn register(&self) -> Option<Register> {
        Register::try_from(self.address).ok()
    }

    /// 将数据区按 2 字节字解码（奇数长度时忽略最后一个字节）
    pub fn words(&self) -> SmallVec<[i32; HAND_DOF]> {
        self.data
            .chunks_exact(2)
            .map(|pair| decode_word(pair[0], pair[1]))
            .collect()
    }

    /// 重新编码
    pub fn encode(&self) -> Bytes {
        encode_raw(self.device_id, self.command, self.address, &self.data)
    }
}
