//! 模拟灵巧手
//!
//! 以字节寻址的寄存器表模拟设备：解析请求帧，按地址读写寄存器并回复应答帧。
//! 用于测试和无硬件演示。
//!
//! `SimulatedHand` 可以克隆，所有克隆共享同一份设备状态：一份交给传输层，
//! 另一份留在测试中用于注入故障和检查写入记录。

use crate::{SerialAdapter, TransportError};
use inspire_protocol::{
    Command, DofVector, HAND_DOF, HandFrame, Register, SENTINEL_BYTES, decode_word, encode_raw,
    encode_word,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 寄存器表大小（覆盖全部已知地址）
const REGISTER_SPACE: usize = 0x0700;

/// 力传感器校准应答的数据区长度
const CALIBRATION_DATA_LEN: usize = 10;

/// 单次事务的故障注入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimFault {
    /// 只返回前 n 个字节
    Truncate(usize),
    /// 不应答
    Silent,
    /// 写入时返回 I/O 错误
    IoError,
    /// 应答的校验和错误
    CorruptChecksum,
}

#[derive(Debug)]
struct SimState {
    device_id: u8,
    open: bool,
    registers: Vec<u8>,
    pending: VecDeque<u8>,
    faults: VecDeque<SimFault>,
    requests: Vec<HandFrame>,
    clears: usize,
}

/// 模拟灵巧手
#[derive(Debug, Clone)]
pub struct SimulatedHand {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedHand {
    fn default() -> Self {
        Self::new(inspire_protocol::DEFAULT_HAND_ID)
    }
}

impl SimulatedHand {
    /// 创建模拟设备，初始角度 1000、速度 1000、力控阈值 1000
    pub fn new(device_id: u8) -> Self {
        let sim = Self {
            state: Arc::new(Mutex::new(SimState {
                device_id,
                open: false,
                registers: vec![0; REGISTER_SPACE],
                pending: VecDeque::new(),
                faults: VecDeque::new(),
                requests: Vec::new(),
                clears: 0,
            })),
        };
        let full = DofVector::splat(1000);
        sim.poke(Register::AngleTarget, full);
        sim.poke(Register::AngleActual, full);
        sim.poke(Register::Speed, full);
        sim.poke(Register::ForceLimit, full);
        sim
    }

    /// 排队一次故障，作用于下一次事务
    pub fn inject_fault(&self, fault: SimFault) {
        self.state.lock().faults.push_back(fault);
    }

    /// 直接写入多自由度寄存器（不经过协议）
    pub fn poke(&self, register: Register, values: DofVector) {
        let mut state = self.state.lock();
        let base = register.address() as usize;
        for (i, &v) in values.iter().enumerate() {
            let [lo, hi] = encode_word(v);
            state.registers[base + i * 2] = lo;
            state.registers[base + i * 2 + 1] = hi;
        }
    }

    /// 直接写入单字节报告寄存器（状态/错误/温度）
    pub fn poke_bytes(&self, register: Register, bytes: [u8; HAND_DOF]) {
        let mut state = self.state.lock();
        let base = register.address() as usize;
        state.registers[base..base + HAND_DOF].copy_from_slice(&bytes);
    }

    /// 读取多自由度寄存器
    pub fn peek(&self, register: Register) -> DofVector {
        let state = self.state.lock();
        let base = register.address() as usize;
        let mut values = [0; HAND_DOF];
        for (i, v) in values.iter_mut().enumerate() {
            *v = decode_word(state.registers[base + i * 2], state.registers[base + i * 2 + 1]);
        }
        DofVector(values)
    }

    pub fn peek_bytes(&self, register: Register) -> [u8; HAND_DOF] {
        let state = self.state.lock();
        let base = register.address() as usize;
        let mut bytes = [0; HAND_DOF];
        bytes.copy_from_slice(&state.registers[base..base + HAND_DOF]);
        bytes
    }

    /// 收到的全部请求帧
    pub fn requests(&self) -> Vec<HandFrame> {
        self.state.lock().requests.clone()
    }

    /// 写入某个寄存器的请求负载（按时间顺序）
    pub fn writes_to(&self, register: Register) -> Vec<Vec<i32>> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|f| f.command == u8::from(Command::Write) && f.address == register.address())
            .map(|f| f.words().to_vec())
            .collect()
    }

    /// 清空请求记录
    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    /// clear_input 被调用的次数
    pub fn input_clears(&self) -> usize {
        self.state.lock().clears
    }
}

impl SimState {
    fn handle(&mut self, request: &[u8]) -> Result<(), TransportError> {
        let fault = self.faults.pop_front();
        if fault == Some(SimFault::IoError) {
            return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "simulated I/O error").into());
        }

        let Ok(frame) = HandFrame::parse(request) else {
            debug!("Simulated hand ignored malformed request {:02X?}", request);
            return Ok(());
        };
        self.requests.push(frame.clone());

        if frame.device_id != self.device_id {
            return Ok(());
        }

        let mut response = match frame.command() {
            Ok(Command::Read) => self.read(&frame),
            Ok(Command::Write) => self.write(&frame),
            Err(_) => return Ok(()),
        }
        .to_vec();

        match fault {
            Some(SimFault::Truncate(n)) => response.truncate(n),
            Some(SimFault::Silent) => response.clear(),
            Some(SimFault::CorruptChecksum) => {
                if let Some(last) = response.last_mut() {
                    *last = last.wrapping_add(1);
                }
            },
            _ => {},
        }
        self.pending.extend(response);
        Ok(())
    }

    fn read(&self, frame: &HandFrame) -> bytes::Bytes {
        let count = frame.words().first().copied().unwrap_or(0).max(0) as usize;
        let base = frame.address as usize;
        let end = (base + count).min(REGISTER_SPACE);
        let data = self.registers.get(base..end).unwrap_or(&[]);
        encode_raw(self.device_id, Command::Read.into(), frame.address, data)
    }

    fn write(&mut self, frame: &HandFrame) -> bytes::Bytes {
        let address = frame.address;
        match Register::try_from(address) {
            Ok(Register::ClearError) => {
                let base = Register::Error.address() as usize;
                self.registers[base..base + HAND_DOF].fill(0);
            },
            Ok(Register::ForceCalibration) => {
                return encode_raw(
                    self.device_id,
                    Command::Write.into(),
                    address,
                    &[0u8; CALIBRATION_DATA_LEN],
                );
            },
            Ok(Register::SaveParameters) => {},
            _ => {
                let base = address as usize;
                for (i, pair) in frame.data.chunks_exact(2).enumerate() {
                    // 哨兵：保持不变
                    if pair == SENTINEL_BYTES {
                        continue;
                    }
                    let at = base + i * 2;
                    if at + 1 < REGISTER_SPACE {
                        self.registers[at] = pair[0];
                        self.registers[at + 1] = pair[1];
                    }
                }
                // 目标角度立即到位
                if address == Register::AngleTarget.address() {
                    let target = Register::AngleTarget.address() as usize;
                    let actual = Register::AngleActual.address() as usize;
                    self.registers.copy_within(target..target + HAND_DOF * 2, actual);
                }
            },
        }
        encode_raw(self.device_id, Command::Write.into(), address, &[0x01])
    }
}

impl SerialAdapter for SimulatedHand {
    fn open(&mut self) -> Result<(), TransportError> {
        self.state.lock().open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.state.lock().open = false;
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }

    fn clear_input(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.pending.clear();
        state.clears += 1;
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        state.handle(data)
    }

    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        let n = buf.len().min(state.pending.len());
        for (slot, byte) in buf.iter_mut().zip(state.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
