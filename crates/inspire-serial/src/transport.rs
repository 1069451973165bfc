//! 请求/响应事务
//!
//! 串口是半双工的请求-应答链路，同一时刻只能有一个请求在途。
//! `HandTransport` 用一把互斥锁串行化所有操作。

use crate::{SerialAdapter, TransportError};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// 默认 I/O 超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

pub struct HandTransport<A: SerialAdapter> {
    adapter: Mutex<A>,
    timeout: Duration,
}

impl<A: SerialAdapter> HandTransport<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_timeout(adapter, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(adapter: A, timeout: Duration) -> Self {
        Self {
            adapter: Mutex::new(adapter),
            timeout,
        }
    }

    /// 默认事务超时
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn open(&self) -> Result<(), TransportError> {
        self.adapter.lock().open()
    }

    pub fn close(&self) {
        self.adapter.lock().close()
    }

    pub fn is_open(&self) -> bool {
        self.adapter.lock().is_open()
    }

    /// 在持锁状态下访问底层适配器
    pub fn with_adapter<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut self.adapter.lock())
    }

    /// 严格事务：清空残留输入、写出请求、读取 `expected_len` 字节
    ///
    /// 第一次读取不足时再做一次有界补读。仍不足时：
    /// - 一个字节都没收到 → `TransportError::Timeout`
    /// - 收到部分字节 → `TransportError::ShortRead`（携带已收到的字节）
    pub fn transact(
        &self,
        frame: &[u8],
        expected_len: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let mut adapter = self.adapter.lock();
        if !adapter.is_open() {
            return Err(TransportError::NotOpen);
        }

        adapter.clear_input()?;
        adapter.write_all(frame)?;
        trace!("TX {:02X?}", frame);

        let mut buf = vec![0u8; expected_len];
        let mut filled = fill(&mut *adapter, &mut buf, 0, timeout)?;
        if filled < expected_len {
            trace!(
                "Partial response ({}/{} bytes), reading remainder",
                filled, expected_len
            );
            filled = fill(&mut *adapter, &mut buf, filled, timeout)?;
        }
        trace!("RX {:02X?}", &buf[..filled]);

        if filled == expected_len {
            Ok(buf)
        } else if filled == 0 {
            Err(TransportError::Timeout)
        } else {
            buf.truncate(filled);
            Err(TransportError::ShortRead {
                expected: expected_len,
                received: buf,
            })
        }
    }

    /// 宽松事务（fail-soft）
    ///
    /// - 截断响应：返回已收到的部分字节（解码时缺失的轴按 0 处理）
    /// - 其他任何错误：返回 `expected_len` 个 0
    ///
    /// 永不失败，每次降级都会记录 `warn!`。
    pub fn write_then_read(&self, frame: &[u8], expected_len: usize, timeout: Duration) -> Vec<u8> {
        match self.transact(frame, expected_len, timeout) {
            Ok(response) => response,
            Err(TransportError::ShortRead { expected, received }) => {
                warn!(
                    "Short response: expected {} bytes, received {}",
                    expected,
                    received.len()
                );
                received
            },
            Err(e) => {
                warn!("Transport error, substituting zero-filled response: {}", e);
                vec![0u8; expected_len]
            },
        }
    }
}

/// 从 `start` 开始填充 `buf`，直到填满、适配器超时返回 0 或到达截止时间
fn fill<A: SerialAdapter + ?Sized>(
    adapter: &mut A,
    buf: &mut [u8],
    start: usize,
    timeout: Duration,
) -> Result<usize, TransportError> {
    let deadline = Instant::now() + timeout;
    let mut filled = start;
    while filled < buf.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let n = adapter.read_timeout(&mut buf[filled..], remaining)?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
