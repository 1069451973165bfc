//! 灵巧手驱动
//!
//! 所有操作都是一次"请求-应答"事务，由传输层的互斥锁串行化。
//!
//! # 失败语义
//!
//! - 参数错误：在任何 I/O 之前返回 `DriverError::Validation`
//! - 线路错误（超时、截断、I/O 异常）：传输层降级为全 0/部分响应，
//!   解码后缺失的轴为 0。这是正常的"降级但存活"响应，不会报错
//! - 写操作没有收到应答时同样返回 `Ok`，但 [`HandSnapshot`] 不更新，
//!   快照只记录设备确认过的命令
//! - 严格模式（`strict_checksum`）：响应帧头、长度或校验和不合法时返回
//!   `DriverError::Protocol`，调用方可以选择忽略并继续

use crate::config::HandConfig;
use crate::state::HandSnapshot;
use crate::DriverError;
use arc_swap::ArcSwap;
use inspire_protocol::{
    BYTE_REPORT_READ_BYTES, BYTE_REPORT_RESPONSE_LEN, CALIBRATION_RESPONSE_LEN, DOF_VALUE_MAX,
    DofVector, FRAME_HEADER, Finger, HAND_DOF, HandErrorReport, HandFrame, HandStatusReport,
    MULTI_DOF_READ_BYTES, MULTI_DOF_RESPONSE_LEN, PAYLOAD_OFFSET, Register, SENTINEL,
    WRITE_ACK_LEN, decode_byte_report, decode_dof_vector, try_decode_byte_report,
    try_decode_dof_vector,
};
use inspire_serial::{HandTransport, SerialAdapter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 紧急释放的手指组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseGroup {
    /// 四指（小拇指 ~ 食指）
    FourFingers,
    /// 大拇指弯曲
    Thumb,
    /// 大拇指旋转
    ThumbFlip,
}

impl ReleaseGroup {
    pub const ALL: [ReleaseGroup; 3] = [
        ReleaseGroup::FourFingers,
        ReleaseGroup::Thumb,
        ReleaseGroup::ThumbFlip,
    ];

    /// 该组张开、其余轴保持不变的角度命令
    pub fn release_command(self) -> DofVector {
        let open = DOF_VALUE_MAX;
        match self {
            ReleaseGroup::FourFingers => Finger::FOUR_FINGERS
                .iter()
                .fold(DofVector::UNCHANGED, |v, &f| v.with(f, open)),
            ReleaseGroup::Thumb => DofVector::UNCHANGED.with(Finger::ThumbBend, open),
            ReleaseGroup::ThumbFlip => DofVector::UNCHANGED.with(Finger::ThumbRotate, open),
        }
    }

    /// 由三个互斥标志选择手指组，必须恰好一个为 true
    pub fn from_flags(four_finger: bool, thumb: bool, thumb_flip: bool) -> Result<Self, DriverError> {
        match (four_finger, thumb, thumb_flip) {
            (true, false, false) => Ok(ReleaseGroup::FourFingers),
            (false, true, false) => Ok(ReleaseGroup::Thumb),
            (false, false, true) => Ok(ReleaseGroup::ThumbFlip),
            _ => Err(DriverError::validation(
                "exactly one of four_finger, thumb, thumb_flip must be set",
            )),
        }
    }
}

/// Inspire 灵巧手
pub struct InspireHand<A: SerialAdapter> {
    transport: HandTransport<A>,
    config: HandConfig,
    snapshot: ArcSwap<HandSnapshot>,
}

impl<A: SerialAdapter> InspireHand<A> {
    /// 用给定适配器创建驱动（不会自动打开端口）
    pub fn new(adapter: A, config: HandConfig) -> Self {
        let transport = HandTransport::with_timeout(adapter, config.timeout());
        Self {
            transport,
            config,
            snapshot: ArcSwap::from_pointee(HandSnapshot::default()),
        }
    }

    pub fn config(&self) -> &HandConfig {
        &self.config
    }

    pub fn device_id(&self) -> u8 {
        self.config.hand_id
    }

    pub fn connect(&self) -> Result<(), DriverError> {
        self.transport.open()?;
        info!("Inspire hand {} connected on {}", self.config.hand_id, self.config.port);
        Ok(())
    }

    pub fn disconnect(&self) {
        self.transport.close();
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    /// 最近一次成功写入的设定值（无锁读取）
    pub fn snapshot(&self) -> Arc<HandSnapshot> {
        self.snapshot.load_full()
    }

    /// 在持锁状态下访问底层适配器
    pub fn with_adapter<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        self.transport.with_adapter(f)
    }

    // ------------------------------------------------------------------
    // 事务
    // ------------------------------------------------------------------

    fn exchange(&self, frame: &[u8], expected_len: usize) -> Vec<u8> {
        self.transport
            .write_then_read(frame, expected_len, self.transport.timeout())
    }

    /// 写寄存器，返回设备是否应答
    ///
    /// 降级响应（全 0 或空）不带帧头，视为未应答；宽松模式下仍返回 `Ok`。
    fn write_register(&self, register: Register, values: &[i32], ack_len: usize) -> Result<bool, DriverError> {
        let frame = HandFrame::write_request(self.config.hand_id, register, values);
        let response = self.exchange(&frame, ack_len);
        if self.config.strict_checksum {
            HandFrame::parse(&response)?;
        }
        let acked = response.starts_with(&FRAME_HEADER);
        if !acked {
            warn!("{:?} write not acknowledged, snapshot left unchanged", register);
        }
        Ok(acked)
    }

    fn read_dof(&self, register: Register) -> Result<DofVector, DriverError> {
        let frame = HandFrame::read_request(self.config.hand_id, register, MULTI_DOF_READ_BYTES);
        let response = self.exchange(&frame, MULTI_DOF_RESPONSE_LEN);
        if self.config.strict_checksum {
            return Ok(try_decode_dof_vector(&response)?);
        }
        if response.len() < MULTI_DOF_RESPONSE_LEN {
            warn!(
                "Short {:?} response ({} bytes), axes decode as 0",
                register,
                response.len()
            );
        }
        Ok(decode_dof_vector(&response, PAYLOAD_OFFSET))
    }

    fn read_bytes(&self, register: Register) -> Result<[u8; HAND_DOF], DriverError> {
        let frame = HandFrame::read_request(self.config.hand_id, register, BYTE_REPORT_READ_BYTES);
        let response = self.exchange(&frame, BYTE_REPORT_RESPONSE_LEN);
        if self.config.strict_checksum {
            return Ok(try_decode_byte_report(&response)?);
        }
        Ok(decode_byte_report(&response, PAYLOAD_OFFSET))
    }

    fn write_trigger(&self, register: Register, ack_len: usize) -> Result<(), DriverError> {
        self.write_register(register, &[1], ack_len).map(drop)
    }

    // ------------------------------------------------------------------
    // 角度
    // ------------------------------------------------------------------

    /// 设定 6 轴目标角度（-1 ~ 1000，-1 表示该轴保持不变）
    pub fn set_angles(&self, angles: &[i32]) -> Result<(), DriverError> {
        let angles = validated(angles, SENTINEL, DOF_VALUE_MAX)?;
        debug!("set_angles {}", angles);
        if self.write_register(Register::AngleTarget, angles.as_array(), WRITE_ACK_LEN)? {
            self.snapshot.rcu(|s| s.with_angle_target(angles));
        }
        Ok(())
    }

    /// 读取角度：`actual = true` 为实际角度，否则为目标角度
    pub fn get_angles(&self, actual: bool) -> Result<DofVector, DriverError> {
        let register = if actual {
            Register::AngleActual
        } else {
            Register::AngleTarget
        };
        self.read_dof(register)
    }

    /// 设定单根手指的目标角度（读-改-写）
    pub fn set_finger_angle(&self, finger: Finger, angle: i32) -> Result<(), DriverError> {
        let current = self.get_angles(false)?;
        self.set_angles(current.with(finger, angle).as_array())
    }

    /// 所有轴设定为同一角度
    pub fn set_all_angles(&self, angle: i32) -> Result<(), DriverError> {
        self.set_angles(DofVector::splat(angle).as_array())
    }

    /// 回到配置中的初始角度
    pub fn reset(&self) -> Result<(), DriverError> {
        let initial = self.config.initial_angle;
        self.set_angles(initial.as_array())
    }

    // ------------------------------------------------------------------
    // 速度 / 力
    // ------------------------------------------------------------------

    /// 设定 6 轴速度（0 ~ 1000）
    pub fn set_speed(&self, speed: &[i32]) -> Result<(), DriverError> {
        let speed = validated(speed, 0, DOF_VALUE_MAX)?;
        debug!("set_speed {}", speed);
        if self.write_register(Register::Speed, speed.as_array(), WRITE_ACK_LEN)? {
            self.snapshot.rcu(|s| s.with_speed(speed));
        }
        Ok(())
    }

    pub fn get_speed(&self) -> Result<DofVector, DriverError> {
        self.read_dof(Register::Speed)
    }

    pub fn set_finger_speed(&self, finger: Finger, speed: i32) -> Result<(), DriverError> {
        let current = self.get_speed()?;
        self.set_speed(current.with(finger, speed).as_array())
    }

    pub fn set_all_speeds(&self, speed: i32) -> Result<(), DriverError> {
        self.set_speed(DofVector::splat(speed).as_array())
    }

    /// 读取受力（有符号）
    pub fn get_force(&self) -> Result<DofVector, DriverError> {
        Ok(self.read_dof(Register::Force)?.to_signed())
    }

    /// 设定 6 轴力控阈值（0 ~ 1000）
    pub fn set_force_limit(&self, limit: &[i32]) -> Result<(), DriverError> {
        let limit = validated(limit, 0, DOF_VALUE_MAX)?;
        debug!("set_force_limit {}", limit);
        if self.write_register(Register::ForceLimit, limit.as_array(), WRITE_ACK_LEN)? {
            self.snapshot.rcu(|s| s.with_force_limit(limit));
        }
        Ok(())
    }

    pub fn get_force_limit(&self) -> Result<DofVector, DriverError> {
        self.read_dof(Register::ForceLimit)
    }

    pub fn set_finger_force_limit(&self, finger: Finger, limit: i32) -> Result<(), DriverError> {
        let current = self.get_force_limit()?;
        self.set_force_limit(current.with(finger, limit).as_array())
    }

    pub fn set_all_force_limits(&self, limit: i32) -> Result<(), DriverError> {
        self.set_force_limit(DofVector::splat(limit).as_array())
    }

    /// 任意轴受力超过其力控阈值
    pub fn exceeds_force_limit(&self) -> Result<bool, DriverError> {
        let force = self.get_force()?;
        let limit = self.get_force_limit()?;
        Ok(force.iter().zip(limit.iter()).any(|(f, l)| f > l))
    }

    /// 读取电流
    pub fn get_current(&self) -> Result<DofVector, DriverError> {
        self.read_dof(Register::Current)
    }

    // ------------------------------------------------------------------
    // 状态与故障
    // ------------------------------------------------------------------

    pub fn get_status(&self) -> Result<HandStatusReport, DriverError> {
        Ok(HandStatusReport::from_bytes(self.read_bytes(Register::Status)?))
    }

    pub fn get_error(&self) -> Result<HandErrorReport, DriverError> {
        Ok(HandErrorReport::from_bytes(self.read_bytes(Register::Error)?))
    }

    /// 读取温度（摄氏度）
    pub fn get_temperature(&self) -> Result<[u8; HAND_DOF], DriverError> {
        self.read_bytes(Register::Temperature)
    }

    /// 清除故障（操作员显式调用，控制循环不会自动清除）
    pub fn clear_error(&self) -> Result<(), DriverError> {
        info!("Clearing hand error flags");
        self.write_trigger(Register::ClearError, WRITE_ACK_LEN)
    }

    /// 参数保存到 Flash
    pub fn save_parameters(&self) -> Result<(), DriverError> {
        info!("Saving hand parameters to flash");
        self.write_trigger(Register::SaveParameters, WRITE_ACK_LEN)
    }

    /// 触发力传感器校准
    ///
    /// 设备端校准约需 15 秒，期间手指会运动。本调用只等待触发应答。
    pub fn calibrate_force(&self) -> Result<(), DriverError> {
        info!("Starting force sensor calibration");
        self.write_trigger(Register::ForceCalibration, CALIBRATION_RESPONSE_LEN)
    }

    // ------------------------------------------------------------------
    // 紧急释放
    // ------------------------------------------------------------------

    /// 紧急释放：恰好一个标志为 true，选中的组张开，其余轴保持不变
    pub fn emergency_release(&self, four_finger: bool, thumb: bool, thumb_flip: bool) -> Result<(), DriverError> {
        let group = ReleaseGroup::from_flags(four_finger, thumb, thumb_flip)?;
        self.release(group)
    }

    pub fn release(&self, group: ReleaseGroup) -> Result<(), DriverError> {
        warn!("Emergency release: {:?}", group);
        self.set_angles(group.release_command().as_array())
    }

    // ------------------------------------------------------------------
    // 夹爪模式
    // ------------------------------------------------------------------

    /// 将手当作二指夹爪：`0.0` 全闭，`1.0` 全开
    ///
    /// 每轴在 `binary_close` 与 `binary_open` 之间线性插值，大拇指旋转保持当前目标值。
    pub fn set_binary_angle(&self, opening: f64) -> Result<(), DriverError> {
        if !(0.0..=1.0).contains(&opening) {
            return Err(DriverError::validation(format!(
                "binary angle must be within [0.0, 1.0], got {opening}"
            )));
        }
        let mut angles = [0; HAND_DOF];
        for (i, angle) in angles.iter_mut().enumerate() {
            let close = self.config.binary_close[i] as f64;
            let open = self.config.binary_open[i] as f64;
            *angle = (close + (open - close) * opening) as i32;
        }
        let current = self.get_angles(false)?;
        angles[Finger::ThumbRotate.index()] = current[Finger::ThumbRotate];
        self.set_angles(&angles)
    }

    /// 当前夹爪开合度：食指与大拇指弯曲归一化位置的平均值
    pub fn binary_angle(&self) -> Result<f64, DriverError> {
        let actual = self.get_angles(true)?;
        let index = normalize(
            actual[Finger::Index],
            self.config.binary_close[Finger::Index],
            self.config.binary_open[Finger::Index],
        );
        let thumb = normalize(
            actual[Finger::ThumbBend],
            self.config.binary_close[Finger::ThumbBend],
            self.config.binary_open[Finger::ThumbBend],
        );
        Ok((index + thumb) / 2.0)
    }

    /// 事务超时
    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }
}

impl<A: SerialAdapter> Drop for InspireHand<A> {
    fn drop(&mut self) {
        self.transport.close();
    }
}

fn validated(values: &[i32], min: i32, max: i32) -> Result<DofVector, DriverError> {
    let dof = DofVector::from_slice(values).map_err(DriverError::validation)?;
    dof.validate_range(min, max).map_err(DriverError::validation)?;
    Ok(dof)
}

/// 把 `value` 从 `[close, open]` 线性映射到 `[0, 1]`，超出范围时截断
fn normalize(value: i32, close: i32, open: i32) -> f64 {
    if open == close {
        return 0.0;
    }
    let t = (value - close) as f64 / (open - close) as f64;
    t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspire_serial::mock::{SimFault, SimulatedHand};

    fn hand() -> (InspireHand<SimulatedHand>, SimulatedHand) {
        let sim = SimulatedHand::default();
        let config = HandConfig {
            timeout_ms: 20,
            ..HandConfig::default()
        };
        let hand = InspireHand::new(sim.clone(), config);
        hand.connect().unwrap();
        (hand, sim)
    }

    #[test]
    fn test_set_and_get_angles() {
        let (hand, sim) = hand();
        hand.set_angles(&[100, 200, 300, 400, 500, 600]).unwrap();
        assert_eq!(hand.get_angles(false).unwrap().0, [100, 200, 300, 400, 500, 600]);
        assert_eq!(hand.get_angles(true).unwrap().0, [100, 200, 300, 400, 500, 600]);
        assert_eq!(
            sim.writes_to(Register::AngleTarget),
            vec![vec![100, 200, 300, 400, 500, 600]]
        );
        assert_eq!(
            hand.snapshot().angle_target,
            Some(DofVector::new([100, 200, 300, 400, 500, 600]))
        );
    }

    #[test]
    fn test_set_angles_validation_happens_before_io() {
        let (hand, sim) = hand();
        assert!(matches!(hand.set_angles(&[1, 2, 3]), Err(DriverError::Validation(_))));
        assert!(matches!(
            hand.set_angles(&[0, 0, 0, 0, 0, 1001]),
            Err(DriverError::Validation(_))
        ));
        assert!(matches!(
            hand.set_angles(&[-2, 0, 0, 0, 0, 0]),
            Err(DriverError::Validation(_))
        ));
        assert!(sim.requests().is_empty());
        assert_eq!(hand.snapshot().angle_target, None);
    }

    #[test]
    fn test_speed_and_force_limit_ranges() {
        let (hand, _sim) = hand();
        assert!(hand.set_speed(&[-1, 0, 0, 0, 0, 0]).is_err());
        hand.set_speed(&[1000, 900, 800, 700, 600, 500]).unwrap();
        assert_eq!(hand.get_speed().unwrap().0, [1000, 900, 800, 700, 600, 500]);

        assert!(hand.set_force_limit(&[0, 0, 0, 0, 0, 1001]).is_err());
        hand.set_all_force_limits(300).unwrap();
        assert_eq!(hand.get_force_limit().unwrap(), DofVector::splat(300));
        assert_eq!(hand.snapshot().force_limit, Some(DofVector::splat(300)));
    }

    #[test]
    fn test_get_force_is_signed() {
        let (hand, sim) = hand();
        sim.poke(Register::Force, DofVector::new([0, 100, 65535 - 99, 32768, 5, 65000]));
        assert_eq!(hand.get_force().unwrap().0, [0, 100, -100, -32768, 5, -536]);
    }

    #[test]
    fn test_exceeds_force_limit() {
        let (hand, sim) = hand();
        hand.set_all_force_limits(500).unwrap();
        sim.poke(Register::Force, DofVector::splat(100));
        assert!(!hand.exceeds_force_limit().unwrap());
        sim.poke(Register::Force, DofVector::new([100, 100, 501, 100, 100, 100]));
        assert!(hand.exceeds_force_limit().unwrap());
    }

    #[test]
    fn test_emergency_release_groups() {
        let (hand, sim) = hand();
        hand.set_all_angles(0).unwrap();
        sim.clear_requests();

        hand.emergency_release(true, false, false).unwrap();
        hand.emergency_release(false, true, false).unwrap();
        hand.emergency_release(false, false, true).unwrap();
        assert_eq!(
            sim.writes_to(Register::AngleTarget),
            vec![
                vec![1000, 1000, 1000, 1000, -1, -1],
                vec![-1, -1, -1, -1, 1000, -1],
                vec![-1, -1, -1, -1, -1, 1000],
            ]
        );
        assert_eq!(sim.peek(Register::AngleTarget), DofVector::splat(1000));
    }

    #[test]
    fn test_emergency_release_requires_exactly_one_flag() {
        let (hand, sim) = hand();
        sim.clear_requests();
        for flags in [
            (false, false, false),
            (true, true, false),
            (true, false, true),
            (true, true, true),
        ] {
            assert!(matches!(
                hand.emergency_release(flags.0, flags.1, flags.2),
                Err(DriverError::Validation(_))
            ));
        }
        assert!(sim.requests().is_empty());
    }

    #[test]
    fn test_emergency_release_keeps_snapshot_of_other_axes() {
        let (hand, _sim) = hand();
        hand.set_all_angles(300).unwrap();
        hand.release(ReleaseGroup::Thumb).unwrap();
        assert_eq!(
            hand.snapshot().angle_target,
            Some(DofVector::new([300, 300, 300, 300, 1000, 300]))
        );
    }

    #[test]
    fn test_status_and_error_reports() {
        let (hand, sim) = hand();
        sim.poke_bytes(Register::Status, [2, 2, 3, 3, 6, 0]);
        sim.poke_bytes(Register::Error, [0, 0, 0, 0, 0b0000_0010, 0]);
        let status = hand.get_status().unwrap();
        assert_eq!(status.codes(), [2, 2, 3, 3, 6, 0]);
        assert!(status.has_fault());

        let error = hand.get_error().unwrap();
        assert!(error.finger(Finger::ThumbBend).over_temperature());

        hand.clear_error().unwrap();
        assert!(!hand.get_error().unwrap().has_fault());
        assert_eq!(sim.writes_to(Register::ClearError), vec![vec![1]]);
    }

    #[test]
    fn test_temperature_current_and_triggers() {
        let (hand, sim) = hand();
        sim.poke_bytes(Register::Temperature, [30, 31, 32, 33, 34, 35]);
        sim.poke(Register::Current, DofVector::new([10, 20, 30, 40, 50, 60]));
        assert_eq!(hand.get_temperature().unwrap(), [30, 31, 32, 33, 34, 35]);
        assert_eq!(hand.get_current().unwrap().0, [10, 20, 30, 40, 50, 60]);

        hand.save_parameters().unwrap();
        hand.calibrate_force().unwrap();
        assert_eq!(sim.writes_to(Register::SaveParameters), vec![vec![1]]);
        assert_eq!(sim.writes_to(Register::ForceCalibration), vec![vec![1]]);
    }

    #[test]
    fn test_fail_soft_reads() {
        let (hand, sim) = hand();
        hand.set_all_angles(700).unwrap();

        // 截断：全部轴为 0，不报错
        sim.inject_fault(SimFault::Truncate(12));
        assert_eq!(hand.get_angles(true).unwrap(), DofVector::ZERO);

        // 无应答
        sim.inject_fault(SimFault::Silent);
        assert_eq!(hand.get_angles(true).unwrap(), DofVector::ZERO);

        // I/O 错误
        sim.inject_fault(SimFault::IoError);
        assert_eq!(hand.get_status().unwrap().codes(), [0; 6]);

        // 写入失败也不报错
        sim.inject_fault(SimFault::IoError);
        assert!(hand.set_all_angles(600).is_ok());

        // 恢复后正常
        assert_eq!(hand.get_angles(true).unwrap(), DofVector::splat(700));
    }

    #[test]
    fn test_unacknowledged_write_keeps_snapshot() {
        let (hand, sim) = hand();
        hand.set_all_angles(700).unwrap();
        hand.set_all_speeds(500).unwrap();

        sim.inject_fault(SimFault::Silent);
        assert!(hand.set_all_angles(300).is_ok());
        assert_eq!(hand.snapshot().angle_target, Some(DofVector::splat(700)));

        sim.inject_fault(SimFault::IoError);
        assert!(hand.set_all_speeds(100).is_ok());
        assert_eq!(hand.snapshot().speed, Some(DofVector::splat(500)));

        sim.inject_fault(SimFault::Silent);
        assert!(hand.set_all_force_limits(100).is_ok());
        assert_eq!(hand.snapshot().force_limit, None);

        // 截断但带帧头的应答仍算设备已收到
        sim.inject_fault(SimFault::Truncate(4));
        hand.set_all_angles(400).unwrap();
        assert_eq!(hand.snapshot().angle_target, Some(DofVector::splat(400)));

        // 断开后的写入不会改写快照
        hand.disconnect();
        hand.set_all_angles(900).unwrap();
        assert_eq!(hand.snapshot().angle_target, Some(DofVector::splat(400)));
    }

    #[test]
    fn test_disconnected_hand_reads_zero() {
        let (hand, _sim) = hand();
        hand.disconnect();
        assert!(!hand.is_connected());
        assert_eq!(hand.get_angles(true).unwrap(), DofVector::ZERO);
    }

    #[test]
    fn test_strict_mode_reports_protocol_errors() {
        let sim = SimulatedHand::default();
        let config = HandConfig {
            timeout_ms: 20,
            strict_checksum: true,
            ..HandConfig::default()
        };
        let hand = InspireHand::new(sim.clone(), config);
        hand.connect().unwrap();

        assert_eq!(hand.get_angles(true).unwrap(), DofVector::splat(1000));

        sim.inject_fault(SimFault::CorruptChecksum);
        assert!(matches!(
            hand.get_angles(true),
            Err(DriverError::Protocol(inspire_protocol::ProtocolError::ChecksumMismatch { .. }))
        ));

        sim.inject_fault(SimFault::Silent);
        assert!(matches!(hand.set_all_angles(500), Err(DriverError::Protocol(_))));
    }

    #[test]
    fn test_per_finger_setters() {
        let (hand, _sim) = hand();
        hand.set_all_angles(500).unwrap();
        hand.set_finger_angle(Finger::Middle, 100).unwrap();
        assert_eq!(hand.get_angles(false).unwrap().0, [500, 500, 100, 500, 500, 500]);

        hand.set_all_speeds(1000).unwrap();
        hand.set_finger_speed(Finger::ThumbRotate, 50).unwrap();
        assert_eq!(hand.get_speed().unwrap()[Finger::ThumbRotate], 50);

        hand.set_finger_force_limit(Finger::Little, 10).unwrap();
        assert_eq!(hand.get_force_limit().unwrap()[Finger::Little], 10);
    }

    #[test]
    fn test_reset_to_initial_angle() {
        let (hand, sim) = hand();
        hand.set_all_angles(0).unwrap();
        hand.reset().unwrap();
        assert_eq!(sim.peek(Register::AngleTarget), crate::config::OPEN_POSE);
    }

    #[test]
    fn test_binary_angle() {
        let (hand, sim) = hand();
        hand.set_angles(&[500, 500, 500, 500, 500, 123]).unwrap();

        hand.set_binary_angle(0.0).unwrap();
        // 四指/大拇指弯曲到闭合位姿，大拇指旋转保持 123
        assert_eq!(sim.peek(Register::AngleTarget).0, [400, 400, 400, 400, 700, 123]);
        assert!(hand.binary_angle().unwrap().abs() < 1e-9);

        hand.set_binary_angle(1.0).unwrap();
        assert_eq!(sim.peek(Register::AngleTarget).0, [1000, 1000, 1000, 1000, 1000, 123]);
        assert!((hand.binary_angle().unwrap() - 1.0).abs() < 1e-9);

        hand.set_binary_angle(0.5).unwrap();
        assert_eq!(sim.peek(Register::AngleTarget).0, [700, 700, 700, 700, 850, 123]);
        assert!((hand.binary_angle().unwrap() - 0.5).abs() < 1e-9);

        assert!(matches!(hand.set_binary_angle(1.5), Err(DriverError::Validation(_))));
    }

    #[test]
    fn test_release_command_vectors() {
        assert_eq!(
            ReleaseGroup::FourFingers.release_command().0,
            [1000, 1000, 1000, 1000, -1, -1]
        );
        assert_eq!(ReleaseGroup::Thumb.release_command().0, [-1, -1, -1, -1, 1000, -1]);
        assert_eq!(ReleaseGroup::ThumbFlip.release_command().0, [-1, -1, -1, -1, -1, 1000]);
    }
}
