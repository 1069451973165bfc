//! 自适应抓取状态机
//!
//! 状态机本身不持有线程也不休眠：每次调用 [`GraspStateMachine::tick`] 推进一步，
//! 并通过 [`Tick::Continue`] 告诉调用方下一次 tick 前至少需要等待多久。
//! 时间由调用方传入，便于确定性测试。
//!
//! 每个 tick 内先采样力值，再下发至多一条手指命令。

use crate::ControlError;
use crate::actuator::{ActionExecutor, HandActuator};
use crate::config::GraspConfig;
use crate::events::{GraspEvent, GraspObserver};
use crate::force::{ForceAggregator, ForceSample, ForceThresholds};
use crate::stats::ForceHistory;
use inspire_driver::ReleaseGroup;
use inspire_protocol::{DOF_VALUE_MAX, DofVector};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 初始动作成功后留给手指就位的时间
pub const INITIAL_ACTION_SETTLE: Duration = Duration::from_millis(200);

/// 读不到可用的初始角度时使用的中位值
pub const FALLBACK_ANGLE: i32 = 500;

/// 开始报告标准差所需的最少样本数
const MIN_STD_SAMPLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum GraspState {
    Idle = 0,
    Initializing = 1,
    Closing = 2,
    Analyzing = 3,
    Releasing = 4,
    Completed = 5,
    Stopped = 6,
}

impl GraspState {
    pub fn name(self) -> &'static str {
        match self {
            GraspState::Idle => "idle",
            GraspState::Initializing => "initializing",
            GraspState::Closing => "closing",
            GraspState::Analyzing => "analyzing",
            GraspState::Releasing => "releasing",
            GraspState::Completed => "completed",
            GraspState::Stopped => "stopped",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GraspState::Completed | GraspState::Stopped)
    }

    /// 会话已开始且尚未结束
    pub fn is_active(self) -> bool {
        !matches!(self, GraspState::Idle) && !self.is_terminal()
    }
}

impl fmt::Display for GraspState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraspReason {
    /// 力值在观察窗口内保持稳定
    Stable,
    MaxIterations,
    UserStopped,
    EmergencyStop,
    /// 释放模式达到迭代上限时力值低于所有阈值
    ReleaseBalanced,
    /// 释放模式达到迭代上限时力值仍超过阈值
    ForceAboveThreshold,
}

impl GraspReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GraspReason::Stable => "stable",
            GraspReason::MaxIterations => "max iterations",
            GraspReason::UserStopped => "user stopped",
            GraspReason::EmergencyStop => "emergency stop",
            GraspReason::ReleaseBalanced => "release balanced",
            GraspReason::ForceAboveThreshold => "force above threshold",
        }
    }
}

impl fmt::Display for GraspReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraspOutcome {
    pub success: bool,
    pub reason: GraspReason,
}

impl GraspOutcome {
    pub fn message(&self) -> &'static str {
        self.reason.as_str()
    }
}

/// 一次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// 会话仍在进行；`pause` 为下一次 tick 前的最短等待
    Continue { pause: Option<Duration> },
    Finished(GraspOutcome),
}

impl Tick {
    const NEXT: Tick = Tick::Continue { pause: None };
}

/// 当前会话的可变数据
#[derive(Debug, Clone)]
pub struct GraspSession {
    iterations: u32,
    history: ForceHistory,
    stable_since: Option<Instant>,
    angles: DofVector,
    emergency: bool,
    started_at: Option<Instant>,
}

impl GraspSession {
    fn new(angles: DofVector, window: usize, started_at: Option<Instant>) -> Self {
        Self {
            iterations: 0,
            history: ForceHistory::new(window),
            stable_since: None,
            angles,
            emergency: false,
            started_at,
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// 最近一次成功下发的角度
    pub fn angles(&self) -> DofVector {
        self.angles
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// 分析阶段已收集的样本数
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Close,
    Open,
}

/// 单次抓取会话的状态机
pub struct GraspStateMachine<H: HandActuator + ?Sized> {
    config: GraspConfig,
    thresholds: ForceThresholds,
    hand: Arc<H>,
    force: ForceAggregator,
    observer: Arc<dyn GraspObserver>,
    executor: Option<Arc<dyn ActionExecutor>>,
    state: GraspState,
    session: GraspSession,
    outcome: Option<GraspOutcome>,
}

impl<H: HandActuator + ?Sized> GraspStateMachine<H> {
    /// 规范化并校验配置后创建状态机（处于 `Idle`）
    pub fn new(
        config: GraspConfig,
        hand: Arc<H>,
        force: ForceAggregator,
        observer: Arc<dyn GraspObserver>,
    ) -> Result<Self, ControlError> {
        let config = config.normalized();
        config.validate()?;
        let session = GraspSession::new(DofVector::splat(FALLBACK_ANGLE), config.sample_window, None);
        Ok(Self {
            thresholds: config.thresholds(),
            config,
            hand,
            force,
            observer,
            executor: None,
            state: GraspState::Idle,
            session,
            outcome: None,
        })
    }

    pub fn with_executor(mut self, executor: Arc<dyn ActionExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(&self) -> &GraspConfig {
        &self.config
    }

    pub fn state(&self) -> GraspState {
        self.state
    }

    pub fn session(&self) -> &GraspSession {
        &self.session
    }

    /// 会话结束后的结果
    pub fn outcome(&self) -> Option<GraspOutcome> {
        self.outcome
    }

    /// 开始会话：`Idle → Initializing`
    ///
    /// 初始角度取自手的实际角度；读取失败或数值越界时每轴使用 500。
    pub fn start(&mut self, now: Instant) -> Result<(), ControlError> {
        if self.state != GraspState::Idle {
            return Err(ControlError::InvalidState {
                state: self.state,
                operation: "start",
            });
        }
        if self.force.sensors().is_empty() {
            return Err(ControlError::NoSensors);
        }
        if let Some(id) = self.force.unknown_sensor() {
            return Err(ControlError::UnknownSensor(id));
        }

        let angles = match self.hand.current_angles() {
            Ok(angles) if angles.validate_range(0, DOF_VALUE_MAX).is_ok() => angles,
            Ok(angles) => {
                warn!("Unusable initial angles {}, using fallback", angles);
                DofVector::splat(FALLBACK_ANGLE)
            },
            Err(e) => {
                warn!("Failed to read initial angles: {}, using fallback", e);
                DofVector::splat(FALLBACK_ANGLE)
            },
        };

        self.session = GraspSession::new(angles, self.config.sample_window, Some(now));
        self.state = GraspState::Initializing;
        info!(
            "Adaptive grasp started: sensors={:?}, fingers={:?}, release_mode={}",
            self.force.sensors(),
            self.config.finger_indices,
            self.config.release_mode
        );
        self.status("Adaptive grasp started");
        Ok(())
    }

    /// 推进一步
    pub fn tick(&mut self, now: Instant) -> Tick {
        match self.state {
            GraspState::Idle => Tick::NEXT,
            GraspState::Initializing => self.tick_initializing(),
            GraspState::Closing => self.tick_closing(now),
            GraspState::Analyzing => self.tick_analyzing(now),
            GraspState::Releasing => self.tick_releasing(),
            GraspState::Completed | GraspState::Stopped => match self.outcome {
                Some(outcome) => Tick::Finished(outcome),
                None => Tick::NEXT,
            },
        }
    }

    /// 用户停止：任意活动状态 → `Stopped`
    ///
    /// 不在活动状态时返回 `false`。
    pub fn stop(&mut self) -> bool {
        self.halt(GraspReason::UserStopped)
    }

    /// 紧急停止：停止会话并把所有手指组完全张开
    ///
    /// 即使没有活动会话也会执行张开动作。
    pub fn emergency_stop(&mut self) -> bool {
        self.session.emergency = true;
        self.status("Emergency stop triggered");
        let stopped = self.halt(GraspReason::EmergencyStop);
        for group in ReleaseGroup::ALL {
            if let Err(e) = self.hand.release(group) {
                error!("Emergency release of {:?} failed: {}", group, e);
            }
        }
        stopped
    }

    fn halt(&mut self, reason: GraspReason) -> bool {
        if !self.state.is_active() {
            return false;
        }
        info!("Grasp stopped in state {}: {}", self.state, reason);
        self.state = GraspState::Stopped;
        let outcome = GraspOutcome {
            success: false,
            reason,
        };
        self.outcome = Some(outcome);
        self.status("Grasp stopped");
        self.emit(GraspEvent::Completed {
            success: false,
            message: outcome.message().to_string(),
        });
        true
    }

    // ------------------------------------------------------------------
    // 状态处理
    // ------------------------------------------------------------------

    fn tick_initializing(&mut self) -> Tick {
        let mut pause = None;
        if let Some(action) = self.config.initial_action.clone() {
            self.status(format!("Executing initial action: {action}"));
            match &self.executor {
                Some(executor) if executor.execute_named_action(&action) => {
                    pause = Some(INITIAL_ACTION_SETTLE);
                },
                Some(_) => {
                    warn!("Initial action failed: {}", action);
                    self.status(format!("Initial action failed: {action}"));
                },
                None => {
                    warn!("No action executor for initial action: {}", action);
                    self.status(format!("Initial action unavailable: {action}"));
                },
            }
        }

        let speed = DofVector::splat(self.config.close_speed);
        if let Err(e) = self.hand.set_speed(&speed) {
            warn!("Failed to set closing speed: {}", e);
        }

        self.state = GraspState::Closing;
        self.status("Closing fingers");
        Tick::Continue { pause }
    }

    fn tick_closing(&mut self, now: Instant) -> Tick {
        if self.session.iterations >= self.config.max_iterations {
            self.status("Maximum iterations reached, stopping closing");
            return self.finish(false, GraspReason::MaxIterations);
        }

        let Some(sample) = self.sample() else {
            self.status("No sensor data available");
            return Tick::NEXT;
        };

        if sample.exceeds(&self.thresholds) {
            info!("Force threshold reached: {}", sample);
            self.status(format!("Force threshold reached: {sample}"));
            if self.config.release_mode {
                self.state = GraspState::Releasing;
                self.status("Entering release mode");
            } else {
                self.state = GraspState::Analyzing;
                self.session.history.clear();
                self.session.stable_since = Some(now);
                self.status("Analyzing force stability");
            }
            return Tick::NEXT;
        }

        let pause = self.move_fingers(Motion::Close);
        self.advance();
        Tick::Continue { pause }
    }

    fn tick_analyzing(&mut self, now: Instant) -> Tick {
        let Some(sample) = self.sample() else {
            return Tick::NEXT;
        };
        self.session.history.push(sample);

        let since = *self.session.stable_since.get_or_insert(now);
        let elapsed = now.saturating_duration_since(since);

        if self.session.history.len() >= MIN_STD_SAMPLES {
            if let Some([sx, sy, sz]) = self.session.history.std_devs() {
                let msg = format!(
                    "Std dev: X={sx:.4}, Y={sy:.4}, Z={sz:.4} ({:.1}s / {}s)",
                    elapsed.as_secs_f64(),
                    self.config.stable_duration
                );
                debug!("{}", msg);
                self.status(msg);
            }
        }

        if elapsed < self.config.stable_duration() || !self.session.history.is_full() {
            return Tick::NEXT;
        }
        let Some([sx, sy, sz]) = self.session.history.std_devs() else {
            return Tick::NEXT;
        };

        let limit = self.config.stable_std_threshold;
        self.status(format!(
            "Final std dev: X={sx:.4}, Y={sy:.4}, Z={sz:.4} (threshold={limit})"
        ));
        if sx <= limit && sy <= limit && sz <= limit {
            self.status("Force stable, grasp succeeded");
            return self.finish(true, GraspReason::Stable);
        }

        info!("Force unstable, resuming closing");
        self.status("Force unstable, resuming closing");
        self.session.history.clear();
        self.session.stable_since = None;
        self.state = GraspState::Closing;
        Tick::NEXT
    }

    fn tick_releasing(&mut self) -> Tick {
        if self.session.iterations >= self.config.max_iterations {
            return match self.sample() {
                Some(sample) if sample.below_all(&self.thresholds) => {
                    self.status(format!("Maximum iterations reached, force below threshold: {sample}"));
                    self.finish(true, GraspReason::ReleaseBalanced)
                },
                Some(sample) => {
                    self.status(format!(
                        "Maximum iterations reached, force still above threshold: {sample}"
                    ));
                    self.finish(false, GraspReason::ForceAboveThreshold)
                },
                None => {
                    self.status("Maximum iterations reached");
                    self.finish(false, GraspReason::MaxIterations)
                },
            };
        }

        let Some(sample) = self.sample() else {
            self.status("No sensor data available");
            return Tick::NEXT;
        };

        let pause = if sample.exceeds(&self.thresholds) {
            let pause = self.move_fingers(Motion::Open);
            self.status(format!("Force above threshold, releasing: {sample}"));
            pause
        } else {
            let pause = self.move_fingers(Motion::Close);
            self.status(format!("Force below threshold, closing: {sample}"));
            pause
        };
        self.advance();
        Tick::Continue { pause }
    }

    // ------------------------------------------------------------------
    // 辅助
    // ------------------------------------------------------------------

    /// 采样并广播力值
    fn sample(&self) -> Option<ForceSample> {
        let sample = self.force.sample()?;
        self.emit(GraspEvent::ForceSample(sample));
        Some(sample)
    }

    /// 按步长移动选定手指，角度钳位在 `[min_finger_angle, max_finger_angle]`
    ///
    /// 成功时返回 `step_interval`，失败时记录错误并不等待。
    fn move_fingers(&mut self, motion: Motion) -> Option<Duration> {
        let (delta, verb) = match motion {
            Motion::Close => (-self.config.close_step, "close"),
            Motion::Open => (self.config.release_step, "release"),
        };
        let (min, max) = (self.config.min_finger_angle, self.config.max_finger_angle);

        let mut angles = self.session.angles;
        for &i in &self.config.finger_indices {
            angles[i] = angles[i].saturating_add(delta).clamp(min, max);
        }

        match self.hand.set_angles(&angles) {
            Ok(()) => {
                self.session.angles = angles;
                let fingers = self
                    .config
                    .finger_indices
                    .iter()
                    .map(|&i| format!("F{i}:{}", angles[i]))
                    .collect::<Vec<_>>()
                    .join(", ");
                debug!("Fingers {}: {}", verb, angles);
                self.status(format!("Fingers {verb} [{fingers}]"));
                Some(self.config.step_interval())
            },
            Err(e) => {
                error!("Failed to {} fingers: {}", verb, e);
                self.status(format!("Failed to {verb} fingers: {e}"));
                None
            },
        }
    }

    fn advance(&mut self) {
        self.session.iterations += 1;
        self.emit(GraspEvent::Progress {
            current: self.session.iterations,
            total: self.config.max_iterations,
        });
    }

    fn finish(&mut self, success: bool, reason: GraspReason) -> Tick {
        let outcome = GraspOutcome { success, reason };
        self.state = GraspState::Completed;
        self.outcome = Some(outcome);
        info!(
            "Adaptive grasp completed after {} iterations: success={}, reason={}",
            self.session.iterations, success, reason
        );
        self.status("Adaptive grasp completed");
        self.emit(GraspEvent::Completed {
            success,
            message: reason.as_str().to_string(),
        });
        Tick::Finished(outcome)
    }

    fn status(&self, text: impl Into<String>) {
        self.emit(GraspEvent::Status(text.into()));
    }

    fn emit(&self, event: GraspEvent) {
        self.observer.on_event(&event);
    }
}

impl<H: HandActuator + ?Sized> fmt::Debug for GraspStateMachine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraspStateMachine")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
