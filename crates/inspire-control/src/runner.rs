//! 抓取工作线程
//!
//! [`GraspRunner`] 在独立线程上以固定周期驱动 [`GraspStateMachine`]，
//! 调用方线程永远不会被手指命令或等待阻塞。
//!
//! - 同一时刻最多一个会话
//! - 停止/紧急停止通过通道送达，在下一个 tick 之前生效
//! - 正在进行的串口事务会完成，但之后不会再下发新命令

use crate::ControlError;
use crate::actuator::{ActionExecutor, HandActuator};
use crate::config::GraspConfig;
use crate::events::{GraspObserver, NoopObserver};
use crate::force::{ForceAggregator, SensorFeed, SensorId};
use crate::machine::{GraspOutcome, GraspState, GraspStateMachine, Tick};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// 状态机 tick 周期
    pub tick_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ControlMessage {
    Stop,
    EmergencyStop,
}

pub struct GraspRunner<H: HandActuator + ?Sized + 'static> {
    hand: Arc<H>,
    feed: Arc<dyn SensorFeed>,
    executor: Option<Arc<dyn ActionExecutor>>,
    observer: Arc<dyn GraspObserver>,
    config: RunnerConfig,
    active: Arc<AtomicBool>,
}

impl<H: HandActuator + ?Sized + 'static> GraspRunner<H> {
    pub fn new(hand: Arc<H>, feed: Arc<dyn SensorFeed>) -> Self {
        Self {
            hand,
            feed,
            executor: None,
            observer: Arc::new(NoopObserver),
            config: RunnerConfig::default(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn ActionExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn GraspObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hand(&self) -> &Arc<H> {
        &self.hand
    }

    /// 是否有会话正在运行
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// 启动抓取会话
    ///
    /// 已有会话运行、传感器列表为空或包含未知传感器时失败，不会产生任何手部动作。
    pub fn start(&self, sensors: Vec<SensorId>, config: GraspConfig) -> Result<GraspHandle, ControlError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ControlError::AlreadyRunning);
        }
        // 任何提前返回都会通过 guard 复位活动标志
        let guard = ActiveGuard(self.active.clone());

        let force = ForceAggregator::new(self.feed.clone(), sensors);
        let mut machine = GraspStateMachine::new(config, self.hand.clone(), force, self.observer.clone())?;
        if let Some(executor) = &self.executor {
            machine = machine.with_executor(executor.clone());
        }
        machine.start(Instant::now())?;

        let (tx, rx) = unbounded();
        let state = Arc::new(AtomicU8::new(machine.state().into()));
        let worker_state = state.clone();
        let interval = self.config.tick_interval;

        let thread = thread::Builder::new()
            .name("inspire-grasp".into())
            .spawn(move || {
                let _guard = guard;
                run_loop(machine, rx, interval, &worker_state)
            })
            .map_err(|e| ControlError::Worker(e.to_string()))?;

        debug!("Grasp worker spawned (tick {:?})", interval);
        Ok(GraspHandle {
            tx,
            state,
            thread: Some(thread),
        })
    }
}

struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn run_loop<H: HandActuator + ?Sized>(
    mut machine: GraspStateMachine<H>,
    rx: Receiver<ControlMessage>,
    interval: Duration,
    state: &AtomicU8,
) -> GraspOutcome {
    loop {
        let tick_start = Instant::now();
        match rx.try_recv() {
            Ok(msg) => apply(&mut machine, msg),
            Err(TryRecvError::Disconnected) => apply(&mut machine, ControlMessage::Stop),
            Err(TryRecvError::Empty) => {},
        }

        let tick = machine.tick(Instant::now());
        state.store(machine.state().into(), Ordering::Release);

        let wake = match tick {
            Tick::Finished(outcome) => {
                info!("Grasp worker finished: success={}, {}", outcome.success, outcome.reason);
                return outcome;
            },
            Tick::Continue { pause } => {
                let next = tick_start + interval;
                pause.map_or(next, |p| next.max(Instant::now() + p))
            },
        };

        // 等待期间收到的控制消息立即生效
        match rx.recv_deadline(wake) {
            Ok(msg) => apply(&mut machine, msg),
            Err(RecvTimeoutError::Disconnected) => apply(&mut machine, ControlMessage::Stop),
            Err(RecvTimeoutError::Timeout) => {},
        }
    }
}

fn apply<H: HandActuator + ?Sized>(machine: &mut GraspStateMachine<H>, msg: ControlMessage) {
    match msg {
        ControlMessage::Stop => {
            machine.stop();
        },
        ControlMessage::EmergencyStop => {
            machine.emergency_stop();
        },
    }
}

/// 运行中会话的句柄
///
/// 丢弃句柄会停止会话并等待工作线程退出。
pub struct GraspHandle {
    tx: Sender<ControlMessage>,
    state: Arc<AtomicU8>,
    thread: Option<thread::JoinHandle<GraspOutcome>>,
}

impl GraspHandle {
    /// 请求停止；工作线程已退出时返回 `false`
    pub fn stop(&self) -> bool {
        self.tx.send(ControlMessage::Stop).is_ok()
    }

    /// 请求紧急停止（停止后张开所有手指）
    pub fn emergency_stop(&self) -> bool {
        self.tx.send(ControlMessage::EmergencyStop).is_ok()
    }

    /// 最近一次 tick 后的状态
    pub fn state(&self) -> GraspState {
        GraspState::try_from(self.state.load(Ordering::Acquire)).unwrap_or(GraspState::Idle)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// 等待会话自然结束
    pub fn join(mut self) -> Result<GraspOutcome, ControlError> {
        let thread = self
            .thread
            .take()
            .ok_or_else(|| ControlError::Worker("grasp worker already joined".to_string()))?;
        thread.join().map_err(|_| {
            error!("Grasp worker panicked");
            ControlError::Worker("grasp worker panicked".to_string())
        })
    }
}

impl Drop for GraspHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.tx.send(ControlMessage::Stop);
            let _ = thread.join();
        }
    }
}

impl std::fmt::Debug for GraspHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraspHandle")
            .field("state", &self.state())
            .field("finished", &self.is_finished())
            .finish()
    }
}
