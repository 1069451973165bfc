//! 端到端抓取场景：模拟灵巧手 + 接触模型传感器

use crossbeam_channel::Receiver;
use inspire_sdk::control::{ForceAggregator, GraspStateMachine, SensorFeed, SensorId, Tick};
use inspire_sdk::prelude::*;
use inspire_sdk::protocol::Register;
use inspire_sdk::serial::mock::SimulatedHand;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 弹簧接触模型：手指角度低于 `contact` 后，Z 向力与压入深度成正比
struct ContactFeed {
    sim: SimulatedHand,
    finger: Finger,
    contact: i32,
    stiffness: f64,
}

impl SensorFeed for ContactFeed {
    fn latest_values(&self, id: SensorId) -> Option<[f32; 3]> {
        if id != 1 {
            return None;
        }
        let angle = self.sim.peek(Register::AngleActual)[self.finger];
        let depth = (self.contact - angle).max(0) as f64;
        Some([0.0, 0.0, (depth * self.stiffness) as f32])
    }

    fn is_known(&self, id: SensorId) -> bool {
        id == 1
    }
}

struct Rig {
    sim: SimulatedHand,
    runner: GraspRunner<InspireHand<SimulatedHand>>,
    events: Receiver<GraspEvent>,
}

fn rig(contact: i32, stiffness: f64) -> Rig {
    let sim = SimulatedHand::new(1);
    let hand = Arc::new(InspireHand::new(sim.clone(), HandConfig::default()));
    hand.connect().unwrap();

    let feed = Arc::new(ContactFeed {
        sim: sim.clone(),
        finger: Finger::Index,
        contact,
        stiffness,
    });
    let (observer, events) = ChannelObserver::channel();
    let runner = GraspRunner::new(hand, feed)
        .with_observer(Arc::new(observer))
        .with_config(RunnerConfig {
            tick_interval: Duration::from_millis(1),
        });
    Rig { sim, runner, events }
}

fn fast_config() -> GraspConfig {
    GraspConfig {
        finger_indices: vec![Finger::Index.index()],
        close_step: 50,
        step_interval: 0.0,
        stable_duration: 0.0,
        sample_window: 3,
        max_iterations: 20,
        ..Default::default()
    }
}

#[test]
fn test_closing_to_stable_success() {
    let rig = rig(800, 0.05);
    let handle = rig.runner.start(vec![1], fast_config()).unwrap();
    let outcome = handle.join().unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.reason, GraspReason::Stable);
    // 1000 → 750 共 5 步，750 处受力 2.5
    assert_eq!(rig.sim.peek(Register::AngleTarget)[Finger::Index], 750);
    // 未选中的手指不动
    assert_eq!(rig.sim.peek(Register::AngleTarget)[Finger::Middle], 1000);

    let events: Vec<_> = rig.events.try_iter().collect();
    let progress = events
        .iter()
        .filter(|e| matches!(e, GraspEvent::Progress { .. }))
        .count();
    assert_eq!(progress, 5);
    assert!(matches!(
        events.last(),
        Some(GraspEvent::Completed { success: true, message }) if message == "stable"
    ));
    assert_eq!(events.iter().filter(|e| e.is_completed()).count(), 1);
}

#[test]
fn test_max_iteration_failure() {
    // 永远接触不到
    let rig = rig(0, 0.05);
    let config = GraspConfig {
        max_iterations: 4,
        ..fast_config()
    };
    let outcome = rig.runner.start(vec![1], config).unwrap().join().unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message(), "max iterations");
    assert_eq!(rig.sim.peek(Register::AngleTarget)[Finger::Index], 800);
    assert_eq!(rig.sim.writes_to(Register::AngleTarget).len(), 4);
}

#[test]
fn test_emergency_stop_opens_every_group() {
    let rig = rig(0, 0.05);
    let config = GraspConfig {
        finger_indices: vec![0, 1, 2, 3, 4],
        close_step: 1,
        step_interval: 0.002,
        max_iterations: 100_000,
        ..fast_config()
    };
    let handle = rig.runner.start(vec![1], config).unwrap();
    while rig.sim.writes_to(Register::AngleTarget).is_empty() {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(handle.emergency_stop());
    let outcome = handle.join().unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.reason, GraspReason::EmergencyStop);
    assert_eq!(rig.sim.peek(Register::AngleTarget), DofVector::splat(1000));
    assert!(!rig.runner.is_running());
}

#[test]
fn test_release_mode_convergence() {
    // 880 处受力 1.6（低于阈值），870 处受力 2.4（超过阈值）
    let rig = rig(900, 0.08);
    let config = GraspConfig {
        close_step: 10,
        release_step: 10,
        release_mode: true,
        max_iterations: 40,
        ..fast_config()
    };
    let outcome = rig.runner.start(vec![1], config).unwrap().join().unwrap();

    assert_eq!(outcome.reason, GraspReason::ReleaseBalanced);
    assert!(outcome.success);

    // 释放阶段在 870 与 880 之间来回
    let writes = rig.sim.writes_to(Register::AngleTarget);
    assert_eq!(writes.len(), 40);
    let tail: Vec<i32> = writes[13..].iter().map(|w| w[Finger::Index.index()]).collect();
    assert!(tail.iter().all(|&a| a == 870 || a == 880), "{tail:?}");
    assert_eq!(*tail.last().unwrap(), 880);
}

#[test]
fn test_angles_never_leave_clamps() {
    let rig = rig(0, 0.0);
    let config = GraspConfig {
        finger_indices: vec![0, 1, 2, 3, 4],
        close_step: 70,
        min_finger_angle: 250,
        max_iterations: 30,
        ..fast_config()
    };
    rig.runner.start(vec![1], config).unwrap().join().unwrap();

    for write in rig.sim.writes_to(Register::AngleTarget) {
        for &angle in &write[..5] {
            assert!((250..=1000).contains(&angle), "{write:?}");
        }
    }
    assert_eq!(
        rig.sim.peek(Register::AngleTarget),
        DofVector::new([250, 250, 250, 250, 250, 1000])
    );
}

/// 确定性时间下的稳定性判定：在观察期内力值稳定才算成功
#[test]
fn test_stability_requires_full_duration() {
    let sim = SimulatedHand::new(1);
    let hand = Arc::new(InspireHand::new(sim.clone(), HandConfig::default()));
    hand.connect().unwrap();
    let hub = Arc::new(SensorHub::new());
    let (observer, _events) = ChannelObserver::channel();

    let config = GraspConfig {
        sample_window: 4,
        stable_duration: 2.0,
        ..fast_config()
    };
    let mut machine = GraspStateMachine::new(
        config,
        hand,
        ForceAggregator::new(hub.clone(), vec![1]),
        Arc::new(observer),
    )
    .unwrap();

    hub.update(1, [0.0, 0.0, 5.0]);
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    machine.start(t0).unwrap();
    machine.tick(at(0));
    // 第一次闭合 tick 即超阈值，进入分析
    machine.tick(at(100));
    assert_eq!(machine.state(), GraspState::Analyzing);

    let mut finished = None;
    for ms in (200..=2500).step_by(100) {
        if let Tick::Finished(outcome) = machine.tick(at(ms)) {
            finished = Some(ms);
            assert!(outcome.success);
            break;
        }
    }
    // 分析自 100ms 开始，需满 2 秒
    assert_eq!(finished, Some(2100));
    assert!(sim.writes_to(Register::AngleTarget).is_empty());
}

/// 默认阈值 2.0、观察 2 秒、窗口 20、最多 5 次迭代；闭合 3 步后力值从 0 跳到 2.5
#[test]
fn test_force_step_with_default_window() {
    let sim = SimulatedHand::new(1);
    let hand = Arc::new(InspireHand::new(sim.clone(), HandConfig::default()));
    hand.connect().unwrap();
    let hub = Arc::new(SensorHub::new());
    let (observer, events) = ChannelObserver::channel();

    let config = GraspConfig {
        max_iterations: 5,
        ..Default::default()
    };
    assert_eq!(config.force_threshold_z, 2.0);
    assert_eq!(config.stable_duration, 2.0);
    assert_eq!(config.sample_window, 20);

    let mut machine = GraspStateMachine::new(
        config,
        hand,
        ForceAggregator::new(hub.clone(), vec![1]),
        Arc::new(observer),
    )
    .unwrap();

    hub.update(1, [0.0, 0.0, 0.0]);
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);
    machine.start(t0).unwrap();
    assert_eq!(machine.tick(at(0)), Tick::Continue { pause: None });

    for ms in [100, 200, 300] {
        assert!(matches!(machine.tick(at(ms)), Tick::Continue { pause: Some(_) }));
    }
    assert_eq!(machine.session().iterations(), 3);

    hub.update(1, [0.0, 0.0, 2.5]);
    machine.tick(at(400));
    assert_eq!(machine.state(), GraspState::Analyzing);

    // 第 20 个样本在 2400ms 到达，此时恰好观察满 2 秒
    for ms in (500..=2300).step_by(100) {
        assert_eq!(machine.tick(at(ms)), Tick::Continue { pause: None }, "at {ms}ms");
    }
    assert_eq!(machine.session().history_len(), 19);
    let Tick::Finished(outcome) = machine.tick(at(2400)) else {
        panic!("grasp should finish once the window is full");
    };
    assert!(outcome.success);
    assert_eq!(outcome.reason, GraspReason::Stable);

    let writes = sim.writes_to(Register::AngleTarget);
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[2], vec![970, 970, 970, 970, 970, 1000]);

    let events: Vec<_> = events.try_iter().collect();
    assert_eq!(events.iter().filter(|e| e.is_completed()).count(), 1);
    assert!(matches!(
        events.last(),
        Some(GraspEvent::Completed { success: true, message }) if message == "stable"
    ));
}

/// 同样的参数下力值始终为 0：第 5 次闭合后的下一个 tick 以迭代上限失败
#[test]
fn test_default_window_without_contact_hits_iteration_limit() {
    let sim = SimulatedHand::new(1);
    let hand = Arc::new(InspireHand::new(sim.clone(), HandConfig::default()));
    hand.connect().unwrap();
    let hub = Arc::new(SensorHub::new());
    hub.update(1, [0.0, 0.0, 0.0]);
    let (observer, _events) = ChannelObserver::channel();

    let config = GraspConfig {
        max_iterations: 5,
        ..Default::default()
    };
    let mut machine = GraspStateMachine::new(
        config,
        hand,
        ForceAggregator::new(hub, vec![1]),
        Arc::new(observer),
    )
    .unwrap();

    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);
    machine.start(t0).unwrap();
    for ms in (0..=500).step_by(100) {
        assert!(matches!(machine.tick(at(ms)), Tick::Continue { .. }));
    }
    assert_eq!(
        machine.tick(at(600)),
        Tick::Finished(GraspOutcome {
            success: false,
            reason: GraspReason::MaxIterations
        })
    );
    assert_eq!(sim.writes_to(Register::AngleTarget).len(), 5);
    assert_eq!(sim.peek(Register::AngleTarget)[Finger::Index], 950);
}
