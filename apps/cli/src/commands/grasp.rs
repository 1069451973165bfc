//! 自适应抓取命令
//!
//! 抓取在工作线程上运行，主线程只负责打印事件；Ctrl+C 触发紧急停止
//! （所有手指张开）。

use crate::config::SensorConfig;
use anyhow::{Context, Result, bail};
use clap::Args;
use crossbeam_channel::{Receiver, bounded, select};
use inspire_sdk::control::{SensorFeed, SensorId};
use inspire_sdk::prelude::*;
use std::io::{BufReader, ErrorKind};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const INTERRUPT_POLL: Duration = Duration::from_millis(50);

#[derive(Args, Debug, Clone, Default)]
pub struct GraspArgs {
    /// 参与平均的传感器编号（例如 `--sensors 1,2`）
    #[arg(long, value_delimiter = ',', num_args = 1)]
    pub sensors: Option<Vec<SensorId>>,

    /// 参与闭合的手指（0=小拇指 ... 5=大拇指旋转）
    #[arg(long, value_delimiter = ',', num_args = 1)]
    pub fingers: Option<Vec<usize>>,

    /// 三轴统一的力阈值
    #[arg(long)]
    pub threshold: Option<f64>,

    /// 释放模式：在阈值附近来回调节直到迭代上限
    #[arg(long)]
    pub release: bool,

    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// 传感器板串口（覆盖配置）
    #[arg(long)]
    pub sensor_port: Option<String>,
}

impl GraspArgs {
    /// 命令行参数覆盖配置文件
    pub fn apply(&self, config: &mut GraspConfig, sensors: &mut SensorConfig) {
        if let Some(ids) = &self.sensors {
            sensors.ids = ids.clone();
        }
        if let Some(port) = &self.sensor_port {
            sensors.port = Some(port.clone());
        }
        if let Some(fingers) = &self.fingers {
            config.finger_indices = fingers.clone();
        }
        if let Some(t) = self.threshold {
            config.force_threshold_x = t;
            config.force_threshold_y = t;
            config.force_threshold_z = t;
        }
        if self.release {
            config.release_mode = true;
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
    }
}

/// 在后台线程读取传感器板输出，直到串口关闭
pub fn spawn_sensor_reader(sensors: &SensorConfig) -> Result<Arc<SensorHub>> {
    let Some(port) = &sensors.port else {
        bail!("no sensor port configured (use --sensor-port or --simulate)");
    };
    let serial = serialport::new(port, sensors.baud_rate)
        .timeout(Duration::from_millis(500))
        .open()
        .with_context(|| format!("failed to open sensor port {port}"))?;
    info!("Reading force sensors from {} @ {}", port, sensors.baud_rate);

    let hub = Arc::new(SensorHub::new());
    let worker_hub = hub.clone();
    thread::Builder::new()
        .name("inspire-sensors".into())
        .spawn(move || {
            let mut reader = BufReader::new(serial);
            loop {
                match worker_hub.ingest_reader(&mut reader) {
                    Ok(_) => {
                        warn!("Sensor port closed");
                        break;
                    },
                    Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                    Err(e) => {
                        warn!("Sensor port read failed: {}", e);
                        break;
                    },
                }
            }
        })
        .context("failed to spawn sensor reader")?;
    Ok(hub)
}

/// 等待所有传感器上线；超时后仍然返回，由 `start` 报告未知传感器
pub fn wait_for_sensors(feed: &dyn SensorFeed, ids: &[SensorId], timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !ids.iter().all(|&id| feed.has_data(id)) {
        if Instant::now() >= deadline {
            warn!("Timed out waiting for sensors {:?}", ids);
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
    debug!("Sensors online: {:?}", ids);
}

/// 运行一次抓取并打印事件
///
/// `interrupt` 收到消息时触发紧急停止。
pub fn run<H: HandActuator + 'static>(
    hand: Arc<H>,
    feed: Arc<dyn SensorFeed>,
    sensors: Vec<SensorId>,
    config: GraspConfig,
    interrupt: &Receiver<()>,
) -> Result<GraspOutcome> {
    let (observer, events) = ChannelObserver::channel();
    let runner = GraspRunner::new(hand, feed).with_observer(Arc::new(observer));
    let handle = runner.start(sensors, config)?;

    loop {
        if interrupt.try_recv().is_ok() {
            warn!("Interrupted, triggering emergency stop");
            handle.emergency_stop();
        }
        select! {
            recv(events) -> event => match event {
                Ok(event) => {
                    if report(&event) {
                        break;
                    }
                },
                Err(_) => break,
            },
            default(INTERRUPT_POLL) => {
                if handle.is_finished() {
                    break;
                }
            },
        }
    }
    events.try_iter().for_each(|event| {
        report(&event);
    });

    Ok(handle.join()?)
}

/// 安装 Ctrl+C 处理器，返回中断通知通道
pub fn interrupt_channel() -> Result<Receiver<()>> {
    let (tx, rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .context("failed to set Ctrl+C handler")?;
    Ok(rx)
}

/// 打印一个事件；返回是否为完成事件
fn report(event: &GraspEvent) -> bool {
    match event {
        GraspEvent::Status(text) => println!("{text}"),
        GraspEvent::Progress { current, total } => debug!("Iteration {}/{}", current, total),
        GraspEvent::ForceSample(sample) => debug!("Force: {}", sample),
        GraspEvent::Completed { success, message } => {
            let mark = if *success { "succeeded" } else { "failed" };
            println!("Grasp {mark}: {message}");
            return true;
        },
    }
    false
}
