//! # Inspire CLI
//!
//! 因时灵巧手命令行工具。
//!
//! ```bash
//! # 读取实际角度
//! inspire-cli --port /dev/ttyUSB0 angles
//!
//! # 设置角度（-1 表示该轴保持不变）
//! inspire-cli angles --set 500,500,500,500,800,-1
//!
//! # 自适应抓取，传感器板接在 /dev/ttyACM0
//! inspire-cli --config hand.toml grasp --sensor-port /dev/ttyACM0 --sensors 1,2
//!
//! # 无硬件演示（需要 `--features sim` 构建）
//! inspire-cli --simulate grasp
//! ```

use anyhow::{Result, bail};
use crossbeam_channel::Receiver;
use clap::{ArgAction, Parser, Subcommand};
#[cfg(feature = "sim")]
use inspire_sdk::serial::mock::SimulatedHand;
use inspire_sdk::control::SensorId;
use inspire_sdk::{GraspOutcome, HandBuilder, HandConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

mod commands;
mod config;
#[cfg(any(test, feature = "sim"))]
mod sim;

use commands::{GraspArgs, HandCommand, grasp};
use config::CliConfig;
#[cfg(feature = "sim")]
use sim::ContactModel;

/// Inspire CLI - 灵巧手命令行工具
#[derive(Parser, Debug)]
#[command(name = "inspire-cli")]
#[command(about = "Command-line interface for the Inspire dexterous hand", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML 配置文件（[hand] / [grasp] / [sensors]）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 灵巧手串口（覆盖配置）
    #[arg(short, long, global = true)]
    port: Option<String>,

    #[arg(long, global = true)]
    baud_rate: Option<u32>,

    #[arg(long, global = true)]
    hand_id: Option<u8>,

    /// 严格校验响应帧
    #[arg(long, global = true)]
    strict: bool,

    /// 使用模拟灵巧手和虚拟物体（`sim` feature）
    #[arg(long, global = true)]
    simulate: bool,

    /// 日志详细程度（-v: debug, -vv: trace）
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Hand(HandCommand),

    /// 基于力反馈的自适应抓取
    Grasp(GraspArgs),
}

impl Cli {
    fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// 命令行参数覆盖配置文件
    fn apply(&self, hand: &mut HandConfig) {
        if let Some(port) = &self.port {
            hand.port = port.clone();
        }
        if let Some(baud_rate) = self.baud_rate {
            hand.baud_rate = baud_rate;
        }
        if let Some(hand_id) = self.hand_id {
            hand.hand_id = hand_id;
        }
        if self.strict {
            hand.strict_checksum = true;
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    inspire_sdk::init_logging(cli.log_directive());

    ensure_simulation_available(cli.simulate)?;
    let mut config = CliConfig::load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config.hand);

    match cli.command {
        Commands::Hand(cmd) => {
            if cli.simulate {
                simulated_hand_command(config.hand, &cmd)?;
            } else {
                let hand = HandBuilder::from_config(config.hand).build()?;
                cmd.execute(&hand)?;
            }
            Ok(ExitCode::SUCCESS)
        },
        Commands::Grasp(args) => run_grasp(config, &args, cli.simulate),
    }
}

/// 未启用 `sim` feature 时拒绝 `--simulate`，模拟设备不会进入正式构建
fn ensure_simulation_available(simulate: bool) -> Result<()> {
    if simulate && !cfg!(feature = "sim") {
        bail!("--simulate requires inspire-cli built with `--features sim`");
    }
    Ok(())
}

fn run_grasp(mut config: CliConfig, args: &GraspArgs, simulate: bool) -> Result<ExitCode> {
    args.apply(&mut config.grasp, &mut config.sensors);
    let interrupt = grasp::interrupt_channel()?;
    let ids = config.sensors.ids.clone();

    let outcome = if simulate {
        simulated_grasp(config, ids, &interrupt)?
    } else {
        let hub = grasp::spawn_sensor_reader(&config.sensors)?;
        grasp::wait_for_sensors(hub.as_ref(), &ids, Duration::from_millis(config.sensors.wait_ms));
        let hand = Arc::new(HandBuilder::from_config(config.hand).build()?);
        grasp::run(hand, hub, ids, config.grasp, &interrupt)?
    };

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(feature = "sim")]
fn simulated_hand_command(config: HandConfig, cmd: &HandCommand) -> Result<()> {
    let sim = SimulatedHand::new(config.hand_id);
    let hand = HandBuilder::from_config(config).build_with_adapter(sim)?;
    cmd.execute(&hand)
}

#[cfg(not(feature = "sim"))]
fn simulated_hand_command(_config: HandConfig, _cmd: &HandCommand) -> Result<()> {
    bail!("--simulate requires inspire-cli built with `--features sim`")
}

/// 模拟灵巧手 + 虚拟物体
#[cfg(feature = "sim")]
fn simulated_grasp(config: CliConfig, ids: Vec<SensorId>, interrupt: &Receiver<()>) -> Result<GraspOutcome> {
    tracing::info!("Simulated grasp with sensors {:?}", ids);
    let sim = SimulatedHand::new(config.hand.hand_id);
    let hand = Arc::new(HandBuilder::from_config(config.hand).build_with_adapter(sim.clone())?);
    let feed = Arc::new(ContactModel::new(sim, ids.clone()));
    grasp::run(hand, feed, ids, config.grasp, interrupt)
}

#[cfg(not(feature = "sim"))]
fn simulated_grasp(_config: CliConfig, _ids: Vec<SensorId>, _interrupt: &Receiver<()>) -> Result<GraspOutcome> {
    bail!("--simulate requires inspire-cli built with `--features sim`")
}
