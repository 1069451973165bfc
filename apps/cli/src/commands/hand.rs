//! 寄存器级命令：一次连接，执行一个操作后退出

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use inspire_sdk::{Finger, InspireHand, ReleaseGroup, SerialAdapter};

/// 六个自由度的数值，逗号分隔；-1 表示该轴不变
#[derive(Args, Debug, Clone, Default)]
pub struct DofArgs {
    /// 写入的新值（例如 `--set 1000,1000,500,500,800,-1`）
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, num_args = 1)]
    pub set: Option<Vec<i32>>,
}

#[derive(Subcommand, Debug)]
pub enum HandCommand {
    /// 读取或设置手指角度（0-1000）
    Angles {
        #[command(flatten)]
        values: DofArgs,

        /// 读取目标角度而不是实际角度
        #[arg(long)]
        target: bool,
    },

    /// 读取或设置手指速度（0-1000）
    Speed {
        #[command(flatten)]
        values: DofArgs,
    },

    /// 读取或设置力控阈值（0-1000）
    ForceLimit {
        #[command(flatten)]
        values: DofArgs,
    },

    /// 读取各手指受力
    Force,

    /// 读取各电缸电流
    Current,

    /// 读取各电缸温度
    Temperature,

    /// 读取运动状态
    Status,

    /// 读取故障码
    Error,

    /// 清除故障
    ClearError,

    /// 将参数保存到设备 Flash
    Save,

    /// 力传感器校准（手需要处于空载状态）
    Calibrate,

    /// 紧急张开指定手指组
    Release {
        #[arg(value_enum, default_value_t = GroupArg::All)]
        group: GroupArg,
    },

    /// 回到配置中的初始角度
    Reset,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupArg {
    FourFingers,
    Thumb,
    ThumbFlip,
    All,
}

impl GroupArg {
    pub fn groups(self) -> &'static [ReleaseGroup] {
        match self {
            GroupArg::FourFingers => &[ReleaseGroup::FourFingers],
            GroupArg::Thumb => &[ReleaseGroup::Thumb],
            GroupArg::ThumbFlip => &[ReleaseGroup::ThumbFlip],
            GroupArg::All => &ReleaseGroup::ALL,
        }
    }
}

impl HandCommand {
    pub fn execute<A: SerialAdapter>(&self, hand: &InspireHand<A>) -> Result<()> {
        match self {
            HandCommand::Angles { values, target } => match &values.set {
                Some(angles) => {
                    hand.set_angles(angles)?;
                    println!("Angles set: {:?}", angles);
                },
                None => println!("{}", hand.get_angles(!target)?),
            },
            HandCommand::Speed { values } => match &values.set {
                Some(speed) => {
                    hand.set_speed(speed)?;
                    println!("Speed set: {:?}", speed);
                },
                None => println!("{}", hand.get_speed()?),
            },
            HandCommand::ForceLimit { values } => match &values.set {
                Some(limit) => {
                    hand.set_force_limit(limit)?;
                    println!("Force limit set: {:?}", limit);
                },
                None => println!("{}", hand.get_force_limit()?),
            },
            HandCommand::Force => println!("{}", hand.get_force()?),
            HandCommand::Current => println!("{}", hand.get_current()?),
            HandCommand::Temperature => println!("{:?}", hand.get_temperature()?),
            HandCommand::Status => {
                let report = hand.get_status()?;
                for finger in Finger::ALL {
                    let status = report.finger(finger);
                    println!("{:<12} {} ({})", format!("{finger:?}"), status.code(), status.description());
                }
            },
            HandCommand::Error => {
                let report = hand.get_error()?;
                for finger in Finger::ALL {
                    println!("{:<12} {:?}", format!("{finger:?}"), report.finger(finger));
                }
                if !report.has_fault() {
                    println!("No faults");
                }
            },
            HandCommand::ClearError => {
                hand.clear_error()?;
                println!("Errors cleared");
            },
            HandCommand::Save => {
                hand.save_parameters()?;
                println!("Parameters saved");
            },
            HandCommand::Calibrate => {
                println!("Calibrating force sensors, keep the hand unloaded...");
                hand.calibrate_force()?;
                println!("Calibration done");
            },
            HandCommand::Release { group } => {
                for &g in group.groups() {
                    hand.release(g)?;
                }
                println!("Released {:?}", group);
            },
            HandCommand::Reset => {
                hand.reset()?;
                println!("Hand reset to {}", hand.config().initial_angle);
            },
        }
        Ok(())
    }
}
