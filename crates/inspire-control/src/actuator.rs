//! 抓取控制器依赖的协作接口
//!
//! 状态机不直接依赖串口驱动，而是通过 [`HandActuator`] 下发角度，
//! 便于替换为模拟实现。

use crate::ControlError;
use inspire_driver::{InspireHand, ReleaseGroup};
use inspire_protocol::DofVector;
use inspire_serial::SerialAdapter;

pub trait HandActuator: Send + Sync {
    /// 下发 6 轴目标角度
    fn set_angles(&self, angles: &DofVector) -> Result<(), ControlError>;

    /// 读取当前实际角度
    fn current_angles(&self) -> Result<DofVector, ControlError>;

    fn set_speed(&self, speed: &DofVector) -> Result<(), ControlError>;

    /// 把一组手指完全张开
    fn release(&self, group: ReleaseGroup) -> Result<(), ControlError>;
}

impl<A: SerialAdapter> HandActuator for InspireHand<A> {
    fn set_angles(&self, angles: &DofVector) -> Result<(), ControlError> {
        Ok(InspireHand::set_angles(self, angles.as_array())?)
    }

    fn current_angles(&self) -> Result<DofVector, ControlError> {
        Ok(self.get_angles(true)?)
    }

    fn set_speed(&self, speed: &DofVector) -> Result<(), ControlError> {
        Ok(InspireHand::set_speed(self, speed.as_array())?)
    }

    fn release(&self, group: ReleaseGroup) -> Result<(), ControlError> {
        Ok(InspireHand::release(self, group)?)
    }
}

/// 预设动作执行器（例如由动作序列编辑器提供）
pub trait ActionExecutor: Send + Sync {
    /// 执行命名动作，成功返回 `true`
    fn execute_named_action(&self, name: &str) -> bool;
}

impl<F> ActionExecutor for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn execute_named_action(&self, name: &str) -> bool {
        self(name)
    }
}
