//! 模拟模式：无硬件时的灵巧手和力传感器

use inspire_sdk::control::{SensorFeed, SensorId};
use inspire_sdk::protocol::Register;
use inspire_sdk::serial::mock::SimulatedHand;
use inspire_sdk::{DofVector, Finger};

/// 虚拟物体：四指角度低于 `contact` 后，Z 向力与平均压入深度成正比
pub struct ContactModel {
    sim: SimulatedHand,
    sensors: Vec<SensorId>,
    contact: i32,
    stiffness: f64,
}

impl ContactModel {
    pub fn new(sim: SimulatedHand, sensors: Vec<SensorId>) -> Self {
        Self {
            sim,
            sensors,
            contact: 700,
            stiffness: 0.02,
        }
    }

    fn depth(&self, angles: &DofVector) -> f64 {
        let total: i32 = Finger::FOUR_FINGERS
            .iter()
            .map(|&f| (self.contact - angles[f]).max(0))
            .sum();
        f64::from(total) / Finger::FOUR_FINGERS.len() as f64
    }
}

impl SensorFeed for ContactModel {
    fn latest_values(&self, id: SensorId) -> Option<[f32; 3]> {
        if !self.is_known(id) {
            return None;
        }
        let z = self.depth(&self.sim.peek(Register::AngleActual)) * self.stiffness;
        Some([0.0, 0.0, z as f32])
    }

    fn is_known(&self, id: SensorId) -> bool {
        self.sensors.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_grows_past_contact() {
        let sim = SimulatedHand::new(1);
        let model = ContactModel::new(sim.clone(), vec![1, 2]);
        assert!(model.is_known(2));
        assert!(!model.is_known(3));
        assert_eq!(model.latest_values(3), None);

        // 初始全开
        assert_eq!(model.latest_values(1), Some([0.0, 0.0, 0.0]));

        sim.poke(Register::AngleActual, DofVector::splat(500));
        assert_eq!(model.latest_values(1), Some([0.0, 0.0, 4.0]));
    }
}
