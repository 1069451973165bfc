//! 命令定义和实现

pub mod grasp;
pub mod hand;

pub use grasp::GraspArgs;
pub use hand::HandCommand;
