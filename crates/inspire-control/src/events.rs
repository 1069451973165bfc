//! 抓取事件与观察者
//!
//! 同一个 tick 内事件按 状态 → 进度 → 完成 的顺序发出。

use crate::force::ForceSample;
use crossbeam_channel::{Receiver, Sender, unbounded};

#[derive(Debug, Clone, PartialEq)]
pub enum GraspEvent {
    /// 人类可读的状态描述
    Status(String),
    Progress { current: u32, total: u32 },
    /// 会话结束，每个会话恰好一次
    Completed { success: bool, message: String },
    ForceSample(ForceSample),
}

impl GraspEvent {
    pub fn status(text: impl Into<String>) -> Self {
        GraspEvent::Status(text.into())
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, GraspEvent::Completed { .. })
    }
}

/// 事件接收者
///
/// 在工作线程上同步调用，实现者不应阻塞。
pub trait GraspObserver: Send + Sync {
    fn on_event(&self, event: &GraspEvent);
}

impl<F> GraspObserver for F
where
    F: Fn(&GraspEvent) + Send + Sync,
{
    fn on_event(&self, event: &GraspEvent) {
        self(event)
    }
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GraspObserver for NoopObserver {
    fn on_event(&self, _event: &GraspEvent) {}
}

/// 把事件转发到 crossbeam 通道
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<GraspEvent>,
}

impl ChannelObserver {
    /// 创建观察者和对应的接收端
    pub fn channel() -> (Self, Receiver<GraspEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl GraspObserver for ChannelObserver {
    fn on_event(&self, event: &GraspEvent) {
        // 接收端已关闭时静默丢弃
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_channel_observer_preserves_order() {
        let (observer, rx) = ChannelObserver::channel();
        observer.on_event(&GraspEvent::status("closing"));
        observer.on_event(&GraspEvent::Progress { current: 1, total: 10 });
        observer.on_event(&GraspEvent::Completed {
            success: true,
            message: "stable".into(),
        });

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], GraspEvent::Status(_)));
        assert!(matches!(events[1], GraspEvent::Progress { current: 1, total: 10 }));
        assert!(events[2].is_completed());
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (observer, rx) = ChannelObserver::channel();
        drop(rx);
        observer.on_event(&GraspEvent::status("ignored"));
    }

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: &GraspEvent| seen.lock().push(event.clone());
        observer.on_event(&GraspEvent::ForceSample(ForceSample::new(1.0, 2.0, 3.0)));
        NoopObserver.on_event(&GraspEvent::status("nothing"));
        assert_eq!(seen.lock().len(), 1);
    }
}
