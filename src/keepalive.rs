use crate::frame::Frame;
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Periodic ping sender, started once a connection is open.
pub(crate) struct KeepAlive {
    interval: Duration,
}

impl KeepAlive {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawns the ticker task. Pings share the outbound frame channel with
    /// application sends, so they can't reorder against them. A zero interval
    /// means the timer is disabled.
    pub fn start(self, frame_tx: UnboundedSender<Frame>) -> KeepAliveHandle {
        if self.interval.is_zero() {
            return KeepAliveHandle { task: None };
        }

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately; the
            // first ping should go out one full interval after open.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if frame_tx.send(Frame::ping()).is_err() {
                    break;
                }
                debug!("keepalive ping queued");
            }
        });

        KeepAliveHandle { task: Some(task) }
    }
}

/// Owned handle to the ticker task. The read loop cancels it on every exit
/// path; `Drop` aborts as well so the task can't outlive its connection.
#[derive(Debug)]
pub(crate) struct KeepAliveHandle {
    task: Option<JoinHandle<()>>,
}

impl KeepAliveHandle {
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

impl Drop for KeepAliveHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
