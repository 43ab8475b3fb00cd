//! Cancellable repeating tick task.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A background task that emits one tick per `period`.
///
/// The first tick arrives one full period after start. Once cancelled (or
/// dropped) no further tick is delivered, including any already queued.
#[derive(Debug)]
pub struct Countdown {
    ticks: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
    cancelled: bool,
}

impl Countdown {
    /// Spawn the tick task on the current tokio runtime.
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self {
            ticks,
            handle,
            cancelled: false,
        }
    }

    /// Wait for the next tick. Returns `None` once cancelled.
    pub async fn tick(&mut self) -> Option<()> {
        if self.cancelled {
            return None;
        }
        self.ticks.recv().await
    }

    /// Stop the task. Idempotent.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            self.cancelled = true;
            self.handle.abort();
            self.ticks.close();
            tracing::debug!("countdown cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
