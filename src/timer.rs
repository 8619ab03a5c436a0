// src/timer.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::session::{ExamSession, Phase};

/// The repeating task that counts an exam session down.
///
/// Owned by whoever started the attempt. Dropping it (or calling `cancel`)
/// aborts the task, so a discarded session is never ticked again. The task
/// also ends by itself once the session leaves `InProgress`.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
    remaining: watch::Receiver<u64>,
}

impl Countdown {
    /// Spawns the countdown on the current tokio runtime.
    ///
    /// `initial_remaining` is the budget the session was started with, read
    /// under the same lock as `start`. Every `quantum` the session is ticked
    /// by exactly `quantum`.
    pub fn spawn(
        session: Arc<Mutex<ExamSession>>,
        quantum: Duration,
        initial_remaining: u64,
    ) -> Self {
        let (tx, remaining) = watch::channel(initial_remaining);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(quantum);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                let mut session = session.lock().await;
                let phase = session.tick(quantum);
                tx.send_replace(session.remaining_millis());

                if phase != Phase::InProgress {
                    tracing::debug!(exam_id = %session.exam().id, ?phase, "Countdown stopped");
                    break;
                }
            }
        });

        Self { handle, remaining }
    }

    /// Remaining milliseconds, updated after every tick.
    pub fn remaining(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Waits until the task has stopped, by itself or through `cancel`.
    pub async fn finished(&mut self) {
        let _ = (&mut self.handle).await;
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
