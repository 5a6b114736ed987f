use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::prompts::{INITIAL_STATUS, STATUS_MESSAGES};

/// Cycles cosmetic status lines into a watch channel while a request runs.
///
/// The background task is stopped by [`StatusTicker::stop`] or, on any other
/// exit path, when the ticker is dropped.
pub struct StatusTicker {
    handle: Option<JoinHandle<()>>,
    stop: Option<watch::Sender<bool>>,
}

impl StatusTicker {
    pub fn start(period: Duration, status_tx: watch::Sender<String>) -> Self {
        status_tx.send_replace(INITIAL_STATUS.to_string());

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut index = 0usize;
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        index = (index + 1) % STATUS_MESSAGES.len();
                        status_tx.send_replace(STATUS_MESSAGES[index].to_string());
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            handle: Some(handle),
            stop: Some(stop_tx),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
