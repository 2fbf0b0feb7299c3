//! Cancellable repeating timer for temporal playback.
//!
//! [`PlaybackTimer::start`] spawns a task that calls the tick callback once
//! per period. Each tick runs while holding the handle's gate, and
//! [`PlaybackHandle::stop`] takes the same gate before marking the timer
//! stopped, so once `stop` returns no tick can run. The callback can end
//! playback itself by returning [`TickControl::Stop`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// What the timer should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy)]
pub struct PlaybackTimer {
    period: Duration,
}

impl PlaybackTimer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking. The first tick fires one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, mut tick: F) -> PlaybackHandle
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let gate = Arc::new(Mutex::new(Gate::Running));
        let task_gate = Arc::clone(&gate);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let mut gate = task_gate.lock();
                if *gate == Gate::Stopped {
                    break;
                }
                if tick() == TickControl::Stop {
                    *gate = Gate::Stopped;
                    tracing::debug!("playback timer stopped itself");
                    break;
                }
            }
        });

        PlaybackHandle {
            gate,
            task: Mutex::new(Some(task)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Running,
    Stopped,
}

/// Handle to a running timer. Dropping the handle stops the timer.
#[derive(Debug)]
pub struct PlaybackHandle {
    gate: Arc<Mutex<Gate>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackHandle {
    /// Stop the timer. Idempotent; returns `true` only for the call that
    /// actually stopped a running timer.
    ///
    /// Must not be called from inside the tick callback; return
    /// [`TickControl::Stop`] there instead.
    pub fn stop(&self) -> bool {
        let was_running = {
            let mut gate = self.gate.lock();
            let was_running = *gate == Gate::Running;
            *gate = Gate::Stopped;
            was_running
        };
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        was_running
    }

    pub fn is_active(&self) -> bool {
        *self.gate.lock() == Gate::Running
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        // The handle may be dropped from inside a tick, which already holds the gate.
        if let Some(mut gate) = self.gate.try_lock() {
            *gate = Gate::Stopped;
        }
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
