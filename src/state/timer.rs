//! Phase timers
//!
//! Timer tasks never touch game state. They only post [`TimerEvent`]s back
//! into the session loop, tagged with the epoch they were scheduled under.
//! Every transition cancels the running task and bumps the epoch, so an
//! event that slipped through before the abort is still recognised as stale.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One countdown interval elapsed
    Tick { epoch: u64 },
    /// The pause after showing results is over
    ResultsElapsed { epoch: u64 },
}

impl TimerEvent {
    pub fn epoch(&self) -> u64 {
        match self {
            TimerEvent::Tick { epoch } | TimerEvent::ResultsElapsed { epoch } => *epoch,
        }
    }
}

/// Handle to a spawned timer task, aborted on cancel or drop
#[derive(Debug)]
pub struct ScheduledTask(JoinHandle<()>);

impl ScheduledTask {
    pub fn cancel(self) {
        self.0.abort();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// The single timer slot owned by the phase engine
#[derive(Debug)]
pub struct PhaseTimer {
    events: mpsc::UnboundedSender<TimerEvent>,
    epoch: u64,
    seconds_left: Option<u32>,
    task: Option<ScheduledTask>,
}

impl PhaseTimer {
    pub fn new(events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            events,
            epoch: 0,
            seconds_left: None,
            task: None,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn seconds_left(&self) -> Option<u32> {
        self.seconds_left
    }

    pub fn is_scheduled(&self) -> bool {
        self.task.is_some()
    }

    /// Drop whatever is scheduled and invalidate its in-flight events
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.seconds_left = None;
        self.epoch += 1;
    }

    /// Whether an event belongs to the currently scheduled task
    pub fn is_current(&self, event: &TimerEvent) -> bool {
        event.epoch() == self.epoch && self.task.is_some()
    }

    /// Start a repeating countdown of `seconds` ticks, one per `interval`
    pub fn start_countdown(&mut self, seconds: u32, interval: Duration) {
        self.cancel();
        self.seconds_left = Some(seconds);

        let epoch = self.epoch;
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if events.send(TimerEvent::Tick { epoch }).is_err() {
                    break;
                }
            }
        });
        self.task = Some(ScheduledTask(handle));
    }

    /// Fire a single `ResultsElapsed` after `delay`
    pub fn schedule_results_delay(&mut self, delay: Duration) {
        self.cancel();

        let epoch = self.epoch;
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(TimerEvent::ResultsElapsed { epoch });
        });
        self.task = Some(ScheduledTask(handle));
    }

    /// Count one tick down, returning the seconds left
    pub fn tick(&mut self) -> Option<u32> {
        let left = self.seconds_left?.saturating_sub(1);
        self.seconds_left = Some(left);
        Some(left)
    }
}
