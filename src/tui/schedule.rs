//! Page timers and mount epochs.
//!
//! Each page starts its intervals when it is mounted and cancels them when it
//! is left. Requests carry the epoch of the page that issued them; a reply
//! from an older epoch is dropped instead of being written into a view that
//! no longer exists.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms.max(1)))
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true once per elapsed period. Missed periods collapse into a
    /// single firing.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lifecycle {
    epoch: u64,
    mounted: bool,
}

impl Lifecycle {
    pub fn mount(&mut self) -> u64 {
        self.epoch += 1;
        self.mounted = true;
        self.epoch
    }

    pub fn unmount(&mut self) {
        self.epoch += 1;
        self.mounted = false;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn accepts(&self, epoch: u64) -> bool {
        self.mounted && self.epoch == epoch
    }
}
