//! Blink-rate tracking over a rolling horizon

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Blink statistics for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkStatus {
    /// An open→closed transition happened on this frame
    pub blinked: bool,
    /// Blinks within the horizon
    pub count: usize,
    /// Count reached the rapid-blink threshold
    pub rapid: bool,
}

/// Counts eye-closure edges within a sliding time window
#[derive(Debug, Clone)]
pub struct BlinkRateTracker {
    window: Duration,
    threshold: usize,
    /// Closure edges, oldest first
    timestamps: VecDeque<Instant>,
    closed_prev: bool,
}

impl BlinkRateTracker {
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            window,
            threshold,
            timestamps: VecDeque::new(),
            closed_prev: false,
        }
    }

    /// Feed this frame's eye state
    pub fn update(&mut self, eyes_closed: bool, now: Instant) -> BlinkStatus {
        let blinked = eyes_closed && !self.closed_prev;
        if blinked {
            self.push(now);
        }
        self.closed_prev = eyes_closed;

        let count = self.count_at(now);
        BlinkStatus {
            blinked,
            count,
            rapid: count >= self.threshold,
        }
    }

    /// Record a closure edge
    pub fn push(&mut self, at: Instant) {
        self.timestamps.push_back(at);
    }

    /// Evict entries older than the window and return what remains
    pub fn count_at(&mut self, now: Instant) -> usize {
        while let Some(&front) = self.timestamps.front() {
            if now.saturating_duration_since(front) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        self.timestamps.len()
    }

    /// Count without eviction
    pub fn count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &Instant> + '_ {
        self.timestamps.iter()
    }

    pub fn reset(&mut self) {
        self.timestamps.clear();
        self.closed_prev = false;
    }
}
