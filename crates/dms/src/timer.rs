//! Dwell-time trigger

use std::time::{Duration, Instant};
use tracing::debug;

/// Result of one timer update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimerUpdate {
    /// Condition has held for the full limit
    pub triggered: bool,
    /// Elapsed share of the limit, in [0, 1]
    pub progress: f64,
}

/// Converts a boolean condition into a "held long enough" trigger.
///
/// Any frame with the condition false fully resets the timer; there is no
/// partial decay.
#[derive(Debug, Clone)]
pub struct EventTimer {
    limit: Duration,
    start: Option<Instant>,
    progress: f64,
    triggered: bool,
}

impl EventTimer {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            start: None,
            progress: 0.0,
            triggered: false,
        }
    }

    pub fn update(&mut self, condition: bool, now: Instant) -> TimerUpdate {
        if condition {
            let start = *self.start.get_or_insert(now);
            let elapsed = now.saturating_duration_since(start);
            self.progress = if self.limit.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f64() / self.limit.as_secs_f64()).min(1.0)
            };
            if elapsed >= self.limit && !self.triggered {
                debug!("Event timer triggered after {:?}", elapsed);
                self.triggered = true;
            }
        } else {
            self.reset();
        }
        self.state()
    }

    pub fn state(&self) -> TimerUpdate {
        TimerUpdate {
            triggered: self.triggered,
            progress: self.progress,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Push the start instant forward so a gap does not count as dwell time
    pub fn shift(&mut self, by: Duration) {
        if let Some(start) = self.start.as_mut() {
            *start += by;
        }
    }

    pub fn reset(&mut self) {
        self.start = None;
        self.progress = 0.0;
        self.triggered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_triggers_at_exact_limit() {
        let t0 = Instant::now();
        let mut timer = EventTimer::new(ms(1500));

        let first = timer.update(true, t0);
        assert!(!first.triggered);
        assert_eq!(first.progress, 0.0);

        let mid = timer.update(true, t0 + ms(750));
        assert!(!mid.triggered);
        assert!((mid.progress - 0.5).abs() < 1e-9);

        let done = timer.update(true, t0 + ms(1500));
        assert!(done.triggered);
        assert_eq!(done.progress, 1.0);
    }

    #[test]
    fn test_stays_triggered_while_condition_holds() {
        let t0 = Instant::now();
        let mut timer = EventTimer::new(ms(100));
        timer.update(true, t0);
        timer.update(true, t0 + ms(100));
        let later = timer.update(true, t0 + ms(5000));
        assert!(later.triggered);
        assert_eq!(later.progress, 1.0);
    }

    #[test]
    fn test_single_false_frame_resets() {
        let t0 = Instant::now();
        let mut timer = EventTimer::new(ms(1000));
        timer.update(true, t0);
        timer.update(true, t0 + ms(900));

        let reset = timer.update(false, t0 + ms(933));
        assert_eq!(reset, TimerUpdate { triggered: false, progress: 0.0 });
        assert!(!timer.is_running());

        // Dwell restarts from the next true frame
        timer.update(true, t0 + ms(966));
        let after = timer.update(true, t0 + ms(1900));
        assert!(!after.triggered);
    }

    #[test]
    fn test_false_after_trigger_clears_it() {
        let t0 = Instant::now();
        let mut timer = EventTimer::new(ms(200));
        timer.update(true, t0);
        assert!(timer.update(true, t0 + ms(250)).triggered);
        assert!(!timer.update(false, t0 + ms(260)).triggered);
    }

    #[test]
    fn test_shift_excludes_gap() {
        let t0 = Instant::now();
        let mut timer = EventTimer::new(ms(1000));
        timer.update(true, t0);
        timer.update(true, t0 + ms(600));

        timer.shift(ms(2000));
        let resumed = timer.update(true, t0 + ms(2700));
        assert!(!resumed.triggered);
        assert!((resumed.progress - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_shift_idle_timer_is_noop() {
        let t0 = Instant::now();
        let mut timer = EventTimer::new(ms(100));
        timer.shift(ms(50));
        timer.update(true, t0);
        assert!(timer.update(true, t0 + ms(100)).triggered);
    }
}
