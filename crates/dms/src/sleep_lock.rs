//! Latched sleep alert with sustained-recovery release

use std::time::{Duration, Instant};
use tracing::debug;

use crate::timer::EventTimer;

/// Sleep signal for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SleepStatus {
    /// Final sleeping signal (forced true while locked and on the release frame)
    pub sleeping: bool,
    /// Sleep bar progress (forced 1.0 while locked and on the release frame)
    pub progress: f64,
    pub locked: bool,
    /// Share of the recovery interval completed while locked
    pub recovery_progress: f64,
}

/// Two event timers forming latch/release hysteresis for the sleep alert.
///
/// The onset timer latches the lock; only the recovery timer, fed
/// `!is_sleeping_raw` continuously for its full limit, releases it. The
/// release frame itself still reports sleeping at full progress, unlocked;
/// raw signals take over from the next frame.
#[derive(Debug, Clone)]
pub struct SleepLockController {
    onset: EventTimer,
    recovery: EventTimer,
    locked: bool,
}

impl SleepLockController {
    pub fn new(time_to_sleep: Duration, recovery_time: Duration) -> Self {
        Self {
            onset: EventTimer::new(time_to_sleep),
            recovery: EventTimer::new(recovery_time),
            locked: false,
        }
    }

    pub fn update(&mut self, is_sleeping_raw: bool, now: Instant) -> SleepStatus {
        let onset = self.onset.update(is_sleeping_raw, now);

        if onset.triggered && !self.locked {
            debug!("Sleep lock latched");
            self.locked = true;
        }

        if !self.locked {
            self.recovery.update(false, now);
            return SleepStatus {
                sleeping: is_sleeping_raw,
                progress: onset.progress,
                locked: false,
                recovery_progress: 0.0,
            };
        }

        let recovery = self.recovery.update(!is_sleeping_raw, now);
        if recovery.triggered {
            debug!("Sleep lock released after sustained recovery");
            self.reset();
            return SleepStatus {
                sleeping: true,
                progress: 1.0,
                locked: false,
                recovery_progress: 1.0,
            };
        }

        SleepStatus {
            sleeping: true,
            progress: 1.0,
            locked: true,
            recovery_progress: recovery.progress,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn shift(&mut self, by: Duration) {
        self.onset.shift(by);
        self.recovery.shift(by);
    }

    pub fn reset(&mut self) {
        self.onset.reset();
        self.recovery.reset();
        self.locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Feed `sleeping` every 100ms over `[from_ms, to_ms]`, return last status
    fn feed(lock: &mut SleepLockController, t0: Instant, from_ms: u64, to_ms: u64, sleeping: bool) -> SleepStatus {
        let mut status = SleepStatus::default();
        let mut t = from_ms;
        while t <= to_ms {
            status = lock.update(sleeping, t0 + ms(t));
            t += 100;
        }
        status
    }

    #[test]
    fn test_unlocked_reports_raw_signal() {
        let t0 = Instant::now();
        let mut lock = SleepLockController::new(ms(1500), ms(2000));
        let status = feed(&mut lock, t0, 0, 700, true);
        assert!(status.sleeping);
        assert!(!status.locked);
        assert!((status.progress - 0.7 / 1.5).abs() < 1e-9);

        let open = lock.update(false, t0 + ms(800));
        assert!(!open.sleeping);
        assert_eq!(open.progress, 0.0);
    }

    #[test]
    fn test_brief_glances_do_not_unlock() {
        let t0 = Instant::now();
        let mut lock = SleepLockController::new(ms(1500), ms(2000));
        assert!(feed(&mut lock, t0, 0, 1500, true).locked);

        // Alternate open/closed for several seconds
        for i in 0..60u64 {
            let status = lock.update(i % 2 == 0, t0 + ms(1600 + i * 100));
            assert!(status.locked);
            assert!(status.sleeping);
            assert_eq!(status.progress, 1.0);
        }
    }

    #[test]
    fn test_sustained_recovery_unlocks() {
        let t0 = Instant::now();
        let mut lock = SleepLockController::new(ms(1500), ms(2000));
        feed(&mut lock, t0, 0, 2000, true);
        assert!(lock.is_locked());

        // Eyes open from 2.1s; one second is not enough
        let partial = feed(&mut lock, t0, 2100, 3100, false);
        assert!(partial.locked);
        assert!(partial.sleeping);
        assert!((partial.recovery_progress - 0.5).abs() < 1e-9);

        // Full 2.0s of open eyes releases the lock
        let released = feed(&mut lock, t0, 3200, 4100, false);
        assert!(!released.locked);
        assert!(!lock.is_locked());

        let after = lock.update(false, t0 + ms(4200));
        assert!(!after.sleeping);
        assert_eq!(after.progress, 0.0);
    }

    #[test]
    fn test_release_frame_still_reports_sleeping() {
        let t0 = Instant::now();
        let mut lock = SleepLockController::new(ms(1500), ms(2000));
        feed(&mut lock, t0, 0, 1500, true);

        let last_locked = feed(&mut lock, t0, 1600, 3500, false);
        assert!(last_locked.locked);
        assert!((last_locked.recovery_progress - 0.95).abs() < 1e-9);

        let release = lock.update(false, t0 + ms(3600));
        assert_eq!(
            release,
            SleepStatus {
                sleeping: true,
                progress: 1.0,
                locked: false,
                recovery_progress: 1.0,
            }
        );

        // Raw signal from the next frame on, with a fresh onset
        let next = lock.update(true, t0 + ms(3700));
        assert!(next.sleeping);
        assert!(!next.locked);
        assert_eq!(next.progress, 0.0);
    }

    #[test]
    fn test_closing_again_restarts_recovery() {
        let t0 = Instant::now();
        let mut lock = SleepLockController::new(ms(1500), ms(2000));
        feed(&mut lock, t0, 0, 1500, true);
        feed(&mut lock, t0, 1600, 3400, false);
        assert!(lock.update(true, t0 + ms(3500)).locked);

        let status = feed(&mut lock, t0, 3600, 5500, false);
        assert!(status.locked);
        assert!(!feed(&mut lock, t0, 5600, 5600, false).locked);
    }

    #[test]
    fn test_relatch_after_release_needs_full_onset() {
        let t0 = Instant::now();
        let mut lock = SleepLockController::new(ms(1500), ms(2000));
        feed(&mut lock, t0, 0, 1500, true);
        feed(&mut lock, t0, 1600, 3600, false);
        assert!(!lock.is_locked());

        let status = feed(&mut lock, t0, 3700, 4700, true);
        assert!(!status.locked);
        assert!(feed(&mut lock, t0, 4800, 5200, true).locked);
    }

    proptest! {
        #[test]
        fn prop_short_open_runs_never_unlock(runs in prop::collection::vec(1u64..20, 1..30)) {
            let t0 = Instant::now();
            let mut lock = SleepLockController::new(ms(1500), ms(2000));
            feed(&mut lock, t0, 0, 1500, true);

            // Open runs of at most 1.9s, each cut by one closed frame
            let mut t = 1600;
            for run in runs {
                for _ in 0..run {
                    prop_assert!(lock.update(false, t0 + ms(t)).locked);
                    t += 100;
                }
                prop_assert!(lock.update(true, t0 + ms(t)).locked);
                t += 100;
            }
        }
    }
}
