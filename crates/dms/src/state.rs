//! Session mode and per-driver decision state

use alerting::{ScoreManager, WarningArbiter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::analysis::ActiveBars;
use crate::blink::BlinkRateTracker;
use crate::liveness::LivenessGuard;
use crate::sleep_lock::SleepLockController;
use crate::timer::EventTimer;
use crate::DmsConfig;

/// Top-level session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionMode {
    /// Awaiting a manual calibration start
    #[default]
    Idle,
    Calibrating,
    Running,
    Resting,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Calibrating => "CALIBRATING",
            Self::Running => "RUNNING",
            Self::Resting => "RESTING",
        };
        f.write_str(name)
    }
}

/// Explicit external commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionCommand {
    /// IDLE → CALIBRATING
    Calibrate,
    /// RUNNING → RESTING
    Rest,
    /// RESTING → RUNNING
    Resume,
    /// RESTING → IDLE, discards the calibration profile
    Stop,
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Calibrate => "calibrate",
            Self::Rest => "rest",
            Self::Resume => "resume",
            Self::Stop => "stop",
        };
        f.write_str(name)
    }
}

impl SessionMode {
    /// Target mode for a command, `None` if the command is not allowed here.
    /// CALIBRATING → RUNNING happens only on calibration completion.
    pub fn apply(self, command: SessionCommand) -> Option<SessionMode> {
        match (self, command) {
            (Self::Idle, SessionCommand::Calibrate) => Some(Self::Calibrating),
            (Self::Running, SessionCommand::Rest) => Some(Self::Resting),
            (Self::Resting, SessionCommand::Resume) => Some(Self::Running),
            (Self::Resting, SessionCommand::Stop) => Some(Self::Idle),
            _ => None,
        }
    }
}

/// Everything the RUNNING decision pipeline accumulates for one driver.
///
/// Owned by the session and reset as a unit on every mode transition so no
/// stale trigger survives a mode change.
#[derive(Debug)]
pub struct DriverState {
    pub sleep_lock: SleepLockController,
    pub yawn_timer: EventTimer,
    pub distraction_timer: EventTimer,
    pub blink: BlinkRateTracker,
    pub liveness: LivenessGuard,
    pub score: ScoreManager,
    pub arbiter: WarningArbiter,
    /// Bars from the last decision frame, reported while frozen
    pub last_bars: ActiveBars,
    /// Spoof suspicion on the previous frame
    pub spoof_suspect: bool,
}

impl DriverState {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            sleep_lock: SleepLockController::new(config.time_to_sleep(), config.sleep_recovery()),
            yawn_timer: EventTimer::new(config.time_to_yawn()),
            distraction_timer: EventTimer::new(config.time_to_distract()),
            blink: BlinkRateTracker::new(config.blink_window(), config.blink_rate_threshold),
            liveness: LivenessGuard::new(
                config.liveness_history_len,
                config.liveness_min_samples,
                config.static_variance_threshold,
            ),
            score: ScoreManager::new(config.scoring.clone()),
            arbiter: WarningArbiter::new(),
            last_bars: ActiveBars::default(),
            spoof_suspect: false,
        }
    }

    /// Exclude a suspended interval from every dwell timer and the score clock
    pub fn shift(&mut self, gap: Duration) {
        self.sleep_lock.shift(gap);
        self.yawn_timer.shift(gap);
        self.distraction_timer.shift(gap);
        self.score.shift_clock(gap);
    }

    /// Reset timers, blink window, liveness history, lock state, and score
    pub fn reset(&mut self) {
        self.sleep_lock.reset();
        self.yawn_timer.reset();
        self.distraction_timer.reset();
        self.blink.reset();
        self.liveness.reset();
        self.score.reset();
        self.arbiter.clear();
        self.last_bars = ActiveBars::default();
        self.spoof_suspect = false;
    }
}
