//! Driver Monitoring System (DMS)
//!
//! Per-frame fatigue decisions from face biometrics:
//! - Personal baseline calibration
//! - Debounced sleep, yawn, and distraction triggers
//! - Latched sleep alert with sustained recovery
//! - Blink-rate and stillness-based liveness checks
//! - Continuous fatigue score and prioritized warnings

pub mod analysis;
pub mod blink;
pub mod calibration;
pub mod config;
pub mod liveness;
pub mod sample;
pub mod sleep_lock;
pub mod state;
pub mod timer;

pub use analysis::{ActiveBars, FrameReport};
pub use blink::{BlinkRateTracker, BlinkStatus};
pub use calibration::{CalibrationProfile, CalibrationState, Calibrator};
pub use config::DmsConfig;
pub use liveness::{LivenessGuard, LivenessVerdict};
pub use sample::{BiometricSample, FrameInput};
pub use sleep_lock::{SleepLockController, SleepStatus};
pub use state::{DriverState, SessionCommand, SessionMode};
pub use timer::{EventTimer, TimerUpdate};

use alerting::{AlertCondition, AlertingError, ScoreInputs, Warning, WarningKind};
use face_geometry::IrisPosition;
use signal_conditioner::{ConditionedSignals, SampleValidator, SignalConditioner};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command '{command}' is not allowed in {from}")]
    InvalidTransition { from: SessionMode, command: SessionCommand },

    #[error("Scoring configuration error: {0}")]
    Scoring(#[from] AlertingError),
}

/// One driver's monitoring session.
///
/// Fed one [`FrameInput`] per processed camera frame, strictly in time order.
pub struct DmsSession {
    config: DmsConfig,
    mode: SessionMode,
    validator: SampleValidator,
    conditioner: SignalConditioner,
    calibrator: Calibrator,
    profile: Option<CalibrationProfile>,
    state: DriverState,
    /// Start of the current no-face or spoof interval
    suspended_since: Option<Instant>,
    drive_started: Option<Instant>,
    rest_started: Option<Instant>,
}

impl DmsSession {
    /// Create a new session with configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        Ok(Self {
            validator: SampleValidator::new(config.validation.clone()),
            conditioner: SignalConditioner::new(config.smoothing_alpha),
            calibrator: Calibrator::new(&config),
            profile: None,
            state: DriverState::new(&config),
            mode: SessionMode::Idle,
            suspended_since: None,
            drive_started: None,
            rest_started: None,
            config,
        })
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Thresholds in use, `None` until a calibration completes
    pub fn profile(&self) -> Option<&CalibrationProfile> {
        self.profile.as_ref()
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    /// Times a warning of `kind` has been raised since the session was created
    pub fn warning_count(&self, kind: WarningKind) -> usize {
        self.state.arbiter.fire_count(kind)
    }

    /// Apply an external command
    pub fn command(&mut self, command: SessionCommand, now: Instant) -> Result<SessionMode, DmsError> {
        let target = self.mode.apply(command).ok_or(DmsError::InvalidTransition {
            from: self.mode,
            command,
        })?;

        match target {
            SessionMode::Calibrating => self.calibrator.start(now),
            SessionMode::Resting => {
                self.rest_started = Some(now);
                self.drive_started = None;
            }
            SessionMode::Idle => {
                self.profile = None;
                self.calibrator.reset();
                self.conditioner.reset();
                self.rest_started = None;
            }
            SessionMode::Running => {
                self.rest_started = None;
                self.drive_started = Some(now);
            }
        }
        self.enter(target);
        Ok(target)
    }

    /// Begin calibration (IDLE only)
    pub fn start_calibration(&mut self, now: Instant) -> Result<SessionMode, DmsError> {
        self.command(SessionCommand::Calibrate, now)
    }

    pub fn start_rest(&mut self, now: Instant) -> Result<SessionMode, DmsError> {
        self.command(SessionCommand::Rest, now)
    }

    pub fn resume(&mut self, now: Instant) -> Result<SessionMode, DmsError> {
        self.command(SessionCommand::Resume, now)
    }

    pub fn stop(&mut self, now: Instant) -> Result<SessionMode, DmsError> {
        self.command(SessionCommand::Stop, now)
    }

    /// Reset driver state (on driver change) without leaving the current mode
    pub fn reset_state(&mut self) {
        self.state.reset();
        self.suspended_since = None;
    }

    /// Run one frame through the decision pipeline
    pub fn process(&mut self, input: &FrameInput) -> FrameReport {
        let now = input.timestamp();
        let sample = input.sample().filter(|sample| {
            match self
                .validator
                .validate(sample.ear, sample.mar, sample.pitch_deg, sample.yaw_deg)
            {
                Ok(()) => true,
                Err(e) => {
                    warn!("Dropping implausible sample: {}", e);
                    false
                }
            }
        });

        metrics::counter!("dms_frames_total", "face" => if sample.is_some() { "true" } else { "false" })
            .increment(1);

        let signals = sample.map(|s| self.conditioner.update(s.ear, s.mar, s.pitch_deg, s.yaw_deg));

        let report = match self.mode {
            SessionMode::Idle => self.base_report(signals.is_some(), now),
            SessionMode::Calibrating => self.calibrating_frame(signals, now),
            SessionMode::Running => match (sample, signals) {
                (Some(sample), Some(signals)) => self.running_frame(sample, signals, now),
                _ => self.frozen_frame(now),
            },
            SessionMode::Resting => self.base_report(signals.is_some(), now),
        };

        metrics::gauge!("dms_fatigue_score").set(f64::from(report.fatigue_score));
        report
    }

    fn calibrating_frame(&mut self, signals: Option<ConditionedSignals>, now: Instant) -> FrameReport {
        if let Some(s) = signals {
            self.calibrator.update(s.ear, s.mar, s.pitch, s.yaw);
        }
        let progress = self.calibrator.progress(now);

        if let Some(profile) = self.calibrator.poll(now) {
            self.profile = Some(profile);
            self.drive_started = Some(now);
            self.enter(SessionMode::Running);
        }

        FrameReport {
            calibration_progress: if self.mode == SessionMode::Running { 1.0 } else { progress },
            ..self.base_report(signals.is_some(), now)
        }
    }

    /// No usable face while RUNNING: freeze timers and repeat the last bars
    fn frozen_frame(&mut self, now: Instant) -> FrameReport {
        if self.suspended_since.is_none() {
            debug!("Face lost, freezing decision timers");
            self.suspended_since = Some(now);
        }
        FrameReport {
            active_bars: self.state.last_bars,
            ..self.base_report(false, now)
        }
    }

    fn running_frame(&mut self, sample: &BiometricSample, s: ConditionedSignals, now: Instant) -> FrameReport {
        if let Some(since) = self.suspended_since.take() {
            let gap = now.saturating_duration_since(since);
            debug!("Resuming decisions after {:?} suspension", gap);
            self.state.shift(gap);
        }

        let profile = self.profile.unwrap_or_else(|| self.calibrator.fallback());
        let eyes_closed = s.ear < profile.thresh_ear;

        let blink = self.state.blink.update(eyes_closed, now);
        self.state.liveness.observe(sample.nose, sample.iris_center);
        let verdict = self.state.liveness.check(blink.count);

        if verdict.spoof_suspect {
            if !self.state.spoof_suspect {
                warn!(
                    "Static face without blinks (nose var {:?}, iris var {:?}), suspending decisions",
                    verdict.nose_variance, verdict.iris_variance
                );
            }
            metrics::counter!("dms_spoof_suspect_total").increment(1);
            self.state.spoof_suspect = true;
            self.suspended_since = Some(now);

            let warning = self.raise_warning(None);
            let mut bars = self.state.last_bars;
            bars.blink_count = blink.count;
            return FrameReport {
                active_bars: bars,
                warning,
                spoof_suspect: true,
                ..self.base_report(true, now)
            };
        }
        if self.state.spoof_suspect {
            info!("Liveness confirmed, resuming decisions");
            self.state.spoof_suspect = false;
        }

        let pitch_offset = s.pitch - profile.base_pitch;
        let (pitch_min, pitch_max) = self.config.sleep_pitch_range;
        let sleep_posture = (pitch_min..=pitch_max).contains(&pitch_offset);
        let sleep = self.state.sleep_lock.update(eyes_closed && sleep_posture, now);

        let yawning = s.mar > profile.thresh_mar;
        let yawn = self.state.yawn_timer.update(yawning, now);

        let distracted = self.is_distracted(&s, sample.iris, &profile);
        let distraction = self.state.distraction_timer.update(distracted, now);

        self.state.score.update(
            &ScoreInputs {
                sleeping: sleep.sleeping,
                yawning,
                distracted,
                rapid_blink: blink.rapid,
                can_heal: !sleep.locked,
            },
            now,
        );

        let mut conditions = Vec::with_capacity(4);
        if sleep.locked {
            conditions.push(AlertCondition::SleepLocked {
                recovery_progress: sleep.recovery_progress,
            });
        }
        if distraction.triggered {
            conditions.push(AlertCondition::Distraction);
        }
        if yawn.triggered {
            conditions.push(AlertCondition::Yawn);
        }
        let drive_time = self
            .drive_started
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        if drive_time >= self.config.max_drive_time() {
            conditions.push(AlertCondition::DriveOvertime { drive_time });
        }

        let warning = self.raise_warning(Some(conditions.as_slice()));

        let bars = ActiveBars {
            sleep_progress: sleep.progress,
            yawn_progress: yawn.progress,
            distraction_progress: distraction.progress,
            blink_count: blink.count,
            recovery_progress: sleep.recovery_progress,
            rapid_blink: blink.rapid,
        };
        self.state.last_bars = bars;

        FrameReport {
            active_bars: bars,
            warning,
            ..self.base_report(true, now)
        }
    }

    /// Head turned far from baseline, or turned moderately with the gaze following
    fn is_distracted(&self, s: &ConditionedSignals, iris: IrisPosition, profile: &CalibrationProfile) -> bool {
        let diff_yaw = (s.yaw - profile.base_yaw).abs();
        let diff_pitch = (s.pitch - profile.base_pitch).abs();

        if diff_yaw > self.config.distraction_yaw_degrees || diff_pitch > self.config.distraction_pitch_degrees {
            return true;
        }

        let gaze_follows = (s.yaw < profile.base_yaw && iris == IrisPosition::Left)
            || (s.yaw > profile.base_yaw && iris == IrisPosition::Right);
        diff_yaw > self.config.gaze_yaw_degrees && gaze_follows
    }

    /// Arbitrate `conditions`, or raise the liveness prompt when `None`
    fn raise_warning(&mut self, conditions: Option<&[AlertCondition]>) -> Option<Warning> {
        let before = self.state.arbiter.active();
        let warning = match conditions {
            Some(conditions) => self.state.arbiter.select(conditions),
            None => Some(self.state.arbiter.raise(Warning::verify_liveness())),
        };

        let kind: Option<WarningKind> = warning.as_ref().map(|w| w.kind);
        if let Some(kind) = kind.filter(|k| Some(*k) != before) {
            metrics::counter!("dms_warnings_total", "kind" => kind.as_str()).increment(1);
        }
        warning
    }

    fn enter(&mut self, target: SessionMode) {
        info!("DMS mode {} -> {}", self.mode, target);
        metrics::counter!("dms_mode_transitions_total").increment(1);
        self.mode = target;
        self.reset_state();
    }

    fn base_report(&self, face_detected: bool, now: Instant) -> FrameReport {
        let elapsed = |start: Option<Instant>| {
            start
                .map(|s| now.saturating_duration_since(s).as_secs_f64())
                .unwrap_or(0.0)
        };

        FrameReport {
            mode: self.mode,
            face_detected,
            fatigue_score: self.state.score.score_int(),
            level: self.state.score.level(),
            active_bars: ActiveBars::default(),
            warning: None,
            calibration_progress: 0.0,
            spoof_suspect: false,
            drive_time_secs: if self.mode == SessionMode::Running {
                elapsed(self.drive_started)
            } else {
                0.0
            },
            rest_time_secs: if self.mode == SessionMode::Resting {
                elapsed(self.rest_started)
            } else {
                0.0
            },
        }
    }
}
