//! Personal baseline calibration

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::DmsConfig;

/// Personalized thresholds derived from a neutral-face baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    /// EAR below this means eyes closed
    pub thresh_ear: f64,
    /// MAR above this means mouth wide open
    pub thresh_mar: f64,
    /// Neutral head yaw (degrees)
    pub base_yaw: f64,
    /// Neutral head pitch (degrees)
    pub base_pitch: f64,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            thresh_ear: 0.25,
            thresh_mar: 0.5,
            base_yaw: 0.0,
            base_pitch: 0.0,
        }
    }
}

/// Calibrator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationState {
    #[default]
    Idle,
    Collecting { started: Instant },
    Done,
}

#[derive(Debug, Clone, Default)]
struct Accumulators {
    ear: Vec<f64>,
    mar: Vec<f64>,
    pitch: Vec<f64>,
    yaw: Vec<f64>,
}

impl Accumulators {
    fn clear(&mut self) {
        self.ear.clear();
        self.mar.clear();
        self.pitch.clear();
        self.yaw.clear();
    }

    fn len(&self) -> usize {
        self.ear.len()
    }

    fn is_empty(&self) -> bool {
        self.ear.is_empty()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Collects a short window of smoothed signals and derives thresholds
#[derive(Debug, Clone)]
pub struct Calibrator {
    duration: Duration,
    ear_closed_ratio: f64,
    mar_yawn_margin: f64,
    fallback: CalibrationProfile,
    state: CalibrationState,
    samples: Accumulators,
}

impl Calibrator {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            duration: config.calibration_duration(),
            ear_closed_ratio: config.ear_closed_ratio,
            mar_yawn_margin: config.mar_yawn_margin,
            fallback: CalibrationProfile {
                thresh_ear: config.default_thresh_ear,
                thresh_mar: config.default_thresh_mar,
                base_yaw: 0.0,
                base_pitch: 0.0,
            },
            state: CalibrationState::Idle,
            samples: Accumulators::default(),
        }
    }

    /// Discard collected samples and begin a new window
    pub fn start(&mut self, now: Instant) {
        self.samples.clear();
        self.state = CalibrationState::Collecting { started: now };
        info!("Starting calibration ({:?}), keep face neutral", self.duration);
    }

    /// Append smoothed values; no-op unless collecting
    pub fn update(&mut self, ear: f64, mar: f64, pitch: f64, yaw: f64) {
        if !self.is_collecting() {
            return;
        }
        self.samples.ear.push(ear);
        self.samples.mar.push(mar);
        self.samples.pitch.push(pitch);
        self.samples.yaw.push(yaw);
    }

    /// Finish the window once its duration has elapsed, returning the profile
    pub fn poll(&mut self, now: Instant) -> Option<CalibrationProfile> {
        let CalibrationState::Collecting { started } = self.state else {
            return None;
        };
        if now.saturating_duration_since(started) < self.duration {
            return None;
        }

        let profile = self.compute_profile();
        self.state = CalibrationState::Done;
        Some(profile)
    }

    /// Window progress in [0, 1]; 0 when not collecting
    pub fn progress(&self, now: Instant) -> f64 {
        match self.state {
            CalibrationState::Collecting { started } if !self.duration.is_zero() => {
                let elapsed = now.saturating_duration_since(started).as_secs_f64();
                (elapsed / self.duration.as_secs_f64()).min(1.0)
            }
            _ => 0.0,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.state, CalibrationState::Collecting { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.state == CalibrationState::Done
    }

    /// Thresholds used when no baseline could be measured
    pub fn fallback(&self) -> CalibrationProfile {
        self.fallback
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.state = CalibrationState::Idle;
    }

    fn compute_profile(&self) -> CalibrationProfile {
        if self.samples.is_empty() {
            warn!("Calibration collected no samples, using default thresholds");
            return self.fallback;
        }

        let fallback = self.fallback;
        let profile = CalibrationProfile {
            thresh_ear: mean(&self.samples.ear).map_or(fallback.thresh_ear, |m| m * self.ear_closed_ratio),
            thresh_mar: mean(&self.samples.mar).map_or(fallback.thresh_mar, |m| m + self.mar_yawn_margin),
            base_yaw: mean(&self.samples.yaw).unwrap_or(fallback.base_yaw),
            base_pitch: mean(&self.samples.pitch).unwrap_or(fallback.base_pitch),
        };
        info!(
            "Calibration done from {} samples: EAR {:.2}, MAR {:.2}, yaw {:.1}, pitch {:.1}",
            self.samples.len(),
            profile.thresh_ear,
            profile.thresh_mar,
            profile.base_yaw,
            profile.base_pitch
        );
        profile
    }
}
