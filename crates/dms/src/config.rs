//! DMS configuration

use alerting::ScoringConfig;
use serde::{Deserialize, Serialize};
use signal_conditioner::ValidationConfig;
use std::time::Duration;

use crate::DmsError;

/// DMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// EMA smoothing factor for EAR/MAR/yaw/pitch, in (0, 1)
    pub smoothing_alpha: f64,

    /// Baseline collection window (milliseconds)
    pub calibration_ms: u64,

    /// Closed-eye threshold as a fraction of the open-eye baseline EAR
    pub ear_closed_ratio: f64,

    /// Yawn threshold margin added to the neutral MAR
    pub mar_yawn_margin: f64,

    /// EAR threshold used when calibration saw no face
    pub default_thresh_ear: f64,

    /// MAR threshold used when calibration saw no face
    pub default_thresh_mar: f64,

    /// Eyes closed (in sleep posture) before the sleep alert (milliseconds)
    pub time_to_sleep_ms: u64,

    /// Mouth open before the yawn alert (milliseconds)
    pub time_to_yawn_ms: u64,

    /// Looking away before the distraction alert (milliseconds)
    pub time_to_distract_ms: u64,

    /// Continuous open eyes needed to release the sleep lock (milliseconds)
    pub sleep_recovery_ms: u64,

    /// Pitch offset from baseline (degrees) that still counts as a sleep posture
    pub sleep_pitch_range: (f64, f64),

    /// Yaw offset (degrees) that alone means distraction
    pub distraction_yaw_degrees: f64,

    /// Pitch offset (degrees) that alone means distraction
    pub distraction_pitch_degrees: f64,

    /// Yaw offset (degrees) that means distraction when the gaze agrees
    pub gaze_yaw_degrees: f64,

    /// Blink-rate horizon (milliseconds)
    pub blink_window_ms: u64,

    /// Blinks within the horizon that count as rapid blinking
    pub blink_rate_threshold: usize,

    /// Positions kept per liveness history
    pub liveness_history_len: usize,

    /// Positions required before a variance is computed
    pub liveness_min_samples: usize,

    /// Position variance (pixels²) below which a landmark is "static"
    pub static_variance_threshold: f64,

    /// Continuous driving before a rest is demanded (milliseconds)
    pub max_drive_time_ms: u64,

    /// Score rates and bands
    pub scoring: ScoringConfig,

    /// Plausible ranges for raw scalars
    pub validation: ValidationConfig,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.3,
            calibration_ms: 3000,
            ear_closed_ratio: 0.6,
            mar_yawn_margin: 0.3,
            default_thresh_ear: 0.25,
            default_thresh_mar: 0.5,
            time_to_sleep_ms: 1500,
            time_to_yawn_ms: 3000,
            time_to_distract_ms: 2500,
            sleep_recovery_ms: 2000,
            sleep_pitch_range: (-10.0, 25.0),
            distraction_yaw_degrees: 40.0,
            distraction_pitch_degrees: 25.0,
            gaze_yaw_degrees: 15.0,
            blink_window_ms: 10_000,
            blink_rate_threshold: 8,
            liveness_history_len: 60,
            liveness_min_samples: 20,
            static_variance_threshold: 15.0,
            max_drive_time_ms: 2 * 60 * 60 * 1000,
            scoring: ScoringConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl DmsConfig {
    /// Create strict config (lower thresholds)
    pub fn strict() -> Self {
        Self {
            time_to_sleep_ms: 1000,
            time_to_yawn_ms: 2000,
            time_to_distract_ms: 1500,
            sleep_recovery_ms: 3000,
            distraction_yaw_degrees: 30.0,
            max_drive_time_ms: 90 * 60 * 1000,
            ..Default::default()
        }
    }

    /// Create lenient config (higher thresholds)
    pub fn lenient() -> Self {
        Self {
            time_to_sleep_ms: 2500,
            time_to_yawn_ms: 4000,
            time_to_distract_ms: 4000,
            sleep_recovery_ms: 1500,
            distraction_yaw_degrees: 50.0,
            max_drive_time_ms: 3 * 60 * 60 * 1000,
            ..Default::default()
        }
    }

    pub fn calibration_duration(&self) -> Duration {
        Duration::from_millis(self.calibration_ms)
    }

    pub fn time_to_sleep(&self) -> Duration {
        Duration::from_millis(self.time_to_sleep_ms)
    }

    pub fn time_to_yawn(&self) -> Duration {
        Duration::from_millis(self.time_to_yawn_ms)
    }

    pub fn time_to_distract(&self) -> Duration {
        Duration::from_millis(self.time_to_distract_ms)
    }

    pub fn sleep_recovery(&self) -> Duration {
        Duration::from_millis(self.sleep_recovery_ms)
    }

    pub fn blink_window(&self) -> Duration {
        Duration::from_millis(self.blink_window_ms)
    }

    pub fn max_drive_time(&self) -> Duration {
        Duration::from_millis(self.max_drive_time_ms)
    }

    /// Reject settings the decision engine cannot run with
    pub fn validate(&self) -> Result<(), DmsError> {
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha < 1.0) {
            return Err(DmsError::Config(format!(
                "smoothing_alpha must be in (0, 1), got {}",
                self.smoothing_alpha
            )));
        }

        let durations = [
            ("calibration_ms", self.calibration_ms),
            ("time_to_sleep_ms", self.time_to_sleep_ms),
            ("time_to_yawn_ms", self.time_to_yawn_ms),
            ("time_to_distract_ms", self.time_to_distract_ms),
            ("sleep_recovery_ms", self.sleep_recovery_ms),
            ("blink_window_ms", self.blink_window_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(DmsError::Config(format!("{} must be greater than zero", name)));
        }

        if self.blink_rate_threshold == 0 {
            return Err(DmsError::Config("blink_rate_threshold must be at least 1".into()));
        }

        if self.liveness_min_samples == 0 || self.liveness_min_samples > self.liveness_history_len {
            return Err(DmsError::Config(format!(
                "liveness_min_samples ({}) must be in 1..={}",
                self.liveness_min_samples, self.liveness_history_len
            )));
        }

        if self.sleep_pitch_range.0 > self.sleep_pitch_range.1 {
            return Err(DmsError::Config(format!(
                "sleep_pitch_range is inverted: {:?}",
                self.sleep_pitch_range
            )));
        }

        self.scoring.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DmsConfig::default().validate().is_ok());
        assert!(DmsConfig::strict().validate().is_ok());
        assert!(DmsConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_presets_order() {
        assert!(DmsConfig::strict().time_to_sleep_ms < DmsConfig::default().time_to_sleep_ms);
        assert!(DmsConfig::lenient().time_to_sleep_ms > DmsConfig::default().time_to_sleep_ms);
    }

    #[test]
    fn test_invalid_alpha() {
        let config = DmsConfig {
            smoothing_alpha: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = DmsConfig {
            sleep_recovery_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sleep_recovery_ms"));
    }

    #[test]
    fn test_bad_scoring_bands_rejected() {
        let mut config = DmsConfig::default();
        config.scoring.level_bands = [20.0, 20.0, 80.0];
        assert!(matches!(config.validate(), Err(DmsError::Scoring(_))));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: DmsConfig = serde_json::from_str(r#"{"time_to_sleep_ms": 1200}"#).unwrap();
        assert_eq!(config.time_to_sleep_ms, 1200);
        assert_eq!(config.blink_rate_threshold, 8);
        assert_eq!(config.scoring.penalty_sleep, 20.0);
    }
}
