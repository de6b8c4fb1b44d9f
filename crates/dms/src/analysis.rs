//! Per-frame output for the rendering collaborator

use alerting::{FatigueLevel, Warning};
use serde::{Deserialize, Serialize};

use crate::state::SessionMode;

/// Progress bars and counters shown alongside the score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveBars {
    /// Sleep onset progress (1.0 while locked)
    pub sleep_progress: f64,
    pub yawn_progress: f64,
    pub distraction_progress: f64,
    /// Blinks within the rolling window
    pub blink_count: usize,
    /// Sleep-lock recovery progress
    pub recovery_progress: f64,
    pub rapid_blink: bool,
}

/// Complete DMS result for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub mode: SessionMode,

    /// Whether a usable face sample was supplied
    pub face_detected: bool,

    /// Fatigue score, 0..=100
    pub fatigue_score: u8,

    pub level: FatigueLevel,

    pub active_bars: ActiveBars,

    /// At most one warning to render
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<Warning>,

    /// Calibration window progress (CALIBRATING only)
    pub calibration_progress: f64,

    /// Liveness check blocked this frame
    pub spoof_suspect: bool,

    /// Time since driving (re)started (RUNNING only)
    pub drive_time_secs: f64,

    /// Time spent in the current rest (RESTING only)
    pub rest_time_secs: f64,
}

impl FrameReport {
    /// Check if a warning is shown
    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }

    pub fn warning_message(&self) -> Option<&str> {
        self.warning.as_ref().map(|w| w.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::AlertCondition;

    #[test]
    fn test_serialized_shape() {
        let report = FrameReport {
            mode: SessionMode::Running,
            face_detected: true,
            fatigue_score: 42,
            level: FatigueLevel::Tired,
            warning: Some(AlertCondition::Yawn.to_warning()),
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "RUNNING");
        assert_eq!(json["level"], "TIRED");
        assert_eq!(json["fatigue_score"], 42);
        assert_eq!(json["warning"]["message"], "TAKE A BREAK");
        assert_eq!(json["warning"]["kind"], "yawn");
        assert_eq!(json["active_bars"]["blink_count"], 0);
        assert!(report.has_warning());
    }

    #[test]
    fn test_no_warning_is_omitted() {
        let json = serde_json::to_value(FrameReport::default()).unwrap();
        assert!(json.get("warning").is_none());
        assert_eq!(json["mode"], "IDLE");
    }
}
