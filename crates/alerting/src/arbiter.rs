//! Warning arbitration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

/// Kind of on-screen warning.
///
/// Declaration order is display priority among arbitrated alerts
/// (`SleepLocked` first). `VerifyLiveness` is raised outside arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    VerifyLiveness,
    SleepLocked,
    Distraction,
    Yawn,
    DriveOvertime,
}

impl WarningKind {
    pub const ALL: [WarningKind; 5] = [
        Self::VerifyLiveness,
        Self::SleepLocked,
        Self::Distraction,
        Self::Yawn,
        Self::DriveOvertime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerifyLiveness => "verify_liveness",
            Self::SleepLocked => "sleep_locked",
            Self::Distraction => "distraction",
            Self::Yawn => "yawn",
            Self::DriveOvertime => "drive_overtime",
        }
    }
}

/// Message handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submessage: Option<String>,
}

impl Warning {
    pub fn verify_liveness() -> Self {
        Self {
            kind: WarningKind::VerifyLiveness,
            message: "VERIFY LIVENESS".to_string(),
            submessage: Some("Please blink".to_string()),
        }
    }
}

/// A competing alert condition that is currently true
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertCondition {
    /// Sleep lock latched; progress of the recovery interval in [0, 1]
    SleepLocked { recovery_progress: f64 },
    /// Distraction timer triggered
    Distraction,
    /// Yawn timer triggered
    Yawn,
    /// Continuous driving exceeded the limit
    DriveOvertime { drive_time: Duration },
}

impl AlertCondition {
    pub fn kind(&self) -> WarningKind {
        match self {
            Self::SleepLocked { .. } => WarningKind::SleepLocked,
            Self::Distraction => WarningKind::Distraction,
            Self::Yawn => WarningKind::Yawn,
            Self::DriveOvertime { .. } => WarningKind::DriveOvertime,
        }
    }

    pub fn to_warning(&self) -> Warning {
        let (message, submessage) = match self {
            Self::SleepLocked { recovery_progress } => (
                "OPEN EYES!",
                Some(format!("Recovery {}%", (recovery_progress.clamp(0.0, 1.0) * 100.0) as u32)),
            ),
            Self::Distraction => ("EYES ON ROAD", None),
            Self::Yawn => ("TAKE A BREAK", None),
            Self::DriveOvertime { drive_time } => {
                let secs = drive_time.as_secs();
                (
                    "TIME TO REST",
                    Some(format!("Driving {:02}h {:02}m", secs / 3600, (secs % 3600) / 60)),
                )
            }
        };
        Warning {
            kind: self.kind(),
            message: message.to_string(),
            submessage,
        }
    }
}

/// Pick the highest-priority condition, if any
pub fn highest_priority(conditions: &[AlertCondition]) -> Option<&AlertCondition> {
    conditions.iter().min_by_key(|c| c.kind())
}

/// Fixed-priority selector that also tracks which warning is on screen
#[derive(Debug, Default)]
pub struct WarningArbiter {
    /// Warning shown on the previous frame
    active: Option<WarningKind>,
    /// Times each warning appeared (rising edges)
    fire_counts: HashMap<WarningKind, usize>,
}

impl WarningArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select at most one warning for this frame
    pub fn select(&mut self, conditions: &[AlertCondition]) -> Option<Warning> {
        let warning = highest_priority(conditions).map(AlertCondition::to_warning);
        self.observe(warning.as_ref().map(|w| w.kind));
        warning
    }

    /// Record a warning raised outside arbitration (liveness prompt)
    pub fn raise(&mut self, warning: Warning) -> Warning {
        self.observe(Some(warning.kind));
        warning
    }

    fn observe(&mut self, kind: Option<WarningKind>) {
        if kind != self.active {
            if let Some(kind) = kind {
                let count = self.fire_counts.entry(kind).or_insert(0);
                *count += 1;
                info!("Warning raised: {} (count: {})", kind.as_str(), count);
            }
            self.active = kind;
        }
    }

    pub fn active(&self) -> Option<WarningKind> {
        self.active
    }

    pub fn fire_count(&self, kind: WarningKind) -> usize {
        self.fire_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Clear the on-screen state
    pub fn clear(&mut self) {
        self.active = None;
    }
}
