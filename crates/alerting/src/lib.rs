//! Alerting System
//!
//! Provides the continuous fatigue score, its severity bands, and the
//! fixed-priority arbitration between competing warnings.

mod arbiter;
mod scoring;

pub use arbiter::{highest_priority, AlertCondition, Warning, WarningArbiter, WarningKind};
pub use scoring::{FatigueLevel, ScoreBranch, ScoreInputs, ScoreManager, ScoringConfig, MAX_SCORE};

use thiserror::Error;

/// Alerting configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertingError {
    #[error("Rate {name} must be finite and non-negative, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("Level bands must be ascending within (0, 100], got {0:?}")]
    InvalidBands([f64; 3]),
}
