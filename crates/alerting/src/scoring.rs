//! Fatigue score accumulation

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::AlertingError;

/// Upper bound of the fatigue score
pub const MAX_SCORE: f64 = 100.0;

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points per second while sleeping
    pub penalty_sleep: f64,
    /// Points per second while yawning
    pub penalty_yawn: f64,
    /// Points per second while distracted
    pub penalty_distraction: f64,
    /// Points per second while blinking rapidly
    pub penalty_rapid_blink: f64,
    /// Points per second recovered when nothing is wrong
    pub heal_rate: f64,
    /// Lower bounds of TIRED, DROWSY and DANGER
    pub level_bands: [f64; 3],
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            penalty_sleep: 20.0,
            penalty_yawn: 5.0,
            penalty_distraction: 8.0,
            penalty_rapid_blink: 10.0,
            heal_rate: 2.0,
            level_bands: [20.0, 50.0, 80.0],
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), AlertingError> {
        let rates = [
            ("penalty_sleep", self.penalty_sleep),
            ("penalty_yawn", self.penalty_yawn),
            ("penalty_distraction", self.penalty_distraction),
            ("penalty_rapid_blink", self.penalty_rapid_blink),
            ("heal_rate", self.heal_rate),
        ];
        for (name, rate) in rates {
            if !rate.is_finite() || rate < 0.0 {
                return Err(AlertingError::InvalidRate { name, value: rate });
            }
        }

        let [tired, drowsy, danger] = self.level_bands;
        if !(0.0 < tired && tired < drowsy && drowsy < danger && danger <= MAX_SCORE) {
            return Err(AlertingError::InvalidBands(self.level_bands));
        }
        Ok(())
    }
}

/// Discrete fatigue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FatigueLevel {
    #[default]
    Fresh,
    Tired,
    Drowsy,
    Danger,
}

impl FatigueLevel {
    /// Map a score onto half-open bands, lower bound inclusive
    pub fn from_score(score: f64, bands: &[f64; 3]) -> Self {
        if score < bands[0] {
            Self::Fresh
        } else if score < bands[1] {
            Self::Tired
        } else if score < bands[2] {
            Self::Drowsy
        } else {
            Self::Danger
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "FRESH",
            Self::Tired => "TIRED",
            Self::Drowsy => "DROWSY",
            Self::Danger => "DANGER",
        }
    }
}

/// Conditions observed for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreInputs {
    pub sleeping: bool,
    pub yawning: bool,
    pub distracted: bool,
    pub rapid_blink: bool,
    /// False while the sleep lock is latched
    pub can_heal: bool,
}

/// Which branch the last update applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreBranch {
    #[default]
    Idle,
    Sleep,
    Yawn,
    Distraction,
    RapidBlink,
    Heal,
}

impl ScoreBranch {
    /// Exactly one branch applies, in fixed priority order
    pub fn select(inputs: &ScoreInputs) -> Self {
        if inputs.sleeping {
            Self::Sleep
        } else if inputs.yawning {
            Self::Yawn
        } else if inputs.distracted {
            Self::Distraction
        } else if inputs.rapid_blink {
            Self::RapidBlink
        } else if inputs.can_heal {
            Self::Heal
        } else {
            Self::Idle
        }
    }
}

/// Continuous-time penalty/heal accumulator
#[derive(Debug, Clone)]
pub struct ScoreManager {
    config: ScoringConfig,
    score: f64,
    /// Clock of the previous update; `None` until the first one
    last_update: Option<Instant>,
    last_branch: ScoreBranch,
}

impl ScoreManager {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            score: 0.0,
            last_update: None,
            last_branch: ScoreBranch::Idle,
        }
    }

    /// Apply the elapsed time since the previous update and return the
    /// integer score.
    pub fn update(&mut self, inputs: &ScoreInputs, now: Instant) -> u8 {
        let dt = self.advance(now).as_secs_f64();
        let branch = ScoreBranch::select(inputs);

        let delta = match branch {
            ScoreBranch::Sleep => self.config.penalty_sleep * dt,
            ScoreBranch::Yawn => self.config.penalty_yawn * dt,
            ScoreBranch::Distraction => self.config.penalty_distraction * dt,
            ScoreBranch::RapidBlink => self.config.penalty_rapid_blink * dt,
            ScoreBranch::Heal => -self.config.heal_rate * dt,
            ScoreBranch::Idle => 0.0,
        };

        if branch != self.last_branch {
            debug!("Score branch {:?} -> {:?} at {:.1}", self.last_branch, branch, self.score);
        }
        self.last_branch = branch;
        self.score = (self.score + delta).clamp(0.0, MAX_SCORE);
        self.score_int()
    }

    /// Shift the clock by a gap that must not be charged
    pub fn shift_clock(&mut self, by: Duration) {
        if let Some(last) = self.last_update.as_mut() {
            *last += by;
        }
    }

    fn advance(&mut self, now: Instant) -> Duration {
        let dt = self
            .last_update
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_update = Some(now);
        dt
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Score truncated toward zero, 0..=100
    pub fn score_int(&self) -> u8 {
        self.score as u8
    }

    pub fn level(&self) -> FatigueLevel {
        FatigueLevel::from_score(self.score, &self.config.level_bands)
    }

    pub fn last_branch(&self) -> ScoreBranch {
        self.last_branch
    }

    /// Zero the score and forget the clock
    pub fn reset(&mut self) {
        self.score = 0.0;
        self.last_update = None;
        self.last_branch = ScoreBranch::Idle;
    }
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sleeping() -> ScoreInputs {
        ScoreInputs {
            sleeping: true,
            ..Default::default()
        }
    }

    fn healthy() -> ScoreInputs {
        ScoreInputs {
            can_heal: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_update_has_no_elapsed_time() {
        let mut manager = ScoreManager::default();
        let t0 = Instant::now();
        assert_eq!(manager.update(&sleeping(), t0), 0);
        assert_eq!(manager.update(&sleeping(), t0 + Duration::from_secs(1)), 20);
    }

    #[test]
    fn test_priority_order() {
        let all = ScoreInputs {
            sleeping: true,
            yawning: true,
            distracted: true,
            rapid_blink: true,
            can_heal: true,
        };
        assert_eq!(ScoreBranch::select(&all), ScoreBranch::Sleep);
        assert_eq!(
            ScoreBranch::select(&ScoreInputs { sleeping: false, ..all }),
            ScoreBranch::Yawn
        );
        assert_eq!(
            ScoreBranch::select(&ScoreInputs { sleeping: false, yawning: false, ..all }),
            ScoreBranch::Distraction
        );
        assert_eq!(
            ScoreBranch::select(&ScoreInputs { rapid_blink: true, ..Default::default() }),
            ScoreBranch::RapidBlink
        );
        assert_eq!(ScoreBranch::select(&healthy()), ScoreBranch::Heal);
        assert_eq!(ScoreBranch::select(&ScoreInputs::default()), ScoreBranch::Idle);
    }

    #[test]
    fn test_rates_per_second() {
        let t0 = Instant::now();
        let mut manager = ScoreManager::default();
        manager.update(&healthy(), t0);

        let yawn = ScoreInputs { yawning: true, ..Default::default() };
        manager.update(&yawn, t0 + Duration::from_secs(2));
        assert!((manager.score() - 10.0).abs() < 1e-9);

        let distracted = ScoreInputs { distracted: true, ..Default::default() };
        manager.update(&distracted, t0 + Duration::from_secs(3));
        assert!((manager.score() - 18.0).abs() < 1e-9);

        manager.update(&healthy(), t0 + Duration::from_secs(7));
        assert!((manager.score() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_heal_when_locked() {
        let t0 = Instant::now();
        let mut manager = ScoreManager::default();
        manager.update(&sleeping(), t0);
        manager.update(&sleeping(), t0 + Duration::from_secs(2));
        assert_eq!(manager.score_int(), 40);

        // Nothing flagged, but healing is forbidden
        manager.update(&ScoreInputs::default(), t0 + Duration::from_secs(10));
        assert_eq!(manager.score_int(), 40);
        assert_eq!(manager.last_branch(), ScoreBranch::Idle);
    }

    #[test]
    fn test_clamped_to_bounds() {
        let t0 = Instant::now();
        let mut manager = ScoreManager::default();
        manager.update(&sleeping(), t0);
        assert_eq!(manager.update(&sleeping(), t0 + Duration::from_secs(60)), 100);
        assert_eq!(manager.level(), FatigueLevel::Danger);

        assert_eq!(manager.update(&healthy(), t0 + Duration::from_secs(600)), 0);
        assert_eq!(manager.level(), FatigueLevel::Fresh);
    }

    #[test]
    fn test_shifted_gap_is_not_charged() {
        let t0 = Instant::now();
        let mut manager = ScoreManager::default();
        manager.update(&sleeping(), t0);
        manager.update(&sleeping(), t0 + Duration::from_secs(1));
        assert_eq!(manager.score_int(), 20);

        manager.shift_clock(Duration::from_secs(3));
        manager.update(&sleeping(), t0 + Duration::from_secs(5));
        assert_eq!(manager.score_int(), 40);
    }

    #[test]
    fn test_level_bands() {
        let bands = ScoringConfig::default().level_bands;
        assert_eq!(FatigueLevel::from_score(0.0, &bands), FatigueLevel::Fresh);
        assert_eq!(FatigueLevel::from_score(19.99, &bands), FatigueLevel::Fresh);
        assert_eq!(FatigueLevel::from_score(20.0, &bands), FatigueLevel::Tired);
        assert_eq!(FatigueLevel::from_score(49.9, &bands), FatigueLevel::Tired);
        assert_eq!(FatigueLevel::from_score(50.0, &bands), FatigueLevel::Drowsy);
        assert_eq!(FatigueLevel::from_score(80.0, &bands), FatigueLevel::Danger);
        assert_eq!(FatigueLevel::from_score(100.0, &bands), FatigueLevel::Danger);
    }

    #[test]
    fn test_config_validation() {
        assert!(ScoringConfig::default().validate().is_ok());

        let bad_bands = ScoringConfig {
            level_bands: [50.0, 20.0, 80.0],
            ..Default::default()
        };
        assert!(matches!(bad_bands.validate(), Err(AlertingError::InvalidBands(_))));

        let bad_rate = ScoringConfig {
            heal_rate: -1.0,
            ..Default::default()
        };
        assert!(matches!(bad_rate.validate(), Err(AlertingError::InvalidRate { name: "heal_rate", .. })));
    }

    proptest! {
        #[test]
        fn prop_score_stays_in_bounds(steps in proptest::collection::vec((any::<bool>(), 0u64..5_000), 1..200)) {
            let t0 = Instant::now();
            let mut manager = ScoreManager::default();
            let mut now = t0;
            for (is_sleeping, dt_ms) in steps {
                now += Duration::from_millis(dt_ms);
                let inputs = if is_sleeping { sleeping() } else { healthy() };
                let score = manager.update(&inputs, now);
                prop_assert!(score <= 100);
                prop_assert!((0.0..=MAX_SCORE).contains(&manager.score()));
            }
        }
    }
}
