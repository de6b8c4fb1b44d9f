//! Per-signal smoothing bundle

use crate::Ema;

/// Smoothed scalars for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionedSignals {
    pub ear: f64,
    pub mar: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Owns one independent EMA per physical signal
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    ear: Ema,
    mar: Ema,
    pitch: Ema,
    yaw: Ema,
}

impl SignalConditioner {
    /// Create a conditioner using the same alpha for every signal
    pub fn new(alpha: f64) -> Self {
        Self {
            ear: Ema::new(alpha),
            mar: Ema::new(alpha),
            pitch: Ema::new(alpha),
            yaw: Ema::new(alpha),
        }
    }

    /// Smooth one frame's raw scalars
    pub fn update(&mut self, ear: f64, mar: f64, pitch: f64, yaw: f64) -> ConditionedSignals {
        ConditionedSignals {
            ear: self.ear.update(ear),
            mar: self.mar.update(mar),
            pitch: self.pitch.update(pitch),
            yaw: self.yaw.update(yaw),
        }
    }

    pub fn reset(&mut self) {
        self.ear.reset();
        self.mar.reset();
        self.pitch.reset();
        self.yaw.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_are_independent() {
        let mut cond = SignalConditioner::new(0.5);
        let first = cond.update(0.3, 0.1, -5.0, 12.0);
        assert_eq!(first, ConditionedSignals { ear: 0.3, mar: 0.1, pitch: -5.0, yaw: 12.0 });

        let second = cond.update(0.1, 0.1, -5.0, 0.0);
        assert!((second.ear - 0.2).abs() < 1e-12);
        assert!((second.mar - 0.1).abs() < 1e-12);
        assert!((second.pitch + 5.0).abs() < 1e-12);
        assert!((second.yaw - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset_reseeds_every_channel() {
        let mut cond = SignalConditioner::new(0.3);
        cond.update(1.0, 1.0, 1.0, 1.0);
        cond.reset();
        let s = cond.update(2.0, 3.0, 4.0, 5.0);
        assert_eq!(s, ConditionedSignals { ear: 2.0, mar: 3.0, pitch: 4.0, yaw: 5.0 });
    }
}
