//! Stillness-based spoof detection

use face_geometry::Point2;
use ring_buffer::PositionHistory;
use serde::{Deserialize, Serialize};

/// Liveness outcome for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LivenessVerdict {
    /// `None` until the nose history holds enough samples
    pub nose_variance: Option<f64>,
    /// `None` until the iris history holds enough samples
    pub iris_variance: Option<f64>,
    pub is_static: bool,
    pub spoof_suspect: bool,
}

/// Flags a face that is both motionless and not blinking.
///
/// Stillness alone is not enough (an attentive driver at a stop light is
/// still); the absence of any recent blink decides.
#[derive(Debug, Clone)]
pub struct LivenessGuard {
    nose: PositionHistory,
    iris: PositionHistory,
    min_samples: usize,
    variance_threshold: f64,
}

impl LivenessGuard {
    pub fn new(history_len: usize, min_samples: usize, variance_threshold: f64) -> Self {
        Self {
            nose: PositionHistory::new(history_len),
            iris: PositionHistory::new(history_len),
            min_samples,
            variance_threshold,
        }
    }

    /// Record this frame's landmark positions
    pub fn observe(&mut self, nose: Option<Point2>, iris_center: Option<Point2>) {
        if let Some(p) = nose.filter(Point2::is_finite) {
            self.nose.push(p.x, p.y);
        }
        if let Some(p) = iris_center.filter(Point2::is_finite) {
            self.iris.push(p.x, p.y);
        }
    }

    /// Either landmark is abnormally still. Buffers with insufficient
    /// history never count as still.
    pub fn is_static(&self) -> bool {
        let (nose, iris) = self.variances();
        self.is_still(nose) || self.is_still(iris)
    }

    pub fn check(&self, recent_blink_count: usize) -> LivenessVerdict {
        let (nose_variance, iris_variance) = self.variances();
        let is_static = self.is_still(nose_variance) || self.is_still(iris_variance);

        LivenessVerdict {
            nose_variance,
            iris_variance,
            is_static,
            spoof_suspect: is_static && recent_blink_count == 0,
        }
    }

    fn variances(&self) -> (Option<f64>, Option<f64>) {
        (
            self.nose.variance(self.min_samples),
            self.iris.variance(self.min_samples),
        )
    }

    fn is_still(&self, variance: Option<f64>) -> bool {
        variance.is_some_and(|v| v < self.variance_threshold)
    }

    pub fn reset(&mut self) {
        self.nose.clear();
        self.iris.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> LivenessGuard {
        LivenessGuard::new(60, 20, 15.0)
    }

    fn feed_still(guard: &mut LivenessGuard, frames: usize) {
        for i in 0..frames {
            // Sub-pixel jitter only
            let jitter = (i % 3) as f64 * 0.1;
            guard.observe(Some(Point2::new(320.0 + jitter, 240.0)), Some(Point2::new(300.0, 200.0 + jitter)));
        }
    }

    #[test]
    fn test_still_without_blinks_is_spoof() {
        let mut g = guard();
        feed_still(&mut g, 30);
        let verdict = g.check(0);
        assert!(verdict.is_static);
        assert!(verdict.spoof_suspect);
    }

    #[test]
    fn test_still_with_one_blink_is_live() {
        let mut g = guard();
        feed_still(&mut g, 30);
        let verdict = g.check(1);
        assert!(verdict.is_static);
        assert!(!verdict.spoof_suspect);
    }

    #[test]
    fn test_insufficient_history_fails_open() {
        let mut g = guard();
        feed_still(&mut g, 19);
        let verdict = g.check(0);
        assert_eq!(verdict.nose_variance, None);
        assert!(!verdict.is_static);
        assert!(!verdict.spoof_suspect);
    }

    #[test]
    fn test_moving_head_is_live() {
        let mut g = guard();
        for i in 0..40 {
            let x = 300.0 + (i as f64 * 0.7).sin() * 20.0;
            let y = 240.0 + (i as f64 * 0.3).cos() * 15.0;
            g.observe(Some(Point2::new(x, y)), Some(Point2::new(x - 20.0, y - 40.0)));
        }
        let verdict = g.check(0);
        assert!(verdict.nose_variance.unwrap() > 15.0);
        assert!(!verdict.is_static);
        assert!(!verdict.spoof_suspect);
    }

    #[test]
    fn test_either_landmark_still_is_static() {
        let mut g = guard();
        for i in 0..30 {
            let x = 300.0 + (i as f64 * 0.7).sin() * 20.0;
            // Nose moves, iris frozen
            g.observe(Some(Point2::new(x, 240.0)), Some(Point2::new(310.0, 200.0)));
        }
        assert!(g.is_static());
    }

    #[test]
    fn test_missing_positions_never_static() {
        let mut g = guard();
        for _ in 0..50 {
            g.observe(None, None);
        }
        assert!(!g.check(0).spoof_suspect);
    }
}
