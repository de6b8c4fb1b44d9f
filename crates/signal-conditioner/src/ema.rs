//! Exponential Moving Average

/// Exponential moving average over a single physical signal.
///
/// The first update seeds the average and is returned unchanged; every
/// later update returns `alpha * raw + (1 - alpha) * previous`.
#[derive(Debug, Clone)]
pub struct Ema {
    /// Smoothing factor in (0, 1), higher = more weight on recent
    alpha: f64,
    /// Running value, `None` until the first sample
    value: Option<f64>,
}

impl Ema {
    /// Create a new smoother
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    /// Feed a raw sample and get the smoothed value
    pub fn update(&mut self, raw: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
            None => raw,
        };
        self.value = Some(next);
        next
    }

    /// Current smoothed value
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forget the running value
    pub fn reset(&mut self) {
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut ema = Ema::new(0.3);
        assert_eq!(ema.value(), None);
        assert_eq!(ema.update(0.31), 0.31);
    }

    #[test]
    fn test_smoothing_step() {
        let mut ema = Ema::new(0.3);
        ema.update(10.0);
        let v = ema.update(20.0);
        // 0.3 * 20 + 0.7 * 10
        assert!((v - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut ema = Ema::new(0.5);
        ema.update(4.0);
        ema.reset();
        assert_eq!(ema.update(8.0), 8.0);
    }

    #[test]
    fn test_converges_to_step_input() {
        let mut ema = Ema::new(0.3);
        ema.update(0.0);
        let mut v = 0.0;
        for _ in 0..100 {
            v = ema.update(1.0);
        }
        assert!((v - 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_constant_input_is_fixed_point(c in -1000.0f64..1000.0, alpha in 0.01f64..0.99) {
            let mut ema = Ema::new(alpha);
            prop_assert_eq!(ema.update(c), c);
            for _ in 0..20 {
                prop_assert!((ema.update(c) - c).abs() < 1e-9);
            }
        }
    }
}
