//! 2D position history with spread statistics

use crate::RingBuffer;

/// Population variance (divides by N), `None` for an empty slice
pub fn population_variance(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some(m2 / n)
}

/// Rolling history of (x, y) positions for one tracked landmark
#[derive(Debug, Clone)]
pub struct PositionHistory {
    positions: RingBuffer<(f64, f64)>,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: RingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.positions.push((x, y));
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `var(x) + var(y)` over the held positions, or `None` while fewer
    /// than `min_samples` positions are held.
    pub fn variance(&self, min_samples: usize) -> Option<f64> {
        if self.positions.len() < min_samples.max(1) {
            return None;
        }

        let xs: Vec<f64> = self.positions.iter().map(|&(x, _)| x).collect();
        let ys: Vec<f64> = self.positions.iter().map(|&(_, y)| y).collect();
        Some(population_variance(&xs)? + population_variance(&ys)?)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
