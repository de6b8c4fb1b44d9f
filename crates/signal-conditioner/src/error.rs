//! Sample Error Types

use thiserror::Error;

/// Reasons a biometric sample is unusable for a frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// Scalar is NaN or infinite
    #[error("{field} is not finite: {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Scalar outside the physically plausible range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
