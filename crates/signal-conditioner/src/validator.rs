//! Sanity checks for raw biometric scalars

use crate::error::SampleError;
use serde::{Deserialize, Serialize};

/// Plausible ranges for raw scalars
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// EAR valid range
    pub ear_range: (f64, f64),
    /// MAR valid range
    pub mar_range: (f64, f64),
    /// Head pitch valid range (degrees)
    pub pitch_range: (f64, f64),
    /// Head yaw valid range (degrees)
    pub yaw_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ear_range: (0.0, 2.0),
            mar_range: (0.0, 5.0),
            pitch_range: (-180.0, 180.0),
            yaw_range: (-180.0, 180.0),
        }
    }
}

/// Validator for raw per-frame scalars
#[derive(Debug, Clone, Default)]
pub struct SampleValidator {
    config: ValidationConfig,
}

impl SampleValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), SampleError> {
        if !value.is_finite() {
            return Err(SampleError::NonFinite { field, value });
        }
        if value < range.0 || value > range.1 {
            Err(SampleError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate all four scalars of one frame
    pub fn validate(&self, ear: f64, mar: f64, pitch: f64, yaw: f64) -> Result<(), SampleError> {
        self.validate_range("ear", ear, self.config.ear_range)?;
        self.validate_range("mar", mar, self.config.mar_range)?;
        self.validate_range("pitch", pitch, self.config.pitch_range)?;
        self.validate_range("yaw", yaw, self.config.yaw_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_frame() {
        let validator = SampleValidator::default();
        assert!(validator.validate(0.3, 0.2, -4.0, 10.0).is_ok());
        assert!(validator.validate(0.0, 0.0, 180.0, -180.0).is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        let validator = SampleValidator::default();
        let err = validator.validate(f64::NAN, 0.2, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SampleError::NonFinite { field: "ear", .. }));
    }

    #[test]
    fn test_out_of_range() {
        let validator = SampleValidator::default();
        assert!(validator.validate(0.3, -0.1, 0.0, 0.0).is_err());
        assert!(validator.validate(0.3, 0.2, 0.0, 270.0).is_err());
        assert!(validator.validate(0.3, 0.2, f64::INFINITY, 0.0).is_err());
    }
}
