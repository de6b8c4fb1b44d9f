//! Per-frame input from the geometry collaborator

use face_geometry::{IrisPosition, Point2};
use std::time::Instant;

/// Scalars measured on one frame with a detected face
#[derive(Debug, Clone, PartialEq)]
pub struct BiometricSample {
    /// Eye Aspect Ratio (mean of both eyes)
    pub ear: f64,
    /// Mouth Aspect Ratio
    pub mar: f64,
    /// Head pitch in degrees
    pub pitch_deg: f64,
    /// Head yaw in degrees
    pub yaw_deg: f64,
    /// Horizontal gaze
    pub iris: IrisPosition,
    /// Nose tip position (pixels), feeds the liveness check
    pub nose: Option<Point2>,
    /// Iris center position (pixels), feeds the liveness check
    pub iris_center: Option<Point2>,
    /// Monotonic capture time
    pub timestamp: Instant,
}

impl BiometricSample {
    pub fn new(timestamp: Instant, ear: f64, mar: f64, pitch_deg: f64, yaw_deg: f64, iris: IrisPosition) -> Self {
        Self {
            ear,
            mar,
            pitch_deg,
            yaw_deg,
            iris,
            nose: None,
            iris_center: None,
            timestamp,
        }
    }

    /// Attach landmark positions for the liveness check
    pub fn with_positions(mut self, nose: Point2, iris_center: Option<Point2>) -> Self {
        self.nose = Some(nose);
        self.iris_center = iris_center;
        self
    }
}

/// What the session receives for one processed frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameInput {
    /// Face detected and measured
    Face(BiometricSample),
    /// No face detected on this frame
    NoFace { timestamp: Instant },
}

impl FrameInput {
    pub fn timestamp(&self) -> Instant {
        match self {
            Self::Face(sample) => sample.timestamp,
            Self::NoFace { timestamp } => *timestamp,
        }
    }

    pub fn sample(&self) -> Option<&BiometricSample> {
        match self {
            Self::Face(sample) => Some(sample),
            Self::NoFace { .. } => None,
        }
    }
}

impl From<BiometricSample> for FrameInput {
    fn from(sample: BiometricSample) -> Self {
        Self::Face(sample)
    }
}
