//! Eye and mouth aspect ratios

use crate::{GeometryError, Point2};
use tracing::trace;

/// Six eye contour points: outer corner, two upper lid points, inner
/// corner, two lower lid points (lower points mirror the upper ones).
pub type EyeLandmarks = [Point2; 6];

/// Compute EAR, failing on degenerate geometry
pub fn try_eye_aspect_ratio(eye: &EyeLandmarks) -> Result<f64, GeometryError> {
    if eye.iter().any(|p| !p.is_finite()) {
        return Err(GeometryError::NonFinite("eye"));
    }

    let a = eye[1].distance(&eye[5]);
    let b = eye[2].distance(&eye[4]);
    let c = eye[0].distance(&eye[3]);

    if c == 0.0 {
        return Err(GeometryError::DegenerateDenominator("eye width"));
    }
    Ok((a + b) / (2.0 * c))
}

/// Eye Aspect Ratio, `0.0` when it cannot be computed
pub fn eye_aspect_ratio(eye: &EyeLandmarks) -> f64 {
    try_eye_aspect_ratio(eye).unwrap_or_else(|e| {
        trace!("EAR unavailable: {}", e);
        0.0
    })
}

/// Average EAR of both eyes, `0.0` if either eye is degenerate
pub fn mean_eye_aspect_ratio(left: &EyeLandmarks, right: &EyeLandmarks) -> f64 {
    match (try_eye_aspect_ratio(left), try_eye_aspect_ratio(right)) {
        (Ok(l), Ok(r)) => (l + r) / 2.0,
        (Err(e), _) | (_, Err(e)) => {
            trace!("EAR unavailable: {}", e);
            0.0
        }
    }
}

/// Compute MAR from the inner lip points, failing on degenerate geometry
pub fn try_mouth_aspect_ratio(
    top: Point2,
    bottom: Point2,
    left: Point2,
    right: Point2,
) -> Result<f64, GeometryError> {
    if ![top, bottom, left, right].iter().all(Point2::is_finite) {
        return Err(GeometryError::NonFinite("mouth"));
    }

    let horizontal = left.distance(&right);
    if horizontal == 0.0 {
        return Err(GeometryError::DegenerateDenominator("mouth width"));
    }
    Ok(top.distance(&bottom) / horizontal)
}

/// Mouth Aspect Ratio (larger = wider open), `0.0` when it cannot be computed
pub fn mouth_aspect_ratio(top: Point2, bottom: Point2, left: Point2, right: Point2) -> f64 {
    try_mouth_aspect_ratio(top, bottom, left, right).unwrap_or_else(|e| {
        trace!("MAR unavailable: {}", e);
        0.0
    })
}
