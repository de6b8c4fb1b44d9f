//! Signal Conditioning
//!
//! Exponential smoothing and sanity checks for the per-frame biometric
//! scalars (EAR, MAR, yaw, pitch) before they reach the decision engine.

mod conditioner;
mod ema;
mod error;
mod validator;

pub use conditioner::{ConditionedSignals, SignalConditioner};
pub use ema::Ema;
pub use error::SampleError;
pub use validator::{SampleValidator, ValidationConfig};
