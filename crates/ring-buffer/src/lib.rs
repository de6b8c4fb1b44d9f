//! Bounded Ring Buffers
//!
//! Fixed-capacity history storage that overwrites the oldest entry when
//! full, plus a 2D position history with population-variance statistics
//! used for stillness (liveness) checks.

mod buffer;
mod history;

pub use buffer::RingBuffer;
pub use history::{population_variance, PositionHistory};
