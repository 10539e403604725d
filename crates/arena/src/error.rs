//! Error types for the simulation core.
//!
//! Only configuration problems surface as errors. Acting on an id that no
//! longer exists is a silent no-op everywhere else in the crate, since
//! intents legitimately race entity removal.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("World dimensions must be positive (got {width}x{height})")]
    InvalidWorldDimensions { width: f32, height: f32 },
}
