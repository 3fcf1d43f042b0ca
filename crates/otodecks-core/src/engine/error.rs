//! Deck player error types

use thiserror::Error;

/// Rejected deck player operations
///
/// A rejected call never changes player state.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PlayerError {
    /// Operation needs a loaded track
    #[error("No track loaded")]
    NotLoaded,

    #[error("Gain {0} outside [0, 1]")]
    GainOutOfRange(f32),

    #[error("Speed ratio {value} outside [0, {max}]")]
    SpeedOutOfRange { value: f64, max: f64 },

    #[error("Relative position {0} outside [0, 1]")]
    PositionOutOfRange(f64),
}

/// Result type for deck player operations
pub type PlayerResult<T> = Result<T, PlayerError>;
