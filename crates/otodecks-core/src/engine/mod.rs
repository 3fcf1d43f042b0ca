//! Playback engine - transport, varispeed stage, deck players and mixing
//!
//! - AudioTransport: start/stop, seek, gain, looping over a decoded track
//! - ResamplingStage: speed ratio applied by varispeed interpolation
//! - DeckPlayer: one deck's controllable playback source
//! - AudioEngine: both decks mixed into the output buffer

mod engine;
mod error;
mod player;
mod resampling;
mod transport;

pub use engine::*;
pub use error::{PlayerError, PlayerResult};
pub use player::*;
pub use resampling::ResamplingStage;
pub use transport::AudioTransport;
