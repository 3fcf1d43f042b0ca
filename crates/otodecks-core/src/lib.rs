//! Otodecks Core - track loading and playback engine for the two-deck DJ player

pub mod audio;
pub mod audio_file;
pub mod config;
pub mod engine;
pub mod source;
pub mod types;

pub use source::{SourceError, TrackSource};
pub use types::*;
