//! Output device and stream errors

use thiserror::Error;

/// Why the output stream could not be opened
///
/// None of these are fatal to the app: it falls back to running the decks
/// without a device.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No output devices available")]
    NoOutputDevices,

    #[error("Host has no default output device")]
    NoDefaultOutput,

    #[error("No output device named '{0}'")]
    DeviceNotFound(String),

    #[error("Could not query output device: {0}")]
    DeviceQuery(String),

    #[error("Could not open output stream: {0}")]
    BuildStream(String),

    #[error("Output stream refused to start: {0}")]
    StartStream(String),
}

pub type AudioResult<T> = Result<T, AudioError>;
