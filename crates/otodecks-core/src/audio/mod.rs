//! Audio output through CPAL
//!
//! The engine is shared as `Arc<Mutex<AudioEngine>>`. The UI thread takes the
//! lock briefly to issue deck commands; the CPAL callback only ever
//! `try_lock`s and plays silence for a block when the UI holds the lock.
//!
//! ```ignore
//! use otodecks_core::audio::{start_audio_system, AudioConfig};
//!
//! let handle = start_audio_system(&AudioConfig::default())?;
//! let engine = handle.engine();
//! engine.lock().unwrap().deck_mut(0).map(|d| d.start());
//! ```

mod config;
mod cpal_backend;
mod device;
mod error;

pub use config::{AudioConfig, BufferSize, DEFAULT_BUFFER_SIZE, MAX_DEVICE_BUFFER_SIZE};
pub use cpal_backend::{start_audio_system, AudioHandle, SharedEngine};
pub use device::{get_output_devices, AudioDevice};
pub use error::{AudioError, AudioResult};
