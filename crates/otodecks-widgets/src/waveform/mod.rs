//! Waveform display
//!
//! - `peaks`: per-column (min, max) downsampling
//! - `thumbnail`: shared LRU cache with a background generator thread
//! - `state`: per-deck display state (thumbnail + playhead)
//! - `canvas`/`view`: rendering and click/drag-to-seek

mod canvas;
mod peaks;
mod state;
mod thumbnail;
mod view;

pub use canvas::{WaveformCanvas, WaveformInteraction};
pub use peaks::generate_peaks;
pub use state::{WaveformState, WaveformStatus, WAVEFORM_HEIGHT};
pub use thumbnail::{
    Thumbnail, ThumbnailCache, ThumbnailLookup, ThumbnailResult, DEFAULT_CACHE_CAPACITY,
    DEFAULT_THUMBNAIL_COLUMNS,
};
pub use view::waveform_display;
