//! Shared UI widgets for the Otodecks DJ player
//!
//! Follows the iced 0.14 split between data and presentation:
//!
//! - **State structs**: Pure data (`WaveformState`, `ThumbnailCache`)
//! - **View functions**: Take state + callbacks, return `Element<Message>`
//! - **Canvas Programs**: Custom rendering and event-to-callback translation
//!
//! Waveform thumbnails are generated off the UI thread by the shared
//! [`ThumbnailCache`]; completion reaches the app through
//! [`mpsc_subscription`].

pub mod subscription;
pub mod theme;
pub mod waveform;

pub use subscription::mpsc_subscription;
pub use theme::WaveformPalette;

pub use waveform::{
    generate_peaks, waveform_display, Thumbnail, ThumbnailCache, ThumbnailLookup,
    ThumbnailResult, WaveformCanvas, WaveformInteraction, WaveformState, WaveformStatus,
    DEFAULT_CACHE_CAPACITY, DEFAULT_THUMBNAIL_COLUMNS, WAVEFORM_HEIGHT,
};
