//! Application messages for otodecks

use std::path::PathBuf;

use iced::{Point, Size};

use otodecks_widgets::ThumbnailResult;

use super::deck_gui::DeckMessage;
use super::drop::DropPayload;

/// Messages that can be sent to the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Poll the players (playhead position, end of track)
    Tick,
    /// Deck-specific message
    Deck(usize, DeckMessage),
    /// Background thumbnail generation completed
    ThumbnailReady(ThumbnailResult),
    /// Load a track reference onto a deck
    LoadTrack(usize, DropPayload),
    /// A file from outside the app was dropped on the window
    FileDropped(PathBuf),
    /// End of the multi-file drop window; forward what was collected
    FlushDrop,
    CursorMoved(Point),
    WindowResized(Size),
}
