//! Drag and drop onto the decks
//!
//! The window reports dropped files one event per file, so a multi-file drop
//! arrives as a burst. [`DropBatch`] collects the burst, and the app flushes it
//! shortly after the first file into a single [`DropPayload`]. Only a payload
//! naming exactly one track is accepted.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use otodecks_core::{SourceError, TrackSource};

/// How long to wait for the rest of a multi-file drop
pub const DROP_BATCH_WINDOW: Duration = Duration::from_millis(50);

/// Why a drop was not forwarded to a deck
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropError {
    #[error("Nothing was dropped")]
    NoFiles,

    #[error("Drop one file at a time ({0} dropped)")]
    MultipleFiles(usize),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Something dropped onto (or typed into) a deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// Files dragged in from outside the app
    Files(Vec<PathBuf>),
    /// A track reference from inside the app (URL box, track list)
    Track { file_url: String },
}

impl DropPayload {
    /// Validate the payload into a single playable source
    pub fn into_source(self) -> Result<TrackSource, DropError> {
        match self {
            DropPayload::Files(mut files) => match files.len() {
                0 => Err(DropError::NoFiles),
                1 => {
                    let path = files.remove(0);
                    Ok(TrackSource::from_path(path)?)
                }
                n => Err(DropError::MultipleFiles(n)),
            },
            DropPayload::Track { file_url } => Ok(TrackSource::parse(file_url)?),
        }
    }
}

/// Files dropped in one gesture, waiting to be flushed
#[derive(Debug, Default)]
pub struct DropBatch {
    deck: Option<usize>,
    files: Vec<PathBuf>,
}

impl DropBatch {
    /// Add a dropped file
    ///
    /// Returns true for the first file of a batch, which is the caller's cue to
    /// schedule a flush. The deck is fixed by the first file.
    pub fn push(&mut self, deck: usize, path: PathBuf) -> bool {
        let first = self.files.is_empty();
        if first {
            self.deck = Some(deck);
        }
        self.files.push(path);
        first
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Take the collected files as one payload for their target deck
    pub fn flush(&mut self) -> Option<(usize, DropPayload)> {
        let deck = self.deck.take()?;
        let files = std::mem::take(&mut self.files);
        Some((deck, DropPayload::Files(files)))
    }
}

/// Deck under a cursor, given the window height
///
/// Decks are stacked: deck 1 fills the top half of the window, deck 2 the
/// bottom half. Without a known cursor position the drop goes to deck 1.
pub fn deck_at(cursor_y: Option<f32>, window_height: f32) -> usize {
    match cursor_y {
        Some(y) if window_height > 0.0 && y >= window_height / 2.0 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absolute(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_single_file_is_accepted() {
        let path = absolute("one.wav");
        let source = DropPayload::Files(vec![path.clone()]).into_source().unwrap();
        assert_eq!(source, TrackSource::Path(path));
    }

    #[test]
    fn test_zero_or_many_files_are_rejected() {
        assert_eq!(DropPayload::Files(vec![]).into_source(), Err(DropError::NoFiles));

        let many = DropPayload::Files(vec![absolute("a.wav"), absolute("b.wav")]);
        assert_eq!(many.into_source(), Err(DropError::MultipleFiles(2)));
    }

    #[test]
    fn test_relative_file_is_rejected() {
        let result = DropPayload::Files(vec![PathBuf::from("relative.wav")]).into_source();
        assert!(matches!(result, Err(DropError::Source(SourceError::RelativePath(_)))));
    }

    #[test]
    fn test_track_payload_parses_urls() {
        let http = DropPayload::Track {
            file_url: "https://example.com/track.mp3".to_string(),
        };
        assert!(matches!(http.into_source(), Ok(TrackSource::Url(_))));

        let empty = DropPayload::Track {
            file_url: "   ".to_string(),
        };
        assert_eq!(empty.into_source(), Err(DropError::Source(SourceError::Empty)));
    }

    #[test]
    fn test_batch_collects_one_gesture() {
        let mut batch = DropBatch::default();
        assert!(batch.flush().is_none());

        assert!(batch.push(1, absolute("a.wav")));
        assert!(!batch.push(0, absolute("b.wav")));

        let (deck, payload) = batch.flush().unwrap();
        assert_eq!(deck, 1);
        assert_eq!(payload, DropPayload::Files(vec![absolute("a.wav"), absolute("b.wav")]));
        assert!(batch.is_empty());

        // Next gesture starts a new batch
        assert!(batch.push(0, absolute("c.wav")));
    }

    #[test]
    fn test_deck_at() {
        assert_eq!(deck_at(Some(10.0), 600.0), 0);
        assert_eq!(deck_at(Some(299.0), 600.0), 0);
        assert_eq!(deck_at(Some(300.0), 600.0), 1);
        assert_eq!(deck_at(None, 600.0), 0);
        assert_eq!(deck_at(Some(500.0), 0.0), 0);
    }
}
