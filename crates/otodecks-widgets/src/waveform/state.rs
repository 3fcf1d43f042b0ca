//! Waveform display state

use std::sync::Arc;

use otodecks_core::TrackSource;

use super::thumbnail::{Thumbnail, ThumbnailCache, ThumbnailLookup, ThumbnailResult};

/// Height of the waveform canvas in pixels
pub const WAVEFORM_HEIGHT: f32 = 120.0;

/// What the waveform display can currently show
#[derive(Debug, Clone, Default)]
pub enum WaveformStatus {
    /// Nothing loaded yet
    #[default]
    Empty,
    /// Thumbnail being generated
    Loading,
    Ready(Arc<Thumbnail>),
    /// Generation failed (message for display)
    Failed(String),
}

/// State of one deck's waveform display
///
/// Pure data: it never talks to a player. The owner pushes the playhead in
/// with [`WaveformState::set_position_relative`] and receives seek requests
/// from the canvas callback.
#[derive(Debug, Clone, Default)]
pub struct WaveformState {
    source: Option<TrackSource>,
    status: WaveformStatus,
    /// Playhead, 0.0..=1.0
    position: f64,
}

impl WaveformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the waveform of `source`
    ///
    /// A cached thumbnail is attached right away; otherwise the display shows
    /// a loading state until [`WaveformState::thumbnail_ready`] delivers it.
    pub fn load_url(&mut self, source: TrackSource, cache: &mut ThumbnailCache) {
        self.status = match cache.request(&source) {
            ThumbnailLookup::Ready(thumbnail) => WaveformStatus::Ready(thumbnail),
            ThumbnailLookup::Pending => WaveformStatus::Loading,
        };
        self.source = Some(source);
        self.position = 0.0;
    }

    /// Attach a finished thumbnail
    ///
    /// Results for any other source are ignored. Returns true when the display
    /// changed.
    pub fn thumbnail_ready(&mut self, result: &ThumbnailResult) -> bool {
        if self.source.as_ref() != Some(&result.source) {
            return false;
        }

        self.status = match &result.thumbnail {
            Ok(thumbnail) => WaveformStatus::Ready(Arc::clone(thumbnail)),
            Err(e) => WaveformStatus::Failed(e.clone()),
        };
        true
    }

    /// Move the playhead (clamped to 0.0..=1.0)
    ///
    /// Returns true when the position changed. NaN is ignored.
    pub fn set_position_relative(&mut self, position: f64) -> bool {
        if position.is_nan() {
            return false;
        }
        let position = position.clamp(0.0, 1.0);
        if position == self.position {
            return false;
        }
        self.position = position;
        true
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn source(&self) -> Option<&TrackSource> {
        self.source.as_ref()
    }

    pub fn status(&self) -> &WaveformStatus {
        &self.status
    }

    /// Thumbnail ready to draw
    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        match &self.status {
            WaveformStatus::Ready(thumbnail) => Some(thumbnail.as_ref()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, WaveformStatus::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otodecks_core::StereoSample;

    /// Local path that does not exist, so a queued generation fails fast
    fn source(name: &str) -> TrackSource {
        TrackSource::from_path(std::env::temp_dir().join(format!("otodecks-absent-{}", name))).unwrap()
    }

    fn thumbnail() -> Arc<Thumbnail> {
        Arc::new(Thumbnail::from_frames(&[StereoSample::mono(0.5); 16], 16, 8))
    }

    #[test]
    fn test_cache_hit_attaches_immediately() {
        let mut cache = ThumbnailCache::new(4, 8);
        cache.insert(source("hit.wav"), thumbnail());

        let mut state = WaveformState::new();
        state.load_url(source("hit.wav"), &mut cache);
        assert!(state.thumbnail().is_some());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let mut cache = ThumbnailCache::new(4, 8);
        let mut state = WaveformState::new();
        state.load_url(source("current.wav"), &mut cache);
        assert!(state.is_loading());

        let stale = ThumbnailResult {
            source: source("previous.wav"),
            thumbnail: Ok(thumbnail()),
        };
        assert!(!state.thumbnail_ready(&stale));
        assert!(state.is_loading());

        let fresh = ThumbnailResult {
            source: source("current.wav"),
            thumbnail: Ok(thumbnail()),
        };
        assert!(state.thumbnail_ready(&fresh));
        assert!(state.thumbnail().is_some());
    }

    #[test]
    fn test_failed_generation_shows_no_waveform() {
        let mut cache = ThumbnailCache::new(4, 8);
        let mut state = WaveformState::new();
        state.load_url(source("bad.wav"), &mut cache);

        state.thumbnail_ready(&ThumbnailResult {
            source: source("bad.wav"),
            thumbnail: Err("unsupported".to_string()),
        });
        assert!(matches!(state.status(), WaveformStatus::Failed(_)));
        assert!(state.thumbnail().is_none());
    }

    #[test]
    fn test_position_is_clamped() {
        let mut state = WaveformState::new();
        assert!(state.set_position_relative(0.25));
        assert!(!state.set_position_relative(0.25));
        assert!(state.set_position_relative(7.0));
        assert_eq!(state.position(), 1.0);
        assert!(!state.set_position_relative(f64::NAN));
        assert_eq!(state.position(), 1.0);
    }
}
