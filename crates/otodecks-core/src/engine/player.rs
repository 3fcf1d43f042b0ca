//! DeckPlayer - a single deck's playback source
//!
//! Composes the decoded track, the [`AudioTransport`] and the
//! [`ResamplingStage`] behind one controllable interface. Out-of-range
//! parameters are logged and rejected without touching state.

use crate::audio_file::{AudioFileError, DecodedTrack};
use crate::source::TrackSource;
use crate::types::{DeckId, StereoSample};

use super::{AudioTransport, PlayerError, PlayerResult, ResamplingStage};

/// Highest accepted speed ratio
pub const MAX_SPEED_RATIO: f64 = 100.0;

/// Read-only snapshot of a deck for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub loaded: bool,
    pub playing: bool,
    pub looping: bool,
    pub finished: bool,
    pub gain: f32,
    pub speed: f64,
    pub position_seconds: f64,
    pub length_seconds: f64,
    /// None when nothing is loaded
    pub position_relative: Option<f64>,
    pub source: Option<TrackSource>,
}

/// Playback source for one deck
pub struct DeckPlayer {
    id: DeckId,
    /// Engine output rate
    output_rate: u32,
    source: Option<TrackSource>,
    transport: AudioTransport,
    resampler: ResamplingStage,
}

impl DeckPlayer {
    pub fn new(id: DeckId, output_rate: u32) -> Self {
        Self {
            id,
            output_rate: output_rate.max(1),
            source: None,
            transport: AudioTransport::new(),
            resampler: ResamplingStage::new(),
        }
    }

    pub fn id(&self) -> DeckId {
        self.id
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Decode `source` and start playing it
    ///
    /// Blocks while decoding. On failure the previous track (if any) keeps
    /// playing untouched.
    pub fn load_url(&mut self, source: &TrackSource) -> Result<(), AudioFileError> {
        match DecodedTrack::open(source, self.output_rate) {
            Ok(track) => {
                self.load_track(track);
                Ok(())
            }
            Err(e) => {
                log::warn!("Deck {}: failed to load {}: {}", self.id.display_number(), source, e);
                Err(e)
            }
        }
    }

    /// Swap in an already decoded track and start playback
    pub fn load_track(&mut self, track: DecodedTrack) {
        log::info!(
            "Deck {}: loaded {} ({:.1}s)",
            self.id.display_number(),
            track.source().display_name(),
            track.duration_seconds()
        );

        self.transport.set_source(track.shared_frames(), track.sample_rate());
        self.source = Some(track.source().clone());
        self.transport.start();
    }

    /// Set output gain (0.0..=1.0)
    pub fn set_gain(&mut self, gain: f32) -> PlayerResult<()> {
        if !(0.0..=1.0).contains(&gain) {
            log::warn!("Deck {}: gain {} out of range [0, 1]", self.id.display_number(), gain);
            return Err(PlayerError::GainOutOfRange(gain));
        }
        self.transport.set_gain(gain);
        Ok(())
    }

    /// Set speed ratio (0.0..=[`MAX_SPEED_RATIO`])
    pub fn set_speed(&mut self, ratio: f64) -> PlayerResult<()> {
        if !(0.0..=MAX_SPEED_RATIO).contains(&ratio) {
            log::warn!(
                "Deck {}: speed ratio {} out of range [0, {}]",
                self.id.display_number(),
                ratio,
                MAX_SPEED_RATIO
            );
            return Err(PlayerError::SpeedOutOfRange {
                value: ratio,
                max: MAX_SPEED_RATIO,
            });
        }
        self.resampler.set_ratio(ratio);
        Ok(())
    }

    /// Seek to an absolute time, clamped to the track
    pub fn set_position(&mut self, seconds: f64) {
        if !self.is_loaded() {
            return;
        }
        if seconds.is_nan() {
            log::warn!("Deck {}: ignoring NaN seek", self.id.display_number());
            return;
        }
        self.transport.set_position_seconds(seconds);
    }

    /// Seek to a fraction of the track (0.0..=1.0)
    pub fn set_position_relative(&mut self, fraction: f64) -> PlayerResult<()> {
        if !(0.0..=1.0).contains(&fraction) {
            log::warn!(
                "Deck {}: relative position {} out of range [0, 1]",
                self.id.display_number(),
                fraction
            );
            return Err(PlayerError::PositionOutOfRange(fraction));
        }
        if !self.is_loaded() {
            return Err(PlayerError::NotLoaded);
        }
        self.transport
            .set_position_seconds(self.transport.length_seconds() * fraction);
        Ok(())
    }

    pub fn start(&mut self) {
        self.transport.start();
    }

    pub fn stop(&mut self) {
        self.transport.stop();
    }

    pub fn set_looping(&mut self, looping: bool) -> PlayerResult<()> {
        if !self.is_loaded() {
            return Err(PlayerError::NotLoaded);
        }
        self.transport.set_looping(looping);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.transport.has_source()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn is_looping(&self) -> bool {
        self.transport.is_looping()
    }

    /// Loaded and the playhead reached the end
    pub fn is_finished(&self) -> bool {
        self.transport.is_finished()
    }

    pub fn gain(&self) -> f32 {
        self.transport.gain()
    }

    pub fn speed(&self) -> f64 {
        self.resampler.ratio()
    }

    pub fn position_seconds(&self) -> f64 {
        self.transport.position_seconds()
    }

    pub fn length_seconds(&self) -> f64 {
        self.transport.length_seconds()
    }

    /// Playhead as a fraction of the track, None when nothing is loaded
    pub fn position_relative(&self) -> Option<f64> {
        let length = self.transport.length_frames();
        if length == 0 {
            return None;
        }
        Some(self.transport.position_frames() / length as f64)
    }

    pub fn source(&self) -> Option<&TrackSource> {
        self.source.as_ref()
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            loaded: self.is_loaded(),
            playing: self.is_playing(),
            looping: self.is_looping(),
            finished: self.is_finished(),
            gain: self.gain(),
            speed: self.speed(),
            position_seconds: self.position_seconds(),
            length_seconds: self.length_seconds(),
            position_relative: self.position_relative(),
            source: self.source.clone(),
        }
    }

    /// Render the next block (audio thread)
    ///
    /// Fills `out` completely; silence when stopped or unloaded.
    pub fn process(&mut self, out: &mut [StereoSample]) {
        self.resampler
            .render(&mut self.transport, out, self.output_rate);

        let gain = self.transport.gain();
        if gain != 1.0 {
            for frame in out.iter_mut() {
                *frame *= gain;
            }
        }
    }
}
