//! Main audio engine - both decks mixed to one stereo output

use crate::audio_file::DecodedTrack;
use crate::types::{DeckId, StereoBuffer, NUM_DECKS};

use super::DeckPlayer;

/// Maximum block size rendered per deck in one pass
///
/// Larger output buffers are processed in chunks of this size, so the scratch
/// buffer is allocated once.
pub const MAX_BUFFER_SIZE: usize = 8192;

/// The main audio engine
///
/// Shared between the UI thread and the audio callback as
/// `Arc<Mutex<AudioEngine>>`.
pub struct AudioEngine {
    decks: [DeckPlayer; NUM_DECKS],
    sample_rate: u32,
    /// Pre-allocated per-deck render buffer
    deck_buffer: StereoBuffer,
}

impl AudioEngine {
    /// Create an engine running at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        log::info!("Audio engine at {}Hz with {} decks", sample_rate, NUM_DECKS);
        Self {
            decks: std::array::from_fn(|i| DeckPlayer::new(DeckId::new(i), sample_rate)),
            sample_rate,
            deck_buffer: StereoBuffer::silence(MAX_BUFFER_SIZE),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get a reference to a deck
    pub fn deck(&self, id: usize) -> Option<&DeckPlayer> {
        self.decks.get(id)
    }

    /// Get a mutable reference to a deck
    pub fn deck_mut(&mut self, id: usize) -> Option<&mut DeckPlayer> {
        self.decks.get_mut(id)
    }

    /// All decks, in order
    pub fn decks_mut(&mut self) -> std::slice::IterMut<'_, DeckPlayer> {
        self.decks.iter_mut()
    }

    /// Load a decoded track into a deck (starts playback)
    pub fn load_track(&mut self, deck: usize, track: DecodedTrack) {
        match self.decks.get_mut(deck) {
            Some(player) => player.load_track(track),
            None => log::warn!("load_track: no deck {}", deck),
        }
    }

    /// Render and mix all decks into `out`
    ///
    /// The mix is the plain sum of both decks, hard clipped to [-1, 1].
    pub fn process(&mut self, out: &mut StereoBuffer) {
        out.fill_silence();

        let mut offset = 0;
        while offset < out.len() {
            let n = (out.len() - offset).min(MAX_BUFFER_SIZE);
            self.deck_buffer.set_len_from_capacity(n);

            for deck in self.decks.iter_mut() {
                deck.process(self.deck_buffer.as_mut_slice());
                let dst = &mut out.as_mut_slice()[offset..offset + n];
                for (mixed, frame) in dst.iter_mut().zip(self.deck_buffer.as_slice()) {
                    *mixed += *frame;
                }
            }

            offset += n;
        }

        for frame in out.as_mut_slice() {
            *frame = frame.clamp_unit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TrackSource;
    use crate::types::StereoSample;

    fn constant_track(name: &str, value: f32, frames: usize) -> DecodedTrack {
        let source = TrackSource::parse(format!("https://example.com/{}", name)).unwrap();
        DecodedTrack::from_frames(source, vec![StereoSample::mono(value); frames], 48000)
    }

    #[test]
    fn test_new_engine_has_two_idle_decks() {
        let engine = AudioEngine::new(48000);
        assert!(engine.deck(0).is_some());
        assert!(engine.deck(1).is_some());
        assert!(engine.deck(NUM_DECKS).is_none());
        assert!(!engine.deck(0).unwrap().is_loaded());
    }

    #[test]
    fn test_idle_engine_outputs_silence() {
        let mut engine = AudioEngine::new(48000);
        let mut out = StereoBuffer::from_vec(vec![StereoSample::mono(0.3); 256]);
        engine.process(&mut out);
        assert_eq!(out.peak(), 0.0);
    }

    #[test]
    fn test_decks_are_summed() {
        let mut engine = AudioEngine::new(48000);
        engine.load_track(0, constant_track("a.wav", 0.25, 4096));
        engine.load_track(1, constant_track("b.wav", 0.5, 4096));

        let mut out = StereoBuffer::silence(128);
        engine.process(&mut out);
        assert!((out[10].left - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_mix_is_clipped() {
        let mut engine = AudioEngine::new(48000);
        engine.load_track(0, constant_track("a.wav", 0.9, 4096));
        engine.load_track(1, constant_track("b.wav", 0.9, 4096));

        let mut out = StereoBuffer::silence(64);
        engine.process(&mut out);
        assert_eq!(out.peak(), 1.0);
    }

    #[test]
    fn test_large_buffers_are_chunked() {
        let mut engine = AudioEngine::new(48000);
        engine.load_track(0, constant_track("long.wav", 0.1, MAX_BUFFER_SIZE * 4));

        let mut out = StereoBuffer::silence(MAX_BUFFER_SIZE + 100);
        engine.process(&mut out);

        let deck = engine.deck(0).unwrap();
        assert_eq!(deck.position_seconds(), (MAX_BUFFER_SIZE + 100) as f64 / 48000.0);
        assert!((out[MAX_BUFFER_SIZE + 50].left - 0.1).abs() < 1e-6);
    }
}
