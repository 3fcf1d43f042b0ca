//! Transport - start/stop, seek, gain and looping over an in-memory track

use std::sync::Arc;

use crate::types::StereoSample;

/// Playback transport over decoded stereo frames
///
/// Position is kept in fractional frames so the resampling stage can advance
/// it by non-integer steps. The transport knows nothing about speed; it only
/// moves when told to.
#[derive(Debug, Clone)]
pub struct AudioTransport {
    frames: Arc<[StereoSample]>,
    sample_rate: u32,
    /// Playhead in frames, always within [0, len]
    position: f64,
    playing: bool,
    looping: bool,
    gain: f32,
}

impl AudioTransport {
    pub fn new() -> Self {
        Self {
            frames: Arc::from(Vec::new()),
            sample_rate: crate::types::DEFAULT_SAMPLE_RATE,
            position: 0.0,
            playing: false,
            looping: false,
            gain: 1.0,
        }
    }

    /// Replace the source, rewinding to the start and stopping playback
    ///
    /// Gain and looping carry over to the new source.
    pub fn set_source(&mut self, frames: Arc<[StereoSample]>, sample_rate: u32) {
        self.frames = frames;
        self.sample_rate = sample_rate.max(1);
        self.position = 0.0;
        self.playing = false;
    }

    #[inline]
    pub fn has_source(&self) -> bool {
        !self.frames.is_empty()
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn length_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn length_seconds(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }

    #[inline]
    pub fn position_frames(&self) -> f64 {
        self.position
    }

    pub fn position_seconds(&self) -> f64 {
        self.position / self.sample_rate as f64
    }

    /// Seek to an absolute time, clamped to [0, length]
    pub fn set_position_seconds(&mut self, seconds: f64) {
        let frames = seconds * self.sample_rate as f64;
        self.position = frames.clamp(0.0, self.frames.len() as f64);
    }

    /// Start playback (ignored without a source)
    pub fn start(&mut self) {
        if self.has_source() {
            self.playing = true;
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// True when a source is present and the playhead reached its end
    pub fn is_finished(&self) -> bool {
        self.has_source() && self.position >= self.frames.len() as f64
    }

    /// Frame at an integer index
    ///
    /// Past the end this wraps when looping and is silent otherwise.
    #[inline]
    pub fn frame_at(&self, index: usize) -> StereoSample {
        let len = self.frames.len();
        if index < len {
            self.frames[index]
        } else if self.looping && len > 0 {
            self.frames[index % len]
        } else {
            StereoSample::silence()
        }
    }

    /// Move the playhead forward by `frames`
    ///
    /// Reaching the end wraps to the start when looping, otherwise playback
    /// stops with the playhead parked at the end.
    pub fn advance(&mut self, frames: f64) {
        let len = self.frames.len() as f64;
        if len == 0.0 {
            return;
        }

        self.position += frames;
        if self.position >= len {
            if self.looping {
                self.position %= len;
            } else {
                self.position = len;
                self.playing = false;
            }
        }
    }
}

impl Default for AudioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_with(len: usize) -> AudioTransport {
        let frames: Vec<StereoSample> = (0..len).map(|i| StereoSample::mono(i as f32)).collect();
        let mut transport = AudioTransport::new();
        transport.set_source(frames.into(), 100);
        transport
    }

    #[test]
    fn test_start_without_source_is_ignored() {
        let mut transport = AudioTransport::new();
        transport.start();
        assert!(!transport.is_playing());
        assert!(!transport.is_finished());
    }

    #[test]
    fn test_seek_clamps_to_track() {
        let mut transport = transport_with(200);
        transport.set_position_seconds(1.5);
        assert_eq!(transport.position_frames(), 150.0);
        transport.set_position_seconds(-3.0);
        assert_eq!(transport.position_frames(), 0.0);
        transport.set_position_seconds(99.0);
        assert_eq!(transport.position_seconds(), 2.0);
        assert!(transport.is_finished());
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut transport = transport_with(100);
        transport.start();
        transport.advance(80.0);
        assert!(transport.is_playing());
        transport.advance(30.0);
        assert!(!transport.is_playing());
        assert_eq!(transport.position_frames(), 100.0);
        assert!(transport.is_finished());
    }

    #[test]
    fn test_advance_wraps_when_looping() {
        let mut transport = transport_with(100);
        transport.set_looping(true);
        transport.start();
        transport.advance(130.0);
        assert!(transport.is_playing());
        assert_eq!(transport.position_frames(), 30.0);
        assert!(!transport.is_finished());
    }

    #[test]
    fn test_frame_at_past_end() {
        let mut transport = transport_with(10);
        assert_eq!(transport.frame_at(12), StereoSample::silence());
        transport.set_looping(true);
        assert_eq!(transport.frame_at(12), StereoSample::mono(2.0));
    }

    #[test]
    fn test_new_source_rewinds_and_stops() {
        let mut transport = transport_with(100);
        transport.set_gain(0.5);
        transport.start();
        transport.advance(40.0);
        transport.set_source(vec![StereoSample::silence(); 50].into(), 100);
        assert_eq!(transport.position_frames(), 0.0);
        assert!(!transport.is_playing());
        assert_eq!(transport.gain(), 0.5);
    }
}
