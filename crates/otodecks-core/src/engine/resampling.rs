//! Varispeed resampling stage
//!
//! Reads the transport at a fractional step per output frame with linear
//! interpolation. Tempo and pitch change together, like a turntable.

use crate::types::StereoSample;

use super::AudioTransport;

/// Speed ratio stage between the transport and the output
#[derive(Debug, Clone)]
pub struct ResamplingStage {
    ratio: f64,
}

impl ResamplingStage {
    pub fn new() -> Self {
        Self { ratio: 1.0 }
    }

    /// Set the speed ratio (1.0 = normal, 0.0 = halted)
    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio;
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Render frames from `transport` into `out` at `output_rate`
    ///
    /// The step per output frame also folds in the ratio between the track's
    /// sample rate and the output rate. Frames after the transport stops
    /// (end of track) are silent. Gain is not applied here.
    pub fn render(&self, transport: &mut AudioTransport, out: &mut [StereoSample], output_rate: u32) {
        let step = self.ratio * transport.sample_rate() as f64 / output_rate.max(1) as f64;

        for i in 0..out.len() {
            if !transport.is_playing() {
                out[i..].fill(StereoSample::silence());
                return;
            }

            let position = transport.position_frames();
            let index = position.floor() as usize;
            let frac = (position - index as f64) as f32;

            let current = transport.frame_at(index);
            let next = transport.frame_at(index + 1);
            out[i] = current.lerp(&next, frac);

            transport.advance(step);
        }
    }
}

impl Default for ResamplingStage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_transport(len: usize) -> AudioTransport {
        let frames: Vec<StereoSample> = (0..len).map(|i| StereoSample::mono(i as f32)).collect();
        let mut transport = AudioTransport::new();
        transport.set_source(frames.into(), 48000);
        transport.start();
        transport
    }

    #[test]
    fn test_unity_ratio_copies_frames() {
        let mut transport = ramp_transport(16);
        let stage = ResamplingStage::new();
        let mut out = vec![StereoSample::silence(); 4];
        stage.render(&mut transport, &mut out, 48000);
        assert_eq!(out[3], StereoSample::mono(3.0));
        assert_eq!(transport.position_frames(), 4.0);
    }

    #[test]
    fn test_half_speed_interpolates() {
        let mut transport = ramp_transport(16);
        let mut stage = ResamplingStage::new();
        stage.set_ratio(0.5);
        let mut out = vec![StereoSample::silence(); 4];
        stage.render(&mut transport, &mut out, 48000);
        assert_eq!(out[1], StereoSample::mono(0.5));
        assert_eq!(out[3], StereoSample::mono(1.5));
        assert_eq!(transport.position_frames(), 2.0);
    }

    #[test]
    fn test_double_speed_advances_twice_as_far() {
        let mut transport = ramp_transport(64);
        let mut stage = ResamplingStage::new();
        stage.set_ratio(2.0);
        let mut out = vec![StereoSample::silence(); 8];
        stage.render(&mut transport, &mut out, 48000);
        assert_eq!(transport.position_frames(), 16.0);
    }

    #[test]
    fn test_output_rate_mismatch_adjusts_step() {
        let frames = vec![StereoSample::silence(); 1000];
        let mut transport = AudioTransport::new();
        transport.set_source(frames.into(), 24000);
        transport.start();
        let stage = ResamplingStage::new();
        let mut out = vec![StereoSample::silence(); 100];
        stage.render(&mut transport, &mut out, 48000);
        assert_eq!(transport.position_frames(), 50.0);
    }

    #[test]
    fn test_silence_after_end() {
        let mut transport = ramp_transport(3);
        let stage = ResamplingStage::new();
        let mut out = vec![StereoSample::mono(9.0); 6];
        stage.render(&mut transport, &mut out, 48000);
        assert_eq!(out[2], StereoSample::mono(2.0));
        assert!(out[3..].iter().all(|f| *f == StereoSample::silence()));
        assert!(transport.is_finished());
    }
}
