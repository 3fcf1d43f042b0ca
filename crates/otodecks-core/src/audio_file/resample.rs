//! Load-time sample rate conversion

use rubato::{FftFixedIn, Resampler};

use super::{AudioFileError, AudioFileResult};
use crate::types::StereoSample;

/// Input chunk size fed to the FFT resampler
const CHUNK_SIZE: usize = 1024;

/// Convert stereo frames from `from_rate` to `to_rate`
///
/// The result has exactly `ceil(len * to_rate / from_rate)` frames. The
/// resampler's output delay is trimmed from the front so the converted track
/// stays aligned with the input.
pub fn resample_frames(
    frames: &[StereoSample],
    from_rate: u32,
    to_rate: u32,
) -> AudioFileResult<Vec<StereoSample>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioFileError::Resample(format!(
            "invalid rates {} -> {}",
            from_rate, to_rate
        )));
    }
    if from_rate == to_rate || frames.is_empty() {
        return Ok(frames.to_vec());
    }

    let expected = (frames.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;

    let mut resampler = FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 2, 2)
        .map_err(|e| AudioFileError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let left: Vec<f32> = frames.iter().map(|f| f.left).collect();
    let right: Vec<f32> = frames.iter().map(|f| f.right).collect();

    let mut out_left = Vec::with_capacity(expected + delay + CHUNK_SIZE * 2);
    let mut out_right = Vec::with_capacity(expected + delay + CHUNK_SIZE * 2);

    let mut pos = 0;
    loop {
        let needed = resampler.input_frames_next();
        if pos + needed > frames.len() {
            break;
        }
        let chunk = [&left[pos..pos + needed], &right[pos..pos + needed]];
        let out = resampler
            .process(&chunk[..], None)
            .map_err(|e| AudioFileError::Resample(e.to_string()))?;
        out_left.extend_from_slice(&out[0]);
        out_right.extend_from_slice(&out[1]);
        pos += needed;
    }

    if pos < frames.len() {
        let chunk = [&left[pos..], &right[pos..]];
        let out = resampler
            .process_partial(Some(&chunk[..]), None)
            .map_err(|e| AudioFileError::Resample(e.to_string()))?;
        out_left.extend_from_slice(&out[0]);
        out_right.extend_from_slice(&out[1]);
    }

    // Drain the filter tail until the delayed output covers the whole track
    while out_left.len() < delay + expected {
        let out = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| AudioFileError::Resample(e.to_string()))?;
        if out[0].is_empty() {
            break;
        }
        out_left.extend_from_slice(&out[0]);
        out_right.extend_from_slice(&out[1]);
    }

    let mut result: Vec<StereoSample> = out_left
        .iter()
        .zip(out_right.iter())
        .skip(delay)
        .take(expected)
        .map(|(&l, &r)| StereoSample::new(l, r))
        .collect();
    result.resize(expected, StereoSample::silence());

    log::debug!(
        "Resampled {} frames @ {}Hz -> {} frames @ {}Hz (delay {})",
        frames.len(),
        from_rate,
        result.len(),
        to_rate,
        delay
    );

    Ok(result)
}
