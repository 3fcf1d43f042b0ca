//! Downsampling audio to per-column (min, max) peaks

use otodecks_core::StereoSample;

/// Generate one (min, max) pair per column across the whole track
///
/// Column boundaries are spread evenly with integer arithmetic, so every frame
/// lands in exactly one column. Both channels contribute to each column. When
/// the track has fewer frames than `columns`, the result is shortened to one
/// column per frame.
pub fn generate_peaks(frames: &[StereoSample], columns: usize) -> Vec<(f32, f32)> {
    let len = frames.len();
    if len == 0 || columns == 0 {
        return Vec::new();
    }

    let columns = columns.min(len);
    (0..columns)
        .map(|col| {
            let start = col * len / columns;
            let end = ((col + 1) * len / columns).max(start + 1);

            frames[start..end]
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), frame| {
                    (
                        min.min(frame.left).min(frame.right),
                        max.max(frame.left).max(frame.right),
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(generate_peaks(&[], 100).is_empty());
        assert!(generate_peaks(&[StereoSample::silence(); 10], 0).is_empty());
    }

    #[test]
    fn test_column_min_max_over_both_channels() {
        let frames = [
            StereoSample::new(0.1, -0.4),
            StereoSample::new(0.3, 0.0),
            StereoSample::new(-0.2, 0.9),
            StereoSample::new(0.0, 0.0),
        ];
        let peaks = generate_peaks(&frames, 2);
        assert_eq!(peaks, vec![(-0.4, 0.3), (-0.2, 0.9)]);
    }

    #[test]
    fn test_short_track_gets_fewer_columns() {
        let frames = vec![StereoSample::mono(0.5); 3];
        let peaks = generate_peaks(&frames, 1000);
        assert_eq!(peaks.len(), 3);
        assert!(peaks.iter().all(|&p| p == (0.5, 0.5)));
    }

    #[test]
    fn test_uneven_split_covers_every_frame() {
        let mut frames = vec![StereoSample::silence(); 10];
        frames[9] = StereoSample::mono(1.0);
        let peaks = generate_peaks(&frames, 3);
        assert_eq!(peaks.len(), 3);
        assert_eq!(peaks[2].1, 1.0);
    }
}
