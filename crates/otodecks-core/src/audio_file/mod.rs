//! Audio file decoding
//!
//! Turns a [`TrackSource`] into a fully decoded, in-memory stereo track at the
//! engine sample rate:
//!
//! 1. Local paths are opened from disk, http(s) URLs are fetched into memory
//! 2. Symphonia probes the container and decodes the first audio track
//! 3. Channels are folded to stereo (mono duplicated, extra channels dropped)
//! 4. Rubato converts the sample rate if the file does not match the engine

mod resample;

use std::fs::File;
use std::io::{Cursor, Read};
use std::sync::Arc;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::source::TrackSource;
use crate::types::{StereoSample, DEFAULT_SAMPLE_RATE};

pub use resample::resample_frames;

/// Upper bound for remote downloads (a 10 minute 320kbps MP3 is ~24MB)
const MAX_DOWNLOAD_BYTES: u64 = 256 * 1024 * 1024;

/// Audio file errors
#[derive(Error, Debug)]
pub enum AudioFileError {
    #[error("Failed to open {source_ref}: {error}")]
    Io {
        source_ref: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("No audio track found in {0}")]
    NoAudioTrack(String),

    #[error("Decoded no audio frames from {0}")]
    Empty(String),

    #[error("Sample rate conversion failed: {0}")]
    Resample(String),
}

/// Result type for decoding operations
pub type AudioFileResult<T> = Result<T, AudioFileError>;

/// Raw decode output before any sample rate conversion
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Stereo frames at `sample_rate`
    pub frames: Vec<StereoSample>,
    /// Sample rate of the file
    pub sample_rate: u32,
    /// Channel count of the file (before folding to stereo)
    pub channels: u16,
}

/// A fully decoded track ready for playback
///
/// Frames are shared through an `Arc` so the thumbnail generator and the deck
/// can hold the same data without copying.
#[derive(Debug, Clone)]
pub struct DecodedTrack {
    source: TrackSource,
    frames: Arc<[StereoSample]>,
    sample_rate: u32,
}

impl DecodedTrack {
    /// Decode `source` and convert it to `target_rate`
    ///
    /// This is blocking: it reads (or downloads) and decodes the whole file.
    pub fn open(source: &TrackSource, target_rate: u32) -> AudioFileResult<Self> {
        let decoded = decode_source(source)?;
        let frames = if decoded.sample_rate == target_rate {
            decoded.frames
        } else {
            log::info!(
                "Resampling {} from {}Hz to {}Hz",
                source.display_name(),
                decoded.sample_rate,
                target_rate
            );
            resample_frames(&decoded.frames, decoded.sample_rate, target_rate)?
        };

        log::info!(
            "Decoded {} ({} frames, {:.1}s @ {}Hz, {} source channels)",
            source.display_name(),
            frames.len(),
            frames.len() as f64 / target_rate as f64,
            target_rate,
            decoded.channels
        );

        Ok(Self {
            source: source.clone(),
            frames: frames.into(),
            sample_rate: target_rate,
        })
    }

    /// Build a track from frames already in memory
    pub fn from_frames(source: TrackSource, frames: Vec<StereoSample>, sample_rate: u32) -> Self {
        Self {
            source,
            frames: frames.into(),
            sample_rate: if sample_rate == 0 { DEFAULT_SAMPLE_RATE } else { sample_rate },
        }
    }

    pub fn source(&self) -> &TrackSource {
        &self.source
    }

    pub fn frames(&self) -> &[StereoSample] {
        &self.frames
    }

    /// Shared handle to the frame data
    pub fn shared_frames(&self) -> Arc<[StereoSample]> {
        Arc::clone(&self.frames)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }
}

/// Decode a source at its native sample rate
pub fn decode_source(source: &TrackSource) -> AudioFileResult<DecodedAudio> {
    let media: Box<dyn MediaSource> = match source {
        TrackSource::Path(path) => {
            let file = File::open(path).map_err(|error| AudioFileError::Io {
                source_ref: source.to_string(),
                error,
            })?;
            Box::new(file)
        }
        TrackSource::Url(url) => Box::new(Cursor::new(fetch_url(url.as_str())?)),
    };

    let mut hint = Hint::new();
    if let Some(ext) = source.extension() {
        hint.with_extension(&ext);
    }

    decode_media(media, &hint, &source.to_string())
}

/// Download a remote resource into memory
fn fetch_url(url: &str) -> AudioFileResult<Vec<u8>> {
    log::info!("Fetching {}", url);

    let response = ureq::get(url).call().map_err(|e| AudioFileError::Http {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let bytes = read_limited(response.into_reader(), MAX_DOWNLOAD_BYTES, url)?;

    log::debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}

/// Read a whole body, failing rather than truncating when it exceeds `limit` bytes
fn read_limited(reader: impl Read, limit: u64, url: &str) -> AudioFileResult<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|error| AudioFileError::Io {
            source_ref: url.to_string(),
            error,
        })?;

    if bytes.len() as u64 > limit {
        return Err(AudioFileError::Http {
            url: url.to_string(),
            message: format!("response exceeds {} bytes", limit),
        });
    }
    Ok(bytes)
}

/// Decode every packet of the first audio track into stereo frames
fn decode_media(
    media: Box<dyn MediaSource>,
    hint: &Hint,
    label: &str,
) -> AudioFileResult<DecodedAudio> {
    let mss = MediaSourceStream::new(media, Default::default());

    let probed = symphonia::default::get_probe()
        .format(hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioFileError::UnsupportedFormat(format!("{}: {}", label, e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioFileError::NoAudioTrack(label.to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioFileError::UnsupportedFormat(format!("{}: unknown sample rate", label)))?;
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(2);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioFileError::UnsupportedFormat(format!("{}: {}", label, e)))?;

    let mut frames: Vec<StereoSample> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet from {}: {}", label, e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping corrupt packet in {}: {}", label, e);
                continue;
            }
            Err(e) => {
                log::warn!("Decoder error in {}: {}", label, e);
                break;
            }
        };

        let spec = *decoded.spec();
        channels = spec.channels.count() as u16;

        let buf = sample_buf.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
        if buf.capacity() < decoded.capacity() * spec.channels.count() {
            *buf = SampleBuffer::new(decoded.capacity() as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);
        fold_to_stereo(buf.samples(), channels as usize, &mut frames);
    }

    if frames.is_empty() {
        return Err(AudioFileError::Empty(label.to_string()));
    }

    Ok(DecodedAudio {
        frames,
        sample_rate,
        channels,
    })
}

/// Append interleaved samples with `channels` channels as stereo frames
fn fold_to_stereo(interleaved: &[f32], channels: usize, out: &mut Vec<StereoSample>) {
    match channels {
        0 => {}
        1 => out.extend(interleaved.iter().map(|&s| StereoSample::mono(s))),
        n => out.extend(
            interleaved
                .chunks_exact(n)
                .map(|frame| StereoSample::new(frame[0], frame[1])),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// Write a sine wave WAV fixture
    fn write_wav(path: &Path, sample_rate: u32, channels: u16, seconds: f32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let total = (sample_rate as f32 * seconds) as usize;
        for i in 0..total {
            let t = i as f32 / sample_rate as f32;
            let value = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.5;
            for _ in 0..channels {
                writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_limited_rejects_oversized_body() {
        let url = "https://example.com/big.mp3";

        let body = read_limited(Cursor::new(vec![7u8; 16]), 16, url).unwrap();
        assert_eq!(body.len(), 16);

        match read_limited(Cursor::new(vec![7u8; 17]), 16, url) {
            Err(AudioFileError::Http { url: failed, message }) => {
                assert_eq!(failed, url);
                assert!(message.contains("exceeds 16 bytes"));
            }
            other => panic!("expected Http error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_decode_stereo_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 48000, 2, 1.0);

        let source = TrackSource::from_path(&path).unwrap();
        let track = DecodedTrack::open(&source, 48000).unwrap();

        assert_eq!(track.sample_rate(), 48000);
        assert_eq!(track.frame_count(), 48000);
        assert!((track.duration_seconds() - 1.0).abs() < 1e-6);
        assert_eq!(track.source(), &source);
    }

    #[test]
    fn test_decode_mono_duplicates_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 48000, 1, 0.25);

        let decoded = decode_source(&TrackSource::from_path(&path).unwrap()).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.frames.len(), 12000);
        assert!(decoded.frames.iter().all(|f| f.left == f.right));
    }

    #[test]
    fn test_open_converts_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cd.wav");
        write_wav(&path, 44100, 2, 0.5);

        let track = DecodedTrack::open(&TrackSource::from_path(&path).unwrap(), 48000).unwrap();
        assert_eq!(track.sample_rate(), 48000);
        assert_eq!(track.frame_count(), 24000);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = TrackSource::from_path(dir.path().join("nope.wav")).unwrap();
        assert!(matches!(
            DecodedTrack::open(&source, 48000),
            Err(AudioFileError::Io { .. })
        ));
    }

    #[test]
    fn test_garbage_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"definitely not audio data").unwrap();
        assert!(DecodedTrack::open(&TrackSource::from_path(&path).unwrap(), 48000).is_err());
    }

    #[test]
    fn test_fold_multichannel_takes_first_pair() {
        let mut out = Vec::new();
        fold_to_stereo(&[0.1, 0.2, 0.9, 0.3, 0.4, 0.9], 3, &mut out);
        assert_eq!(out, vec![StereoSample::new(0.1, 0.2), StereoSample::new(0.3, 0.4)]);
    }
}
