//! CPAL output stream
//!
//! ```text
//! ┌──────────────────┐   lock() (brief)    ┌─────────────────────────┐
//! │     UI Thread    │────────────────────►│  Arc<Mutex<AudioEngine>> │
//! └──────────────────┘                     └────────────▲────────────┘
//!                                                       │ try_lock()
//!                                          ┌────────────┴────────────┐
//!                                          │   CPAL Audio Thread     │
//!                                          │ (silence on contention) │
//!                                          └─────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize as CpalBufferSize, SampleFormat, Stream, StreamConfig};

use super::config::AudioConfig;
use super::device::{find_device_by_name, get_default_device, log_available_devices};
use super::error::{AudioError, AudioResult};
use crate::engine::{AudioEngine, MAX_BUFFER_SIZE};
use crate::types::{StereoBuffer, StereoSample, DEFAULT_SAMPLE_RATE};

/// Engine shared between the UI and the audio callback
pub type SharedEngine = Arc<Mutex<AudioEngine>>;

/// Keeps the output stream alive. Drop this to stop audio.
pub struct AudioHandle {
    _stream: Stream,
    engine: SharedEngine,
    device_name: String,
    sample_rate: u32,
    buffer_size: u32,
}

impl AudioHandle {
    /// Engine driven by this stream
    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// One-way output latency in milliseconds
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }
}

/// Open the output device, create the engine at the negotiated rate and
/// start streaming
pub fn start_audio_system(config: &AudioConfig) -> AudioResult<AudioHandle> {
    let device = match &config.device {
        Some(name) => match find_device_by_name(name) {
            Ok(device) => device,
            Err(e) => {
                log_available_devices();
                return Err(e);
            }
        },
        None => get_default_device()?,
    };

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    log::info!("Using audio device: {}", device_name);

    let (supported_config, buffer_size) = get_output_config(&device, config)?;
    let sample_rate = supported_config.sample_rate().0;

    let stream_config = StreamConfig {
        channels: supported_config.channels(),
        sample_rate: supported_config.sample_rate(),
        buffer_size: CpalBufferSize::Fixed(buffer_size),
    };

    log::info!(
        "Audio config: {} channels, {}Hz, {} frames (~{:.1}ms latency)",
        stream_config.channels,
        sample_rate,
        buffer_size,
        config.buffer_size.latency_ms(sample_rate)
    );

    let engine: SharedEngine = Arc::new(Mutex::new(AudioEngine::new(sample_rate)));

    let stream = build_output_stream(&device, &stream_config, Arc::clone(&engine))?;
    stream
        .play()
        .map_err(|e| AudioError::StartStream(e.to_string()))?;

    log::info!("Audio stream started");

    Ok(AudioHandle {
        _stream: stream,
        engine,
        device_name,
        sample_rate,
        buffer_size,
    })
}

/// Pick the best output configuration for a device
///
/// Prefers f32 stereo at the requested rate. Returns the config and the
/// buffer size in frames.
fn get_output_config(
    device: &cpal::Device,
    config: &AudioConfig,
) -> AudioResult<(cpal::SupportedStreamConfig, u32)> {
    let supported_configs: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| AudioError::DeviceQuery(e.to_string()))?
        .collect();

    let target_rate = config.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
    let supports_rate =
        |c: &cpal::SupportedStreamConfigRange| (c.min_sample_rate().0..=c.max_sample_rate().0).contains(&target_rate);

    let best = supported_configs
        .iter()
        .find(|c| c.sample_format() == SampleFormat::F32 && c.channels() >= 2 && supports_rate(c))
        .or_else(|| {
            supported_configs
                .iter()
                .find(|c| c.sample_format() == SampleFormat::F32 && c.channels() >= 2)
        })
        .or_else(|| supported_configs.iter().find(|c| c.sample_format() == SampleFormat::F32))
        .ok_or_else(|| AudioError::DeviceQuery("No f32 output configuration".to_string()))?;

    let sample_rate = if supports_rate(best) {
        cpal::SampleRate(target_rate)
    } else {
        let fallback = best.max_sample_rate();
        log::warn!(
            "Audio device doesn't support {}Hz, falling back to {}Hz (tracks will be resampled)",
            target_rate,
            fallback.0
        );
        fallback
    };

    let buffer_size = config.buffer_size.frames();
    log::debug!("Selected buffer size: {} frames", buffer_size);

    Ok((best.clone().with_sample_rate(sample_rate), buffer_size))
}

fn build_output_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    engine: SharedEngine,
) -> AudioResult<Stream> {
    let channels = config.channels as usize;
    let mut buffer = StereoBuffer::silence(MAX_BUFFER_SIZE);

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                // Never block the audio thread on the UI
                let Ok(mut engine) = engine.try_lock() else {
                    data.fill(0.0);
                    return;
                };

                for chunk in data.chunks_mut(MAX_BUFFER_SIZE * channels) {
                    buffer.set_len_from_capacity(chunk.len() / channels);
                    engine.process(&mut buffer);
                    write_interleaved(chunk, buffer.as_slice(), channels);
                }
            },
            move |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::BuildStream(e.to_string()))
}

/// Copy stereo frames into a device buffer with `channels` channels
///
/// Mono devices get the left channel; channels past two are silent.
fn write_interleaved(data: &mut [f32], frames: &[StereoSample], channels: usize) {
    if channels == 2 && data.len() == frames.len() * 2 {
        data.copy_from_slice(bytemuck::cast_slice(frames));
        return;
    }

    for (i, out) in data.chunks_mut(channels).enumerate() {
        let Some(frame) = frames.get(i) else {
            out.fill(0.0);
            continue;
        };
        out[0] = frame.left;
        if channels > 1 {
            out[1] = frame.right;
        }
        for ch in out.iter_mut().skip(2) {
            *ch = 0.0;
        }
    }
}
