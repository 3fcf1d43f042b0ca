//! Audio output configuration

use serde::{Deserialize, Serialize};

/// Largest device buffer we request (frames)
pub const MAX_DEVICE_BUFFER_SIZE: u32 = 8192;

/// Buffer size used when none is configured (frames)
///
/// 512 frames @ 48kHz is ~10.7ms, plenty for a two-deck player.
pub const DEFAULT_BUFFER_SIZE: u32 = 512;

/// Preferred buffer size for the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BufferSize {
    /// Use [`DEFAULT_BUFFER_SIZE`]
    #[default]
    Default,
    /// Request a specific size in frames (clamped to 64..=8192)
    Fixed(u32),
}

impl BufferSize {
    /// Frames to request from the device
    pub fn frames(&self) -> u32 {
        match self {
            BufferSize::Default => DEFAULT_BUFFER_SIZE,
            BufferSize::Fixed(frames) => (*frames).clamp(64, MAX_DEVICE_BUFFER_SIZE),
        }
    }

    /// Latency in milliseconds at `sample_rate`
    pub fn latency_ms(&self, sample_rate: u32) -> f32 {
        (self.frames() as f32 / sample_rate as f32) * 1000.0
    }
}

/// Configuration for the output stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output device name (None = system default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Preferred sample rate (None = 48kHz). Falls back to the device's
    /// maximum rate when unsupported; tracks are converted on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    pub buffer_size: BufferSize,
}

impl AudioConfig {
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device = Some(name.into());
        self
    }

    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    pub fn with_buffer_frames(mut self, frames: u32) -> Self {
        self.buffer_size = BufferSize::Fixed(frames);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_frames() {
        assert_eq!(BufferSize::Default.frames(), DEFAULT_BUFFER_SIZE);
        assert_eq!(BufferSize::Fixed(16).frames(), 64);
        assert_eq!(BufferSize::Fixed(100_000).frames(), MAX_DEVICE_BUFFER_SIZE);
        assert!((BufferSize::Fixed(480).latency_ms(48000) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AudioConfig = serde_yaml::from_str("sample_rate: 44100\n").unwrap();
        assert_eq!(config.sample_rate, Some(44100));
        assert_eq!(config.device, None);
        assert_eq!(config.buffer_size, BufferSize::Default);
    }

    #[test]
    fn test_builder() {
        let config = AudioConfig::default()
            .with_device("hw:0,0")
            .with_buffer_frames(256);
        assert_eq!(config.device.as_deref(), Some("hw:0,0"));
        assert_eq!(config.buffer_size, BufferSize::Fixed(256));
    }
}
