//! Colors for the waveform display

use iced::Color;

/// Waveform display colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformPalette {
    pub background: Color,
    pub border: Color,
    pub waveform: Color,
    pub playhead: Color,
    /// Status text ("No file loaded", "Loading...")
    pub text: Color,
}

impl Default for WaveformPalette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb(0.08, 0.08, 0.1),
            border: Color::from_rgb(0.35, 0.35, 0.35),
            waveform: Color::from_rgb(1.0, 0.55, 0.0), // Orange (#FF8C00)
            playhead: Color::from_rgba(1.0, 0.2, 0.2, 0.9),
            text: Color::from_rgb(0.7, 0.7, 0.7),
        }
    }
}
