//! Waveform view function

use iced::widget::Canvas;
use iced::{Element, Length};

use super::canvas::WaveformCanvas;
use super::state::{WaveformState, WAVEFORM_HEIGHT};
use crate::theme::WaveformPalette;

/// Waveform element with click/drag-to-seek
///
/// `on_seek` receives the normalized position (0.0 to 1.0) under the cursor.
///
/// ```ignore
/// let waveform = waveform_display(&self.waveform, DeckMessage::Seek);
/// ```
pub fn waveform_display<'a, Message>(
    state: &'a WaveformState,
    on_seek: impl Fn(f64) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    Canvas::new(WaveformCanvas {
        state,
        palette: WaveformPalette::default(),
        on_seek,
    })
    .width(Length::Fill)
    .height(Length::Fixed(WAVEFORM_HEIGHT))
    .into()
}
