//! Canvas program for the deck waveform
//!
//! Draws the cached thumbnail with a playhead and turns mouse presses and
//! drags into `on_seek(position)` calls with a normalized position.

use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Program, Stroke, Text};
use iced::{mouse, Point, Rectangle, Size, Theme};

use super::state::{WaveformState, WaveformStatus};
use super::thumbnail::Thumbnail;
use crate::theme::WaveformPalette;

/// Width of the playhead bar in pixels
const PLAYHEAD_WIDTH: f32 = 2.0;

/// Canvas state tracking an in-progress drag
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformInteraction {
    pub is_dragging: bool,
}

/// Waveform canvas with click/drag-to-seek
pub struct WaveformCanvas<'a, Message, F>
where
    F: Fn(f64) -> Message,
{
    pub state: &'a WaveformState,
    pub palette: WaveformPalette,
    pub on_seek: F,
}

/// Horizontal position inside `bounds` as 0.0..=1.0
pub(crate) fn relative_x(position: Point, bounds: Rectangle) -> f64 {
    if bounds.width <= 0.0 {
        return 0.0;
    }
    (position.x / bounds.width).clamp(0.0, 1.0) as f64
}

impl<'a, Message, F> Program<Message> for WaveformCanvas<'a, Message, F>
where
    Message: Clone,
    F: Fn(f64) -> Message,
{
    type State = WaveformInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let Some(position) = cursor.position_in(bounds) else {
            if matches!(event, Event::Mouse(mouse::Event::ButtonReleased(_))) {
                interaction.is_dragging = false;
            }
            return None;
        };

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                interaction.is_dragging = true;
                Some(canvas::Action::publish((self.on_seek)(relative_x(position, bounds))))
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) if interaction.is_dragging => {
                Some(canvas::Action::publish((self.on_seek)(relative_x(position, bounds))))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                interaction.is_dragging = false;
                None
            }
            _ => None,
        }
    }

    fn mouse_interaction(
        &self,
        _interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) && self.state.thumbnail().is_some() {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let palette = &self.palette;

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), palette.background);
        frame.stroke(
            &Path::rectangle(Point::ORIGIN, bounds.size()),
            Stroke::default().with_color(palette.border).with_width(1.0),
        );

        let message = match self.state.status() {
            WaveformStatus::Ready(thumbnail) => {
                draw_thumbnail(&mut frame, thumbnail, palette, bounds.size());
                draw_playhead(&mut frame, self.state.position(), palette, bounds.size());
                return vec![frame.into_geometry()];
            }
            WaveformStatus::Empty => "File not loaded...".to_string(),
            WaveformStatus::Loading => "Loading waveform...".to_string(),
            WaveformStatus::Failed(reason) => format!("No waveform available ({})", reason),
        };

        frame.fill_text(Text {
            content: message,
            position: Point::new(bounds.width / 2.0, bounds.height / 2.0),
            size: 16.0.into(),
            color: palette.text,
            align_x: Horizontal::Center.into(),
            align_y: Vertical::Center.into(),
            ..Text::default()
        });

        vec![frame.into_geometry()]
    }
}

fn draw_thumbnail(frame: &mut Frame, thumbnail: &Thumbnail, palette: &WaveformPalette, size: Size) {
    let peaks = thumbnail.peaks();
    if peaks.is_empty() {
        return;
    }

    let center_y = size.height / 2.0;
    let scale = center_y * 0.9;
    let column_width = size.width / peaks.len() as f32;

    let waveform = Path::new(|builder| {
        for (i, &(min, max)) in peaks.iter().enumerate() {
            let x = (i as f32 + 0.5) * column_width;
            // Keep silent columns visible as a 1px line
            let top = center_y - max.max(0.0) * scale - 0.5;
            let bottom = center_y - min.min(0.0) * scale + 0.5;
            builder.move_to(Point::new(x, top));
            builder.line_to(Point::new(x, bottom));
        }
    });

    frame.stroke(
        &waveform,
        Stroke::default()
            .with_color(palette.waveform)
            .with_width(column_width.max(1.0)),
    );
}

fn draw_playhead(frame: &mut Frame, position: f64, palette: &WaveformPalette, size: Size) {
    let max_x = (size.width - PLAYHEAD_WIDTH).max(0.0);
    let x = (position as f32 * size.width - PLAYHEAD_WIDTH / 2.0).clamp(0.0, max_x);
    frame.fill_rectangle(
        Point::new(x, 0.0),
        Size::new(PLAYHEAD_WIDTH, size.height),
        palette.playhead,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_x() {
        let bounds = Rectangle::new(Point::new(100.0, 50.0), Size::new(400.0, 120.0));
        // position_in yields coordinates relative to the bounds origin
        assert_eq!(relative_x(Point::new(100.0, 10.0), bounds), 0.25);
        assert_eq!(relative_x(Point::new(0.0, 10.0), bounds), 0.0);
        assert_eq!(relative_x(Point::new(450.0, 10.0), bounds), 1.0);
    }

    #[test]
    fn test_relative_x_zero_width() {
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(0.0, 120.0));
        assert_eq!(relative_x(Point::new(10.0, 10.0), bounds), 0.0);
    }
}
