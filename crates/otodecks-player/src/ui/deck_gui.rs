//! Deck view component
//!
//! One deck's controls: play/stop, volume, speed, loop, a URL box and the
//! waveform. `DeckGui` holds UI state only; every action goes through the
//! `DeckPlayer` handed in by the app, and the player's state is read back
//! after each action and on every poll tick.

use iced::widget::{button, column, container, row, slider, text, text_input, toggler, Space};
use iced::{Center, Element, Fill, Length};

use otodecks_core::audio_file::DecodedTrack;
use otodecks_core::engine::DeckPlayer;
use otodecks_core::{DeckId, TrackSource};
use otodecks_widgets::{waveform_display, ThumbnailCache, ThumbnailResult, WaveformState};

use super::drop::DropPayload;
use crate::config::DeckConfig;

/// Height of the control row above the waveform
const CONTROL_ROW_HEIGHT: f32 = 50.0;

/// Play/stop button state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportButton {
    /// Nothing loaded; play/stop and loop are both disabled
    Disabled,
    Play,
    Stop,
}

impl TransportButton {
    pub fn label(self) -> &'static str {
        match self {
            TransportButton::Stop => "Stop",
            TransportButton::Play | TransportButton::Disabled => "Play",
        }
    }

    pub fn is_enabled(self) -> bool {
        self != TransportButton::Disabled
    }
}

/// Button state for a player that is (or isn't) loaded and playing
pub fn transport_button(loaded: bool, playing: bool) -> TransportButton {
    match (loaded, playing) {
        (false, _) => TransportButton::Disabled,
        (true, false) => TransportButton::Play,
        (true, true) => TransportButton::Stop,
    }
}

/// Messages for deck interactions
#[derive(Debug, Clone)]
pub enum DeckMessage {
    /// Play/stop button
    PlayStop,
    /// Loop toggle
    ToggleLoop(bool),
    SetVolume(f32),
    /// Speed slider, in percent
    SetSpeed(f32),
    /// Waveform click/drag (0.0-1.0)
    Seek(f64),
    UrlChanged(String),
    /// Load the URL box contents
    LoadUrl,
}

/// UI state of one deck
pub struct DeckGui {
    id: DeckId,
    volume: f32,
    speed_percent: f32,
    speed_range: (f32, f32),
    looping: bool,
    url_input: String,
    transport: TransportButton,
    /// Last load failure, shown under the URL box
    notice: Option<String>,
    waveform: WaveformState,
}

impl DeckGui {
    /// Create the deck and push the configured defaults into its player
    pub fn new(config: &DeckConfig, player: &mut DeckPlayer) -> Self {
        let mut deck = Self {
            id: player.id(),
            volume: player.gain(),
            speed_percent: (player.speed() * 100.0) as f32,
            speed_range: (config.speed_percent_min, config.speed_percent_max),
            looping: false,
            url_input: String::new(),
            transport: TransportButton::Disabled,
            notice: None,
            waveform: WaveformState::new(),
        };

        if player.set_gain(config.default_volume).is_ok() {
            deck.volume = config.default_volume;
        }
        if player.set_speed(percent_to_ratio(config.default_speed_percent)).is_ok() {
            deck.speed_percent = config.default_speed_percent;
        }
        deck.refresh(player);
        deck
    }

    /// Handle a deck message
    ///
    /// Returns a load request when the message asks for a new track; the
    /// owner decodes it and calls [`DeckGui::play_decoded`].
    pub fn handle_message(
        &mut self,
        msg: DeckMessage,
        player: &mut DeckPlayer,
    ) -> Option<DropPayload> {
        match msg {
            DeckMessage::PlayStop => {
                if player.is_playing() {
                    player.stop();
                } else {
                    player.start();
                }
            }
            DeckMessage::ToggleLoop(looping) => {
                if player.set_looping(looping).is_ok() {
                    self.looping = looping;
                    player.start();
                }
            }
            DeckMessage::SetVolume(volume) => {
                if player.set_gain(volume).is_ok() {
                    self.volume = volume;
                }
            }
            DeckMessage::SetSpeed(percent) => {
                if player.set_speed(percent_to_ratio(percent)).is_ok() {
                    self.speed_percent = percent;
                }
            }
            DeckMessage::Seek(position) => {
                if player.set_position_relative(position).is_ok() {
                    self.waveform.set_position_relative(position);
                }
            }
            DeckMessage::UrlChanged(url) => {
                self.url_input = url;
            }
            DeckMessage::LoadUrl => {
                return Some(DropPayload::Track {
                    file_url: self.url_input.clone(),
                });
            }
        }

        self.refresh(player);
        None
    }

    /// Periodic poll: move the playhead and rewind a finished track
    pub fn tick(&mut self, player: &mut DeckPlayer) {
        if let Some(position) = player.position_relative() {
            self.waveform.set_position_relative(position);
        }

        if player.is_finished() {
            log::debug!("Deck {}: track finished, rewinding", self.id.display_number());
            let _ = player.set_position_relative(0.0);
            self.waveform.set_position_relative(0.0);
        }

        self.refresh(player);
    }

    /// Hand an already decoded track to the player and the waveform
    pub fn play_decoded(
        &mut self,
        track: DecodedTrack,
        player: &mut DeckPlayer,
        cache: &mut ThumbnailCache,
    ) {
        let source = track.source().clone();
        player.load_track(track);
        self.track_loaded(source, player, cache);
    }

    /// Report a load that never reached the player
    pub fn load_failed(&mut self, source: &TrackSource, error: &dyn std::fmt::Display) {
        self.notice = Some(format!("Could not load {}: {}", source.display_name(), error));
    }

    /// Report a drop or URL that was rejected before loading
    pub fn reject_input(&mut self, reason: &dyn std::fmt::Display) {
        self.notice = Some(reason.to_string());
    }

    /// Forward a finished thumbnail to the waveform
    pub fn thumbnail_ready(&mut self, result: &ThumbnailResult) -> bool {
        self.waveform.thumbnail_ready(result)
    }

    fn track_loaded(&mut self, source: TrackSource, player: &DeckPlayer, cache: &mut ThumbnailCache) {
        self.url_input = source.to_string();
        self.notice = None;
        self.waveform.load_url(source, cache);
        self.refresh(player);
    }

    /// Re-read button state from the player
    fn refresh(&mut self, player: &DeckPlayer) {
        self.transport = transport_button(player.is_loaded(), player.is_playing());
        if player.is_loaded() {
            self.looping = player.is_looping();
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn speed_percent(&self) -> f32 {
        self.speed_percent
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn transport(&self) -> TransportButton {
        self.transport
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn waveform(&self) -> &WaveformState {
        &self.waveform
    }

    /// Build the deck view
    pub fn view(&self) -> Element<'_, DeckMessage> {
        let enabled = self.transport.is_enabled();

        let play_stop = button(text(self.transport.label()).size(14))
            .on_press_maybe(enabled.then_some(DeckMessage::PlayStop))
            .padding(8)
            .width(Length::Fixed(70.0));

        let volume = slider(0.0..=1.0, self.volume, DeckMessage::SetVolume).step(0.01);

        let (speed_min, speed_max) = self.speed_range;
        let speed = slider(speed_min..=speed_max, self.speed_percent, DeckMessage::SetSpeed).step(1.0);

        let mut loop_toggle = toggler(self.looping).label("Loop").size(16.0);
        if enabled {
            loop_toggle = loop_toggle.on_toggle(DeckMessage::ToggleLoop);
        }

        let controls = row![
            play_stop,
            text("Volume:").size(12),
            volume,
            text("Speed:").size(12),
            text(format!("{:>3.0}%", self.speed_percent))
                .size(12)
                .width(Length::Fixed(40.0)),
            speed,
            loop_toggle,
        ]
        .spacing(10)
        .align_y(Center)
        .height(Length::Fixed(CONTROL_ROW_HEIGHT));

        let url_row = row![
            text(format!("DECK {}", self.id.display_number())).size(14),
            text_input("Track URL or path...", &self.url_input)
                .on_input(DeckMessage::UrlChanged)
                .on_submit(DeckMessage::LoadUrl)
                .size(12),
            button(text("Load").size(12))
                .on_press(DeckMessage::LoadUrl)
                .padding(6),
        ]
        .spacing(10)
        .align_y(Center);

        let notice: Element<'_, DeckMessage> = match &self.notice {
            Some(notice) => text(notice.as_str()).size(11).into(),
            None => Space::new().height(Length::Fixed(0.0)).into(),
        };

        let content = column![
            url_row,
            notice,
            controls,
            waveform_display(&self.waveform, DeckMessage::Seek),
        ]
        .spacing(5)
        .padding(10);

        container(content).width(Fill).height(Fill).into()
    }
}

/// Speed slider percent to player ratio
fn percent_to_ratio(percent: f32) -> f64 {
    percent as f64 / 100.0
}
