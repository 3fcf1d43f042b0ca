//! Main iced application for the Otodecks player
//!
//! Owns the shared engine handle, one `DeckGui` per deck and the thumbnail
//! cache both waveforms draw from. Every message that touches a player takes
//! the engine lock for the duration of that one call; decoding a new track
//! happens before the lock is taken so the audio callback keeps running.

use std::sync::{MutexGuard, PoisonError};
use std::time::Duration;

use iced::widget::{column, container, rule, text};
use iced::{event, mouse, time, window, Element, Event, Fill, Point, Size, Subscription, Task, Theme};

use otodecks_core::audio::SharedEngine;
use otodecks_core::audio_file::DecodedTrack;
use otodecks_core::engine::AudioEngine;
use otodecks_widgets::{mpsc_subscription, ThumbnailCache};

use super::deck_gui::DeckGui;
use super::drop::{deck_at, DropBatch, DropPayload, DROP_BATCH_WINDOW};
use super::message::Message;
use crate::config::PlayerConfig;

/// Application state
pub struct OtodecksApp {
    /// Shared with the audio callback
    engine: SharedEngine,
    /// Engine output rate, fixed for the life of the stream
    sample_rate: u32,
    decks: Vec<DeckGui>,
    thumbnails: ThumbnailCache,
    poll_interval: Duration,
    drop_batch: DropBatch,
    /// Last known cursor position, used to pick the deck for a file drop
    cursor: Option<Point>,
    window_size: Size,
    /// Output device summary for the status line
    audio_status: String,
}

/// Lock the engine, recovering it if a previous holder panicked
fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, AudioEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OtodecksApp {
    /// Create the app and apply the deck defaults to every player
    pub fn new(engine: SharedEngine, config: &PlayerConfig, audio_status: String) -> Self {
        let (sample_rate, decks) = {
            let mut guard = lock_engine(&engine);
            let decks = guard
                .decks_mut()
                .map(|player| DeckGui::new(&config.deck, player))
                .collect();
            (guard.sample_rate(), decks)
        };

        Self {
            engine,
            sample_rate,
            decks,
            thumbnails: ThumbnailCache::new(
                config.display.thumbnail_cache_capacity,
                config.display.thumbnail_columns,
            ),
            poll_interval: Duration::from_millis(config.deck.poll_interval_ms),
            drop_batch: DropBatch::default(),
            cursor: None,
            window_size: Size::new(config.display.window_width, config.display.window_height),
            audio_status,
        }
    }

    /// Update application state
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                let mut engine = lock_engine(&self.engine);
                for (i, deck) in self.decks.iter_mut().enumerate() {
                    if let Some(player) = engine.deck_mut(i) {
                        deck.tick(player);
                    }
                }
                Task::none()
            }

            Message::Deck(deck_idx, deck_msg) => {
                let request = {
                    let mut engine = lock_engine(&self.engine);
                    match (self.decks.get_mut(deck_idx), engine.deck_mut(deck_idx)) {
                        (Some(deck), Some(player)) => deck.handle_message(deck_msg, player),
                        _ => None,
                    }
                };

                match request {
                    Some(payload) => self.update(Message::LoadTrack(deck_idx, payload)),
                    None => Task::none(),
                }
            }

            Message::ThumbnailReady(result) => {
                self.thumbnails.complete(&result);
                for deck in self.decks.iter_mut() {
                    deck.thumbnail_ready(&result);
                }
                Task::none()
            }

            Message::LoadTrack(deck_idx, payload) => {
                self.load_into_deck(deck_idx, payload);
                Task::none()
            }

            Message::FileDropped(path) => {
                let deck = deck_at(self.cursor.map(|p| p.y), self.window_size.height);
                log::debug!("File dropped on deck {}: {:?}", deck + 1, path);
                if self.drop_batch.push(deck, path) {
                    return Task::perform(
                        async { tokio::time::sleep(DROP_BATCH_WINDOW).await },
                        |_| Message::FlushDrop,
                    );
                }
                Task::none()
            }

            Message::FlushDrop => {
                if let Some((deck_idx, payload)) = self.drop_batch.flush() {
                    self.load_into_deck(deck_idx, payload);
                }
                Task::none()
            }

            Message::CursorMoved(position) => {
                self.cursor = Some(position);
                Task::none()
            }

            Message::WindowResized(size) => {
                self.window_size = size;
                Task::none()
            }
        }
    }

    /// Validate a payload, decode it and hand it to the deck
    ///
    /// Rejected payloads and failed decodes leave the deck as it was.
    fn load_into_deck(&mut self, deck_idx: usize, payload: DropPayload) {
        let Some(deck) = self.decks.get_mut(deck_idx) else {
            log::warn!("Load request for unknown deck {}", deck_idx);
            return;
        };

        let source = match payload.into_source() {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Deck {}: {}", deck_idx + 1, e);
                deck.reject_input(&e);
                return;
            }
        };

        log::info!("Deck {}: loading {}", deck_idx + 1, source);
        match DecodedTrack::open(&source, self.sample_rate) {
            Ok(track) => {
                let mut engine = lock_engine(&self.engine);
                if let Some(player) = engine.deck_mut(deck_idx) {
                    deck.play_decoded(track, player, &mut self.thumbnails);
                }
            }
            Err(e) => {
                log::warn!("Deck {}: failed to load {}: {}", deck_idx + 1, source, e);
                deck.load_failed(&source, &e);
            }
        }
    }

    /// Build the view
    pub fn view(&self) -> Element<'_, Message> {
        let decks = self.decks.iter().enumerate().fold(column![], |col, (i, deck)| {
            let col = if i > 0 { col.push(rule::horizontal(1)) } else { col };
            col.push(deck.view().map(move |msg| Message::Deck(i, msg)))
        });

        let status = text(&self.audio_status).size(11);

        container(column![decks.height(Fill), status].spacing(4).padding(4))
            .width(Fill)
            .height(Fill)
            .into()
    }

    /// Subscribe to the poll timer, finished thumbnails and window events
    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            time::every(self.poll_interval).map(|_| Message::Tick),
            mpsc_subscription(self.thumbnails.result_receiver()).map(Message::ThumbnailReady),
            event::listen_with(window_event),
        ])
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Window events the app reacts to
fn window_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
        Event::Mouse(mouse::Event::CursorMoved { position }) => Some(Message::CursorMoved(position)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use otodecks_core::TrackSource;

    use crate::ui::deck_gui::{DeckMessage, TransportButton};

    const RATE: u32 = 8000;

    fn app() -> OtodecksApp {
        let engine = Arc::new(Mutex::new(AudioEngine::new(RATE)));
        OtodecksApp::new(engine, &PlayerConfig::default(), "test".to_string())
    }

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..RATE {
            writer.write_sample(4000i16).unwrap();
            writer.write_sample(-4000i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn is_loaded(app: &OtodecksApp, deck: usize) -> bool {
        lock_engine(&app.engine).deck(deck).unwrap().is_loaded()
    }

    #[test]
    fn test_new_applies_defaults_to_both_players() {
        let app = app();
        let engine = lock_engine(&app.engine);
        for i in 0..2 {
            assert_eq!(engine.deck(i).unwrap().gain(), 0.8);
            assert_eq!(engine.deck(i).unwrap().speed(), 1.0);
        }
        assert_eq!(app.decks.len(), 2);
    }

    #[test]
    fn test_load_track_into_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.wav");
        write_wav(&path);

        let mut app = app();
        let _ = app.update(Message::LoadTrack(1, DropPayload::Files(vec![path.clone()])));

        assert!(is_loaded(&app, 1));
        assert!(!is_loaded(&app, 0));
        assert_eq!(app.decks[1].transport(), TransportButton::Stop);
        assert_eq!(
            app.decks[1].waveform().source(),
            Some(&TrackSource::Path(path))
        );
    }

    #[test]
    fn test_url_box_loads_through_deck_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.wav");
        write_wav(&path);

        let mut app = app();
        let url = path.to_string_lossy().into_owned();
        let _ = app.update(Message::Deck(0, DeckMessage::UrlChanged(url)));
        let _ = app.update(Message::Deck(0, DeckMessage::LoadUrl));

        assert!(is_loaded(&app, 0));
    }

    #[test]
    fn test_multi_file_drop_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_wav(&a);
        write_wav(&b);

        let mut app = app();
        let _ = app.update(Message::FileDropped(a));
        let _ = app.update(Message::FileDropped(b));
        let _ = app.update(Message::FlushDrop);

        assert!(!is_loaded(&app, 0));
        assert!(app.decks[0].notice().is_some());
    }

    #[test]
    fn test_single_drop_targets_deck_under_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drop.wav");
        write_wav(&path);

        let mut app = app();
        let _ = app.update(Message::WindowResized(Size::new(800.0, 600.0)));
        let _ = app.update(Message::CursorMoved(Point::new(100.0, 450.0)));
        let _ = app.update(Message::FileDropped(path));
        let _ = app.update(Message::FlushDrop);

        assert!(is_loaded(&app, 1));
        assert!(!is_loaded(&app, 0));
    }

    #[test]
    fn test_failed_load_keeps_deck_empty() {
        let mut app = app();
        let missing = std::env::temp_dir().join("otodecks-absent-app.wav");
        let _ = app.update(Message::LoadTrack(0, DropPayload::Files(vec![missing])));

        assert!(!is_loaded(&app, 0));
        assert_eq!(app.decks[0].transport(), TransportButton::Disabled);
        assert!(app.decks[0].notice().is_some());
    }

    #[test]
    fn test_tick_updates_playhead() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tick.wav");
        write_wav(&path);

        let mut app = app();
        let _ = app.update(Message::LoadTrack(0, DropPayload::Files(vec![path])));
        lock_engine(&app.engine).deck_mut(0).unwrap().set_position(0.5);

        let _ = app.update(Message::Tick);
        assert!((app.decks[0].waveform().position() - 0.5).abs() < 1e-3);
    }
}
