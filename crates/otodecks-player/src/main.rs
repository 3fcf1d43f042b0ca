//! Otodecks - two-deck DJ player
//!
//! Entry point for the GUI application. It:
//! 1. Loads the player config (~/.config/otodecks/config.yaml)
//! 2. Opens the cpal output stream around a shared audio engine
//! 3. Launches the iced GUI, preloading any tracks given on the command line
//!
//! ## Command line
//!
//! `otodecks [TRACK_1] [TRACK_2] [--write-config]`
//!
//! Tracks are file paths or http(s) URLs. `--write-config` saves the effective
//! configuration so it can be edited.

mod config;
mod ui;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use iced::{Size, Task};

use otodecks_core::audio::start_audio_system;
use otodecks_core::config::save_config;
use otodecks_core::engine::AudioEngine;
use otodecks_core::{DEFAULT_SAMPLE_RATE, NUM_DECKS};

use config::PlayerConfig;
use ui::drop::DropPayload;
use ui::{Message, OtodecksApp};

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    /// Track per deck, in deck order
    tracks: Vec<DropPayload>,
    write_config: bool,
}

/// Parse `[TRACK_1] [TRACK_2] [--write-config]`
///
/// URLs are passed through as typed; plain paths are made absolute against the
/// current directory. Tracks beyond the number of decks are ignored.
fn parse_args(args: impl IntoIterator<Item = String>, cwd: Option<PathBuf>) -> CliArgs {
    let mut cli = CliArgs::default();

    for arg in args {
        if arg == "--write-config" {
            cli.write_config = true;
            continue;
        }
        if arg.starts_with("--") {
            log::warn!("Ignoring unknown flag {}", arg);
            continue;
        }
        if cli.tracks.len() == NUM_DECKS {
            log::warn!("Only {} decks, ignoring {}", NUM_DECKS, arg);
            continue;
        }

        let payload = if arg.contains("://") {
            DropPayload::Track { file_url: arg }
        } else {
            let path = PathBuf::from(&arg);
            let path = match &cwd {
                Some(cwd) if path.is_relative() => cwd.join(path),
                _ => path,
            };
            DropPayload::Files(vec![path])
        };
        cli.tracks.push(payload);
    }

    cli
}

fn main() -> iced::Result {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("otodecks starting up");

    let cli = parse_args(std::env::args().skip(1), std::env::current_dir().ok());

    let config_path = config::config_path();
    let config: PlayerConfig = config::load_player_config(&config_path);

    if cli.write_config {
        match save_config(&config, &config_path) {
            Ok(()) => println!("Config written to {}", config_path.display()),
            Err(e) => eprintln!("Warning: could not write config: {:#}", e),
        }
    }

    // Without an output device the decks still work, they are just silent
    let (audio_handle, engine, audio_status) = match start_audio_system(&config.audio) {
        Ok(handle) => {
            let status = format!(
                "Output: {} ({} Hz, {} frames, {:.1} ms)",
                handle.device_name(),
                handle.sample_rate(),
                handle.buffer_size(),
                handle.latency_ms()
            );
            let engine = handle.engine();
            (Some(handle), engine, status)
        }
        Err(e) => {
            log::warn!("Could not start audio output: {}", e);
            log::warn!("Running in UI-only mode (no audio output)");
            let engine = Arc::new(Mutex::new(AudioEngine::new(DEFAULT_SAMPLE_RATE)));
            (None, engine, format!("No audio output ({})", e))
        }
    };

    let window_size = Size::new(config.display.window_width, config.display.window_height);

    // The boot closure must be Fn, so its one-time resources live in cells
    let engine_cell = RefCell::new(Some(engine));
    let tracks_cell = RefCell::new(cli.tracks);

    let result = iced::application(
        move || {
            let Some(engine) = engine_cell.borrow_mut().take() else {
                // Only reachable if iced boots twice; start with a silent engine
                log::error!("Audio engine already taken, starting without audio");
                let engine = Arc::new(Mutex::new(AudioEngine::new(DEFAULT_SAMPLE_RATE)));
                return (
                    OtodecksApp::new(engine, &config, "No audio output".to_string()),
                    Task::none(),
                );
            };

            let app = OtodecksApp::new(engine, &config, audio_status.clone());
            let preload = tracks_cell
                .borrow_mut()
                .drain(..)
                .enumerate()
                .map(|(deck, payload)| Task::done(Message::LoadTrack(deck, payload)))
                .collect::<Vec<_>>();

            (app, Task::batch(preload))
        },
        update,
        view,
    )
    .subscription(subscription)
    .theme(theme)
    .title("Otodecks")
    .window_size(window_size)
    .run();

    // Keep the output stream alive until the window closes
    drop(audio_handle);
    log::info!("otodecks stopped");

    result
}

/// Update function for iced
fn update(app: &mut OtodecksApp, message: Message) -> Task<Message> {
    app.update(message)
}

/// View function for iced
fn view(app: &OtodecksApp) -> iced::Element<'_, Message> {
    app.view()
}

/// Subscription function for iced
fn subscription(app: &OtodecksApp) -> iced::Subscription<Message> {
    app.subscription()
}

/// Theme function for iced
fn theme(app: &OtodecksApp) -> iced::Theme {
    app.theme()
}
