//! Player configuration for otodecks
//!
//! Configuration is stored as YAML in the user's config directory.
//! Default location: ~/.config/otodecks/config.yaml

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use otodecks_core::audio::AudioConfig;
use otodecks_core::config::{default_config_path, load_config};
use otodecks_core::engine::MAX_SPEED_RATIO;
use otodecks_widgets::{DEFAULT_CACHE_CAPACITY, DEFAULT_THUMBNAIL_COLUMNS};

/// Config file name inside the otodecks config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Output device, sample rate and buffer size
    pub audio: AudioConfig,
    /// Per-deck control defaults
    pub deck: DeckConfig,
    /// Window and waveform settings
    pub display: DisplayConfig,
}

/// Deck control section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Volume slider position on startup (0.0-1.0)
    pub default_volume: f32,
    /// Speed slider position on startup, in percent
    pub default_speed_percent: f32,
    /// Speed slider range, in percent
    pub speed_percent_min: f32,
    pub speed_percent_max: f32,
    /// How often the decks poll their player for position and end of track
    pub poll_interval_ms: u64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            default_volume: 0.8,
            default_speed_percent: 100.0,
            speed_percent_min: 1.0,
            speed_percent_max: 200.0,
            poll_interval_ms: 500,
        }
    }
}

/// Display configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Waveform resolution (columns per thumbnail)
    pub thumbnail_columns: usize,
    /// Thumbnails kept in memory across both decks
    pub thumbnail_cache_capacity: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 800.0,
            window_height: 600.0,
            thumbnail_columns: DEFAULT_THUMBNAIL_COLUMNS,
            thumbnail_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl PlayerConfig {
    /// Pull hand-edited values back into ranges the UI can work with
    ///
    /// The speed slider may never reach past what the player accepts
    /// (`MAX_SPEED_RATIO` as a ratio, so x100 in percent).
    pub fn sanitize(&mut self) {
        let deck = &mut self.deck;
        let max_percent = (MAX_SPEED_RATIO * 100.0) as f32;

        if !deck.default_volume.is_finite() {
            deck.default_volume = DeckConfig::default().default_volume;
        }
        deck.default_volume = deck.default_volume.clamp(0.0, 1.0);

        if !deck.speed_percent_min.is_finite() || deck.speed_percent_min < 1.0 {
            deck.speed_percent_min = 1.0;
        }
        if !deck.speed_percent_max.is_finite() {
            deck.speed_percent_max = DeckConfig::default().speed_percent_max;
        } else if deck.speed_percent_max > max_percent {
            log::warn!(
                "Speed slider maximum {}% exceeds {}%, clamping",
                deck.speed_percent_max,
                max_percent
            );
            deck.speed_percent_max = max_percent;
        }
        if deck.speed_percent_min > deck.speed_percent_max {
            std::mem::swap(&mut deck.speed_percent_min, &mut deck.speed_percent_max);
        }
        if !deck.default_speed_percent.is_finite() {
            deck.default_speed_percent = DeckConfig::default().default_speed_percent;
        }
        deck.default_speed_percent = deck
            .default_speed_percent
            .clamp(deck.speed_percent_min, deck.speed_percent_max);

        deck.poll_interval_ms = deck.poll_interval_ms.max(10);

        let display = &mut self.display;
        display.thumbnail_columns = display.thumbnail_columns.max(1);
        display.thumbnail_cache_capacity = display.thumbnail_cache_capacity.max(1);
        display.window_width = display.window_width.max(320.0);
        display.window_height = display.window_height.max(240.0);
    }
}

/// Get the default config file path
pub fn config_path() -> PathBuf {
    default_config_path(CONFIG_FILE_NAME)
}

/// Load and sanitize the player config (defaults when missing or invalid)
pub fn load_player_config(path: &Path) -> PlayerConfig {
    let mut config: PlayerConfig = load_config(path);
    config.sanitize();
    log::info!(
        "Deck defaults: volume {:.2}, speed {}% ({}..{}%), poll every {}ms",
        config.deck.default_volume,
        config.deck.default_speed_percent,
        config.deck.speed_percent_min,
        config.deck.speed_percent_max,
        config.deck.poll_interval_ms
    );
    config
}
