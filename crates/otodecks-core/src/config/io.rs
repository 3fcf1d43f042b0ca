//! Generic YAML load/save

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Load a config file, falling back to `T::default()`
///
/// A missing file is normal on first start and logged at info; an unreadable
/// or malformed file is logged at warn. Either way the app keeps running.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No config at {:?}, using defaults", path);
            return T::default();
        }
        Err(e) => {
            log::warn!("Failed to read config {:?}: {}, using defaults", path, e);
            return T::default();
        }
    };

    match serde_yaml::from_str::<T>(&contents) {
        Ok(config) => {
            log::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("Invalid config {:?}: {}, using defaults", path, e);
            T::default()
        }
    }
}

/// Write a config file as YAML, creating parent directories
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write config {:?}", path))?;

    log::info!("Saved config to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct DeckSettings {
        volume: f32,
        label: String,
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config: DeckSettings = load_config(&dir.path().join("absent.yaml"));
        assert_eq!(config, DeckSettings::default());
    }

    #[test]
    fn test_malformed_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "volume: [not, a, number").unwrap();
        let config: DeckSettings = load_config(&path);
        assert_eq!(config, DeckSettings::default());
    }

    #[test]
    fn test_save_creates_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("otodecks").join("config.yaml");
        let config = DeckSettings {
            volume: 0.8,
            label: "left".to_string(),
        };

        save_config(&config, &path).unwrap();
        let loaded: DeckSettings = load_config(&path);
        assert_eq!(loaded, config);
    }
}
