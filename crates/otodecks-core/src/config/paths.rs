//! Config file locations

use std::path::PathBuf;

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "otodecks";

/// Platform config directory for Otodecks
///
/// `~/.config/otodecks` on Linux, falling back to `./otodecks` when the
/// platform has no config dir.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Path of a config file inside [`config_dir`]
pub fn default_config_path(filename: &str) -> PathBuf {
    config_dir().join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_layout() {
        let path = default_config_path("config.yaml");
        assert!(path.ends_with("otodecks/config.yaml"));
    }
}
