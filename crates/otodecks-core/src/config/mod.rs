//! YAML configuration I/O shared by the Otodecks apps
//!
//! ```ignore
//! use otodecks_core::config::{default_config_path, load_config, save_config};
//!
//! let path = default_config_path("config.yaml");
//! let config: MyConfig = load_config(&path);
//! save_config(&config, &path)?;
//! ```

mod io;
mod paths;

pub use io::{load_config, save_config};
pub use paths::{config_dir, default_config_path, APP_DIR_NAME};
