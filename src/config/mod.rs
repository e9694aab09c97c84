//! Configuration module for storage-backup
//!
//! Settings are applied in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. Environment variables (a `.env` file is loaded into the environment first)
//!
//! ## Example Usage
//!
//! ```no_run
//! use storage_backup::config;
//!
//! let config = config::load_config(None)?;
//! config::validate_config(&config)?;
//! println!("Backing up bucket {}", config.source.bucket);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{
    apply_env_overrides, load_config, load_env_file, missing_values, validate_config, ConfigError,
    Result,
};
pub use types::*;

use std::path::{Path, PathBuf};

impl Config {
    /// Root directory under which each run creates its staging directory
    pub fn staging_root(&self) -> PathBuf {
        match self.global.staging_directory {
            Some(ref dir) => expand_tilde(dir),
            None => default_staging_root(),
        }
    }
}

/// `dist/` next to the running executable, or relative to the working directory
fn default_staging_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("dist")))
        .unwrap_or_else(|| PathBuf::from("dist"))
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
