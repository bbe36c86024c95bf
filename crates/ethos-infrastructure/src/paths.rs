//! Path management for ETHOS configuration and cache files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/ethos/             # Config directory
//! └── config.toml              # PracticeConfig
//!
//! ~/.local/share/ethos/        # Data directory
//! └── pending_results.toml     # Results whose save failed (best-effort)
//! ```

use ethos_core::{EthosError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "ethos";

/// Resolves platform-specific ETHOS paths.
pub struct EthosPaths;

impl EthosPaths {
    /// Returns the ETHOS configuration directory (e.g. `~/.config/ethos/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| EthosError::config("Cannot determine config directory"))
    }

    /// Returns the ETHOS data directory (e.g. `~/.local/share/ethos/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| EthosError::config("Cannot determine data directory"))
    }

    /// Path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path to the pending-result cache.
    pub fn pending_results_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("pending_results.toml"))
    }
}
