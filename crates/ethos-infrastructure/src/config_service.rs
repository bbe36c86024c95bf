//! Loads and stores `PracticeConfig`.
//!
//! Priority: environment variables > `config.toml` > built-in defaults.

use crate::paths::EthosPaths;
use crate::storage::AtomicTomlFile;
use ethos_core::Result;
use ethos_core::config::PracticeConfig;
use std::path::{Path, PathBuf};

pub const ENV_SERVICE_URL: &str = "ETHOS_SERVICE_URL";
pub const ENV_PERSISTENCE_URL: &str = "ETHOS_PERSISTENCE_URL";
pub const ENV_AUTH_TOKEN: &str = "ETHOS_AUTH_TOKEN";
pub const ENV_USER_ID: &str = "ETHOS_USER_ID";

/// File-backed configuration access.
pub struct ConfigService {
    file: AtomicTomlFile<PracticeConfig>,
}

impl ConfigService {
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Uses `~/.config/ethos/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(EthosPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the file, applies environment overrides, and validates.
    pub fn load(&self) -> Result<PracticeConfig> {
        let config = self.load_effective()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file and applies environment overrides without validating.
    pub fn load_effective(&self) -> Result<PracticeConfig> {
        let mut config = self.load_file()?;
        apply_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads the file contents only, falling back to defaults.
    pub fn load_file(&self) -> Result<PracticeConfig> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    pub fn save(&self, config: &PracticeConfig) -> Result<()> {
        config.validate()?;
        self.file.save(config)?;
        tracing::info!(path = %self.path().display(), "saved configuration");
        Ok(())
    }

    /// Writes the defaults if no config file exists yet.
    ///
    /// Returns true if a file was created.
    pub fn init(&self) -> Result<bool> {
        if self.file.load()?.is_some() {
            return Ok(false);
        }
        self.save(&PracticeConfig::default())?;
        Ok(true)
    }
}

/// Applies `ETHOS_*` overrides read through `lookup`.
pub fn apply_overrides<F>(config: &mut PracticeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = lookup(ENV_SERVICE_URL) {
        config.service_base_url = url;
    }
    if let Some(url) = lookup(ENV_PERSISTENCE_URL) {
        config.persistence_base_url = Some(url);
    }
    if let Some(token) = lookup(ENV_AUTH_TOKEN) {
        config.auth_token = Some(token);
    }
    if let Some(user_id) = lookup(ENV_USER_ID) {
        config.user_id = user_id;
    }
}
