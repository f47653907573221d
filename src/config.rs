use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DENSITY_LOOKUP_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "density_lookup.toml";

/// Settings owned by the presentation layers. None of them change lookup
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest source file accepted by the loader, in bytes.
    pub max_source_bytes: u64,
    /// Lifetime of an authenticated session.
    pub session_timeout_secs: u64,
    /// Enables the password gate when set.
    pub password: Option<String>,
    /// Rows shown in the data preview table.
    pub preview_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_source_bytes: 10 * 1024 * 1024,
            session_timeout_secs: 3600,
            password: None,
            preview_rows: 10,
        }
    }
}

impl Config {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Read a config file. Missing keys take their defaults.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load from `$DENSITY_LOOKUP_CONFIG`, else `density_lookup.toml` if present,
/// else defaults.
pub fn load_or_default() -> Result<Config, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return load_from(Path::new(&path));
    }
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        return load_from(path);
    }
    log::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
    Ok(Config::default())
}
