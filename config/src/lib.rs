//! Configuration for randex.
//!
//! Read from `~/.randex/config.toml` unless a path is given explicitly.
//! Every field is optional; accessors resolve defaults in one place.
//!
//! ```toml
//! [api]
//! base_url = "https://pokeapi.co/api/v2"
//! resource = "pokemon"
//! user_agent = "randex/0.1"
//! listing_timeout_ms = 10000
//!
//! [fetch]
//! timeout_ms = 10000
//! concurrency = 4
//! display_pointer = "/sprites/front_default"
//! sample_size = 10
//! ```
//!
//! String values may reference environment variables as `${NAME}`.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_RESOURCE: &str = "pokemon";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LISTING_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DISPLAY_POINTER: &str = "/sprites/front_default";
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct RandexConfig {
    pub api: Option<ApiConfig>,
    pub fetch: Option<FetchConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Upstream API location.
#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    /// Collection under `base_url` to sample from.
    pub resource: Option<String>,
    pub user_agent: Option<String>,
    pub listing_timeout_ms: Option<u64>,
}

/// Detail-fetch batch settings.
#[derive(Debug, Default, Deserialize)]
pub struct FetchConfig {
    /// Per-item timeout. Default: 10000.
    pub timeout_ms: Option<u64>,
    /// In-flight request cap. Absent or 0 means unbounded.
    pub concurrency: Option<usize>,
    /// JSON pointer to the display attribute of a record.
    pub display_pointer: Option<String>,
    /// Number of items to sample per load. Default: 10.
    pub sample_size: Option<usize>,
}

impl RandexConfig {
    /// Load from the default location. `Ok(None)` when no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from `path`. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        self.api
            .as_ref()
            .and_then(|api| non_blank(api.base_url.as_deref()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    #[must_use]
    pub fn resource(&self) -> String {
        self.api
            .as_ref()
            .and_then(|api| non_blank(api.resource.as_deref()))
            .unwrap_or_else(|| DEFAULT_RESOURCE.to_string())
    }

    /// Configured user agent, if any. The HTTP layer owns the default.
    #[must_use]
    pub fn user_agent(&self) -> Option<String> {
        self.api
            .as_ref()
            .and_then(|api| non_blank(api.user_agent.as_deref()))
    }

    #[must_use]
    pub fn listing_timeout(&self) -> Duration {
        let ms = self
            .api
            .as_ref()
            .and_then(|api| api.listing_timeout_ms)
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_LISTING_TIMEOUT_MS);
        Duration::from_millis(ms)
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.fetch
            .as_ref()
            .and_then(|fetch| fetch.timeout_ms)
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// In-flight cap; 0 means unbounded.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.fetch
            .as_ref()
            .and_then(|fetch| fetch.concurrency)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn display_pointer(&self) -> String {
        self.fetch
            .as_ref()
            .and_then(|fetch| fetch.display_pointer.as_deref())
            .map(expand_env_vars)
            .unwrap_or_else(|| DEFAULT_DISPLAY_POINTER.to_string())
    }

    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.fetch
            .as_ref()
            .and_then(|fetch| fetch.sample_size)
            .unwrap_or(DEFAULT_SAMPLE_SIZE)
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".randex").join("config.toml"))
}

/// Expand `${NAME}` references. Unset variables expand to the empty string;
/// an unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(expand_env_vars)
        .filter(|value| !value.trim().is_empty())
}
