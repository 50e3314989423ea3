use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback when `redis_url` names an unset environment variable.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "tavsiyece.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration stored in `tavsiyece.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TavsiyeceConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub feed: FeedSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            prefix: default_prefix(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

fn default_prefix() -> String {
    "tavsiyece".to_string()
}

/// Fan-out and result caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Most ids a single "match any of" query may carry.
    #[serde(default = "default_batch_lookup")]
    pub batch_lookup: usize,
    #[serde(default = "default_feed_per_chunk")]
    pub feed_per_chunk: usize,
    #[serde(default = "default_following_scan")]
    pub following_scan: usize,
    #[serde(default = "default_search_results")]
    pub search_results: usize,
    #[serde(default = "default_search_candidates")]
    pub search_candidates: usize,
    #[serde(default = "default_follow_list")]
    pub follow_list: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            batch_lookup: default_batch_lookup(),
            feed_per_chunk: default_feed_per_chunk(),
            following_scan: default_following_scan(),
            search_results: default_search_results(),
            search_candidates: default_search_candidates(),
            follow_list: default_follow_list(),
        }
    }
}

fn default_batch_lookup() -> usize {
    10
}

fn default_feed_per_chunk() -> usize {
    20
}

fn default_following_scan() -> usize {
    1000
}

fn default_search_results() -> usize {
    10
}

fn default_search_candidates() -> usize {
    50
}

fn default_follow_list() -> usize {
    5
}

/// How chunked feed results are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrdering {
    /// Chunk results concatenated in the order the chunks were issued.
    #[default]
    Arrival,
    /// All candidates sorted by `createdAt`, newest first.
    Chronological,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default)]
    pub ordering: FeedOrdering,
}

impl TavsiyeceConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config: TavsiyeceConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path: display, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.batch_lookup == 0 || self.limits.batch_lookup > crate::store::IN_FILTER_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "limits.batch_lookup must be between 1 and {}",
                crate::store::IN_FILTER_LIMIT
            )));
        }
        if self.store.prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("store.prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// Redis URL with a `${VAR}` reference expanded from the environment.
    pub fn redis_url(&self) -> String {
        let url = self.store.redis_url.as_str();
        if let Some(var_name) = url.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            match std::env::var(var_name) {
                Ok(value) if !value.is_empty() => value,
                _ => {
                    log::debug!("{var_name} not set, falling back to {DEFAULT_REDIS_URL}");
                    DEFAULT_REDIS_URL.to_string()
                }
            }
        } else {
            url.to_string()
        }
    }
}
