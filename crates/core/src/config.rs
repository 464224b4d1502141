//! Configuration for the gocontext system
//!
//! Loaded from an optional TOML file plus `GOCONTEXT_`-prefixed environment
//! overrides (double underscore separates nested keys, e.g.
//! `GOCONTEXT_CACHE__EMBEDDING_CAPACITY=20000`).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_embedding_capacity() -> usize {
    10_000
}

fn default_query_cache_capacity() -> usize {
    1_000
}

fn default_retry_attempts() -> usize {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    5_000
}

fn default_retry_multiplier() -> f64 {
    2.0
}

/// Cache sizing, shared by the embedding cache and the query-result cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_embedding_capacity")]
    pub embedding_capacity: usize,
    #[serde(default = "default_query_cache_capacity")]
    pub query_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            embedding_capacity: default_embedding_capacity(),
            query_capacity: default_query_cache_capacity(),
        }
    }
}

/// Retry executor parameters (spec.md §4.1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_retry_multiplier")]
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_attempts(),
            base_delay_ms: default_retry_base_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
            multiplier: default_retry_multiplier(),
        }
    }
}

/// Explicit embedding-provider configuration; see `gocontext_embeddings::factory`
/// for the environment-driven fallback when this is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_capacity")]
    pub cache_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            cache_size: default_embedding_capacity(),
        }
    }
}

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Directory gocontext persists per-project index files under
pub fn indices_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| Error::config("unable to determine home directory"))?;
    Ok(home.join(".gocontext").join("indices"))
}

impl Config {
    /// Load configuration from a TOML string (used by tests and inline config)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("failed to parse TOML: {e}")))
    }

    /// Load configuration from a file with `GOCONTEXT_`-prefixed env overrides.
    ///
    /// A missing file is not an error: hardcoded defaults plus environment
    /// overrides are used instead.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = config::Config::builder();
        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("GOCONTEXT")
                .separator("__")
                .try_parsing(true),
        );
        let built = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build config: {e}")))?;
        built
            .try_deserialize()
            .map_err(|e| Error::config(format!("failed to deserialize config: {e}")))
    }

    /// Load from an explicit path, or `~/.gocontext/config.toml` if `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let home = dirs::home_dir()
                    .ok_or_else(|| Error::config("unable to determine home directory"))?;
                Self::from_file(&home.join(".gocontext").join("config.toml"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.cache.embedding_capacity, 10_000);
        assert_eq!(cfg.cache.query_capacity, 1_000);
        assert_eq!(cfg.retry.max_attempts, 3);
    }

    #[test]
    fn from_toml_str_overrides_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [cache]
            embedding_capacity = 500

            [embedding]
            provider = "local"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cache.embedding_capacity, 500);
        assert_eq!(cfg.embedding.provider.as_deref(), Some("local"));
    }
}
