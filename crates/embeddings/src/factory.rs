//! Embedding provider selection
//!
//! Precedence (spec.md §4.3): explicit config provider name, then
//! `GOCONTEXT_EMBEDDING_PROVIDER`, then presence of `JINA_API_KEY`, then
//! `OPENAI_API_KEY`, falling back to the local provider when nothing is
//! configured.

use crate::error::EmbeddingError;
use crate::jina::JinaProvider;
use crate::local::LocalProvider;
use crate::openai::OpenAiProvider;
use crate::provider::EmbeddingProvider;
use gocontext_core::config::Config;
use std::env;
use std::sync::Arc;

pub fn build_provider(cfg: &Config) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let retry_cfg = cfg.retry.clone();
    let name = resolve_provider_name(cfg);

    match name.as_str() {
        "jina" => {
            let key = cfg
                .embedding
                .api_key
                .clone()
                .or_else(|| env::var("JINA_API_KEY").ok())
                .ok_or_else(|| EmbeddingError::InvalidApiKey("jina".to_string()))?;
            Ok(Arc::new(JinaProvider::new(key, retry_cfg, cfg.embedding.cache_size)?))
        }
        "openai" => {
            let key = cfg
                .embedding
                .api_key
                .clone()
                .or_else(|| env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| EmbeddingError::InvalidApiKey("openai".to_string()))?;
            Ok(Arc::new(OpenAiProvider::new(key, retry_cfg, cfg.embedding.cache_size)?))
        }
        "local" => Ok(Arc::new(LocalProvider::new())),
        other => Err(EmbeddingError::UnknownProvider(other.to_string())),
    }
}

fn resolve_provider_name(cfg: &Config) -> String {
    if let Some(p) = &cfg.embedding.provider {
        return p.to_lowercase();
    }
    if let Ok(p) = env::var("GOCONTEXT_EMBEDDING_PROVIDER") {
        return p.to_lowercase();
    }
    if env::var("JINA_API_KEY").is_ok() {
        return "jina".to_string();
    }
    if env::var("OPENAI_API_KEY").is_ok() {
        return "openai".to_string();
    }
    "local".to_string()
}
