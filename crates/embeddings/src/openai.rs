//! Remote embedding provider B: OpenAI-compatible embeddings API

use crate::cache::{cache_key, EmbeddingCache};
use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;
use crate::retry::retry_with_backoff;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use gocontext_core::config::RetryConfig;
use gocontext_core::embedding::{
    normalize_vector, validate_batch_request, validate_request, BatchEmbeddingRequest, Embedding,
    EmbeddingRequest,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/embeddings";
const OPENAI_MAX_BATCH_SIZE: usize = 100;
const OPENAI_DIMENSIONS: usize = 1536;
const OPENAI_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiDatum>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDatum {
    index: usize,
    embedding: Vec<f32>,
}

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    retry_cfg: RetryConfig,
    cache: Arc<EmbeddingCache>,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, retry_cfg: RetryConfig, cache_capacity: usize) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            retry_cfg,
            cache: Arc::new(EmbeddingCache::new(cache_capacity)),
        })
    }

    async fn call_once(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = OpenAiRequest {
            model: OPENAI_MODEL,
            input: batch,
        };
        let resp = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        match resp.status().as_u16() {
            401 | 403 => return Err(EmbeddingError::InvalidApiKey("openai".to_string())),
            429 => return Err(EmbeddingError::RateLimited),
            s if s >= 500 => {
                return Err(EmbeddingError::Provider(format!("openai returned status {s}")))
            }
            _ => {}
        }
        let resp = resp.error_for_status()?;
        let body: OpenAiResponse = resp.json().await?;
        let mut out = vec![Vec::new(); batch.len()];
        for datum in body.data {
            if let Some(slot) = out.get_mut(datum.index) {
                *slot = datum.embedding;
            }
        }
        Ok(out)
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let cancel = CancellationToken::new();
        retry_with_backoff(&self.retry_cfg, &cancel, || Box::pin(self.call_once(chunk))).await
    }

    async fn fetch_missing(&self, to_fetch: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let futures: Vec<_> = to_fetch
            .chunks(OPENAI_MAX_BATCH_SIZE)
            .map(|chunk| {
                let chunk = chunk.to_vec();
                async move { self.embed_chunk(&chunk).await.map(|v| (chunk, v)) }
            })
            .collect();
        let results = stream::iter(futures).buffer_unordered(4).collect::<Vec<_>>().await;

        let mut fetched = Vec::with_capacity(to_fetch.len());
        for result in results {
            let (chunk, vectors) = result?;
            for (text, vector) in chunk.iter().zip(vectors) {
                let vector = normalize_vector(vector);
                let key = cache_key(text);
                let embedding = Embedding::new(vector, self.provider(), self.model(), key.clone());
                self.cache.put(key, embedding.clone());
                fetched.push(embedding);
            }
        }
        Ok(fetched)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn generate_embedding(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        validate_request(&EmbeddingRequest { text: text.to_string(), model: None })
            .map_err(|e| EmbeddingError::InvalidInput(e.to_string()))?;

        let key = cache_key(text);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let vectors = self.embed_chunk(&[text.to_string()]).await?;
        let vector = normalize_vector(vectors.into_iter().next().unwrap_or_default());
        let embedding = Embedding::new(vector, self.provider(), self.model(), key.clone());
        self.cache.put(key, embedding.clone());
        Ok(embedding)
    }

    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        validate_batch_request(&BatchEmbeddingRequest { texts: texts.to_vec(), model: None })
            .map_err(|e| EmbeddingError::InvalidInput(e.to_string()))?;

        let mut embeddings = vec![None; texts.len()];
        let mut to_fetch: Vec<String> = Vec::new();
        let mut fetch_indices: Vec<usize> = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let key = cache_key(text);
            if let Some(cached) = self.cache.get(&key) {
                embeddings[i] = Some(cached);
            } else {
                to_fetch.push(text.clone());
                fetch_indices.push(i);
            }
        }

        if !to_fetch.is_empty() {
            let fetched = self.fetch_missing(&to_fetch).await?;
            for (idx, embedding) in fetch_indices.into_iter().zip(fetched) {
                embeddings[idx] = Some(embedding);
            }
        }

        Ok(embeddings.into_iter().map(|e| e.expect("every index filled from cache or fetch")).collect())
    }

    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        OPENAI_MODEL
    }

    fn dimension(&self) -> usize {
        OPENAI_DIMENSIONS
    }
}
