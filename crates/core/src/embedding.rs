//! Embedding data model: unit vectors, batch requests, and validation
//!
//! Validation here is shared between the cache-facing `GenerateEmbedding`
//! path and `GenerateBatch` so that both reject the same inputs the same
//! way (the "validation symmetry" property in spec.md §8).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hard cap on the number of texts accepted in a single batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// A fixed-dimensional unit-length vector with provenance metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub provider: String,
    pub model: String,
    /// Hex-encoded SHA-256 of the source text
    pub hash: String,
    pub dimension: usize,
}

impl Embedding {
    pub fn new(vector: Vec<f32>, provider: impl Into<String>, model: impl Into<String>, hash: impl Into<String>) -> Self {
        let dimension = vector.len();
        Self {
            vector,
            provider: provider.into(),
            model: model.into(),
            hash: hash.into(),
            dimension,
        }
    }
}

/// Request to embed a single piece of text
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingRequest {
    pub text: String,
    pub model: Option<String>,
}

/// Request to embed a batch of texts in one call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchEmbeddingRequest {
    pub texts: Vec<String>,
    pub model: Option<String>,
}

/// Validate a single embedding request: text must be non-empty
pub fn validate_request(req: &EmbeddingRequest) -> Result<()> {
    if req.text.is_empty() {
        return Err(Error::invalid_input("text must not be empty"));
    }
    Ok(())
}

/// Validate a batch embedding request: non-empty, no empty elements, bounded size
///
/// Distinct error messages for each rejection reason so callers (and tests)
/// can tell empty-batch, contains-empty, and too-large apart.
pub fn validate_batch_request(req: &BatchEmbeddingRequest) -> Result<()> {
    if req.texts.is_empty() {
        return Err(Error::invalid_input("batch must contain at least one text"));
    }
    if req.texts.iter().any(|t| t.is_empty()) {
        return Err(Error::invalid_input("batch must not contain empty text"));
    }
    if req.texts.len() > MAX_BATCH_SIZE {
        return Err(Error::invalid_input(format!(
            "batch size {} exceeds maximum {MAX_BATCH_SIZE}",
            req.texts.len()
        )));
    }
    Ok(())
}

/// L2-normalize a vector in place semantics: returns a new unit vector,
/// or the input unchanged if it is the zero vector.
pub fn normalize_vector(v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return v;
    }
    v.into_iter().map(|x| x / norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_rejected() {
        let req = EmbeddingRequest { text: String::new(), model: None };
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn empty_batch_rejected() {
        let req = BatchEmbeddingRequest { texts: vec![], model: None };
        assert!(validate_batch_request(&req).is_err());
    }

    #[test]
    fn batch_with_empty_element_rejected() {
        let req = BatchEmbeddingRequest {
            texts: vec!["ok".to_string(), String::new()],
            model: None,
        };
        assert!(validate_batch_request(&req).is_err());
    }

    #[test]
    fn oversized_batch_rejected() {
        let req = BatchEmbeddingRequest {
            texts: vec!["x".to_string(); MAX_BATCH_SIZE + 1],
            model: None,
        };
        assert!(validate_batch_request(&req).is_err());
    }

    #[test]
    fn exactly_max_batch_accepted() {
        let req = BatchEmbeddingRequest {
            texts: vec!["x".to_string(); MAX_BATCH_SIZE],
            model: None,
        };
        assert!(validate_batch_request(&req).is_ok());
    }

    #[test]
    fn normalize_produces_unit_vector() {
        let v = normalize_vector(vec![3.0, 4.0]);
        let norm = (v[0] * v[0] + v[1] * v[1]).sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector_unchanged() {
        let v = normalize_vector(vec![0.0, 0.0, 0.0]);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }
}
