use futures::stream::{self, StreamExt};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Runtime;

use super::keywords::is_stop_word;
use crate::ingest::patterns::tokenize;

/// Environment variable holding the bearer token for the HTTP embedder
pub const EMBEDDING_API_KEY_ENV: &str = "EMBEDDING_API_KEY";

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("embedding service returned status {0}")]
    Status(u16),

    #[error("embedding response has {got} vectors for {expected} inputs")]
    Count { expected: usize, got: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },

    #[error("failed to start embedding runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Text → vector capability used by the semantic clusterer
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed a batch; output order matches input order
    fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// FNV-1a, used for feature hashing
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Local deterministic embedder: hashed, sublinear term frequencies, L2-normalized
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for token in tokenize(text) {
            if is_stop_word(&token) {
                continue;
            }
            match counts.iter_mut().find(|(t, _)| *t == token) {
                Some((_, c)) => *c += 1,
                None => counts.push((token, 1)),
            }
        }

        let mut vector = vec![0.0f64; self.dim];
        for (token, count) in &counts {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dim as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign * (1.0 + (*count as f64).ln());
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector.into_iter().map(|v| v as f32).collect())
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
pub struct HttpEmbedder {
    runtime: Runtime,
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    concurrency: usize,
}

impl HttpEmbedder {
    pub fn new(url: &str, model: &str, concurrency: usize, timeout: Duration) -> Result<Self, EmbedError> {
        let runtime = Runtime::new()?;
        let client = Client::builder().timeout(timeout).build()?;
        let api_key = std::env::var(EMBEDDING_API_KEY_ENV).ok().filter(|k| !k.is_empty());

        Ok(Self {
            runtime,
            client,
            url: url.to_string(),
            model: model.to_string(),
            api_key,
            concurrency: concurrency.max(1),
        })
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let payload = serde_json::json!({
            "input": text,
            "model": self.model,
        });

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EmbedError::Status(response.status().as_u16()));
        }

        let body: EmbeddingResponse = response.json().await?;
        let got = body.data.len();
        body.data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .ok_or(EmbedError::Count { expected: 1, got })
    }
}

impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        "http"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.runtime.block_on(self.request(text))
    }

    fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        debug!("Embedding {} texts via {} ({})", texts.len(), self.url, self.model);

        let results: Vec<Result<Vec<f32>, EmbedError>> = self.runtime.block_on(
            stream::iter(texts.iter())
                .map(|text| self.request(text))
                .buffered(self.concurrency)
                .collect(),
        );

        let vectors: Vec<Vec<f32>> = results.into_iter().collect::<Result<_, _>>()?;
        if let Some(first) = vectors.first() {
            let expected = first.len();
            if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
                return Err(EmbedError::Dimension { expected, got: bad.len() });
            }
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed("Graph neural networks for citation graphs").unwrap();
        let b = embedder.embed("Graph neural networks for citation graphs").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_similar_texts_are_closer() {
        let embedder = HashingEmbedder::new(256);
        let graphs = embedder.embed("graph network centrality graph edges").unwrap();
        let graphs2 = embedder.embed("network centrality of graph edges").unwrap();
        let quarks = embedder.embed("quark gluon plasma collisions").unwrap();
        assert!(dot(&graphs, &graphs2) > dot(&graphs, &quarks));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        assert_eq!(embedder.embed("the of and").unwrap(), vec![0.0; 8]);
        let all = embedder.embed_all(&["a b".to_string(), "topology".to_string()]).unwrap();
        assert_eq!(all.len(), 2);
    }
}
