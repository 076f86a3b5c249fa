use crate::error::EmbeddingError;
use crate::traits::Embedder;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT: usize = 384;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

/// Client for a hosted embedding service.
///
/// Sends a batch of strings, expects one vector per input in the same
/// order, each with the configured dimensionality.
pub struct HttpEmbedder {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            dimensions,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.client.post(&self.endpoint).json(&json!({
            "model": self.model,
            "input": texts,
        }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().to_string();
            let details = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Backend { status, details });
        }

        let parsed: Value = response.json().await?;
        let rows = parsed
            .pointer("/embeddings")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                EmbeddingError::Response("missing embeddings array".to_string())
            })?;

        if rows.len() != texts.len() {
            return Err(EmbeddingError::Response(format!(
                "expected {} vectors, got {}",
                texts.len(),
                rows.len()
            )));
        }

        let mut vectors = Vec::with_capacity(rows.len());
        for row in rows {
            let values = row.as_array().ok_or_else(|| {
                EmbeddingError::Response("embedding row is not an array".to_string())
            })?;

            if values.len() != self.dimensions {
                return Err(EmbeddingError::Response(format!(
                    "embedding dimension {} != {}",
                    values.len(),
                    self.dimensions
                )));
            }

            let vector = values
                .iter()
                .map(|value| value.as_f64().map(|float| float as f32))
                .collect::<Option<Vec<f32>>>()
                .ok_or_else(|| {
                    EmbeddingError::Response("non-numeric embedding value".to_string())
                })?;

            vectors.push(vector);
        }

        Ok(vectors)
    }
}

/// Deterministic local embedder hashing character trigrams into buckets.
///
/// No network, no model weights. Texts that share trigrams land in the
/// same buckets, which is enough signal for offline use and for tests.
#[derive(Debug, Clone, Copy)]
pub struct NgramEmbedder {
    pub dimensions: usize,
}

impl Default for NgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl NgramEmbedder {
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let bucket = (fnv1a(token.as_bytes()) % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 1469598103934665603u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

#[async_trait]
impl Embedder for NgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
