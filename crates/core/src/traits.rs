use crate::error::{EmbeddingError, GenerationError};
use async_trait::async_trait;

/// Maps text to fixed-dimensional vectors, one per input, order preserved.
#[async_trait]
pub trait Embedder {
    fn dimensions(&self) -> usize;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

#[async_trait]
impl Embedder for Box<dyn Embedder + Send + Sync> {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts).await
    }
}

/// Turns a composed prompt into a single completion string.
#[async_trait]
pub trait Completer {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}
