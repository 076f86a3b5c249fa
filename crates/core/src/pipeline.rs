use crate::error::QueryError;
use crate::generation::build_prompt;
use crate::models::{Answer, EmbeddingRecord};
use crate::retriever::retrieve;
use crate::traits::{Completer, Embedder};
use tracing::{info, warn};

/// The online query pipeline: embed the question, retrieve the closest
/// chunks, compose a prompt, and ask the completion service.
///
/// Holds the record set loaded from the index store; records are never
/// mutated, only replaced by re-ingestion.
pub struct ChatPipeline<E, C>
where
    E: Embedder,
    C: Completer,
{
    records: Vec<EmbeddingRecord>,
    embedder: E,
    completer: C,
    top_k: usize,
}

impl<E, C> ChatPipeline<E, C>
where
    E: Embedder + Send + Sync,
    C: Completer + Send + Sync,
{
    pub fn new(records: Vec<EmbeddingRecord>, embedder: E, completer: C, top_k: usize) -> Self {
        Self {
            records,
            embedder,
            completer,
            top_k,
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::Request("question is empty".to_string()));
        }

        let mut vectors = self.embedder.embed(&[question.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(QueryError::Request(format!(
                "embedder returned {} vectors for one question",
                vectors.len()
            )));
        }
        let query_vector = vectors.remove(0);

        let hits = retrieve(&query_vector, &self.records, self.top_k);
        if hits.is_empty() {
            warn!("no chunks retrieved; answering without context");
        } else {
            info!(hits = hits.len(), top_score = hits[0].score, "retrieved context");
        }

        let prompt = build_prompt(question, &hits);
        let text = self.completer.complete(&prompt).await?;

        Ok(Answer {
            text,
            sources: hits,
        })
    }
}
