use crate::models::{EmbeddingRecord, ScoredChunk};

/// Cosine similarity of two vectors; 0.0 when either norm is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Score every record against the query vector and keep the best `top_k`.
///
/// A linear scan is deliberate; the corpus is small enough that an index
/// structure would buy nothing. The sort is stable, so ties keep their
/// insertion order and repeated calls return identical results.
pub fn retrieve(
    query_vector: &[f32],
    records: &[EmbeddingRecord],
    top_k: usize,
) -> Vec<ScoredChunk> {
    let mut hits: Vec<ScoredChunk> = records
        .iter()
        .map(|record| ScoredChunk {
            chunk: record.chunk.clone(),
            score: cosine_similarity(query_vector, &record.vector),
        })
        .collect();

    hits.sort_by(|left, right| right.score.total_cmp(&left.score));
    hits.truncate(top_k);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    fn record(index: u64, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            chunk: Chunk {
                chunk_id: format!("id-{index}"),
                source: "doc.txt".to_string(),
                chunk_index: index,
                text: format!("chunk {index}"),
            },
            vector,
        }
    }

    #[test]
    fn cosine_stays_within_unit_bounds() {
        let a = vec![1.0, 2.0, -3.0];
        let b = vec![-4.0, 0.5, 2.0];
        let score = cosine_similarity(&a, &b);
        assert!((-1.0..=1.0).contains(&score));

        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &a), 0.0);
    }

    #[test]
    fn best_match_ranks_first() {
        let records = vec![
            record(0, vec![0.0, 1.0]),
            record(1, vec![1.0, 0.0]),
            record(2, vec![0.7, 0.7]),
        ];

        let hits = retrieve(&[1.0, 0.0], &records, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.chunk_index, 1);
        assert_eq!(hits[1].chunk.chunk_index, 2);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn retrieval_is_idempotent() {
        let records = vec![
            record(0, vec![0.2, 0.8]),
            record(1, vec![0.9, 0.1]),
            record(2, vec![0.5, 0.5]),
        ];

        let first = retrieve(&[0.6, 0.4], &records, 3);
        let second = retrieve(&[0.6, 0.4], &records, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let records = vec![
            record(0, vec![1.0, 0.0]),
            record(1, vec![2.0, 0.0]),
            record(2, vec![0.0, 1.0]),
        ];

        // Records 0 and 1 point the same way, so their cosine scores tie.
        let hits = retrieve(&[1.0, 0.0], &records, 3);
        assert_eq!(hits[0].chunk.chunk_index, 0);
        assert_eq!(hits[1].chunk.chunk_index, 1);
    }

    #[test]
    fn top_k_beyond_record_count_returns_everything() {
        let records = vec![record(0, vec![1.0, 0.0]), record(1, vec![0.0, 1.0])];
        let hits = retrieve(&[1.0, 1.0], &records, 5);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_records_return_empty() {
        assert!(retrieve(&[1.0, 0.0], &[], 5).is_empty());
    }
}
