use crate::error::IndexError;
use crate::models::{Chunk, EmbeddingRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk index layout: chunk metadata and vectors as parallel arrays.
/// A load where the two disagree in length is treated as corruption.
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    dimensions: usize,
    built_at: DateTime<Utc>,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

/// Flat-file store for embedded chunks.
///
/// `save` replaces the whole index; `load` reads it back wholesale. There
/// are no partial or merge semantics.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize all records, replacing any previous index. The new file is
    /// written beside the target and renamed into place, so a previously
    /// saved index stays readable until the replacement is complete.
    pub fn save(&self, records: &[EmbeddingRecord]) -> Result<(), IndexError> {
        let dimensions = records.first().map_or(0, |record| record.vector.len());

        for record in records {
            if record.vector.len() != dimensions {
                return Err(IndexError::Corrupt(format!(
                    "record {} has dimension {} instead of {}",
                    record.chunk.chunk_index,
                    record.vector.len(),
                    dimensions
                )));
            }
        }

        let file = IndexFile {
            dimensions,
            built_at: Utc::now(),
            chunks: records.iter().map(|record| record.chunk.clone()).collect(),
            vectors: records.iter().map(|record| record.vector.clone()).collect(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, serde_json::to_vec(&file)?)?;
        fs::rename(&staging, &self.path)?;

        info!(path = %self.path.display(), records = records.len(), "index saved");
        Ok(())
    }

    /// Load the full record set in saved order.
    pub fn load(&self) -> Result<Vec<EmbeddingRecord>, IndexError> {
        if !self.path.exists() {
            return Err(IndexError::NotFound(self.path.clone()));
        }

        let bytes = fs::read(&self.path)?;
        let file: IndexFile = serde_json::from_slice(&bytes)
            .map_err(|error| IndexError::Corrupt(format!("unreadable index: {error}")))?;

        if file.chunks.len() != file.vectors.len() {
            return Err(IndexError::Corrupt(format!(
                "{} chunks but {} vectors",
                file.chunks.len(),
                file.vectors.len()
            )));
        }

        for vector in &file.vectors {
            if vector.len() != file.dimensions {
                return Err(IndexError::Corrupt(format!(
                    "vector dimension {} != {}",
                    vector.len(),
                    file.dimensions
                )));
            }
        }

        let records = file
            .chunks
            .into_iter()
            .zip(file.vectors)
            .map(|(chunk, vector)| EmbeddingRecord { chunk, vector })
            .collect::<Vec<_>>();

        info!(path = %self.path.display(), records = records.len(), "index loaded");
        Ok(records)
    }
}
