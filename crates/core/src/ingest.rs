use crate::chunking::chunk_document;
use crate::error::IngestError;
use crate::index::IndexStore;
use crate::models::{Chunk, ChunkingOptions, Document, EmbeddingRecord, IngestionReport};
use crate::traits::Embedder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

pub fn discover_text_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_text = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

        if is_text {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// Read every text file in the corpus folder, wholesale, as UTF-8.
pub fn load_documents(folder: &Path) -> Result<Vec<Document>, IngestError> {
    let files = discover_text_files(folder);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no text files found in {}",
            folder.display()
        )));
    }

    let mut documents = Vec::new();
    for path in files {
        let text = fs::read_to_string(&path)?;
        let source = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
            .ok_or_else(|| {
                IngestError::InvalidArgument(format!(
                    "path missing filename: {}",
                    path.display()
                ))
            })?;

        documents.push(Document { source, text });
    }

    Ok(documents)
}

/// Chunk a whole corpus with chunk indices running across documents.
pub fn chunk_documents(
    documents: &[Document],
    options: ChunkingOptions,
) -> Result<Vec<Chunk>, IngestError> {
    let mut chunks = Vec::new();
    let mut cursor = 0u64;

    for document in documents {
        let (document_chunks, next_cursor) = chunk_document(document, options, cursor)?;
        info!(
            source = %document.source,
            chunks = document_chunks.len(),
            "chunked document"
        );
        cursor = next_cursor;
        chunks.extend(document_chunks);
    }

    Ok(chunks)
}

/// Run the full ingestion pipeline: load, chunk, embed, save.
///
/// Each stage must fully succeed before the next begins; the index file is
/// only replaced once every chunk has an embedding.
pub async fn ingest_corpus<E: Embedder>(
    folder: &Path,
    options: ChunkingOptions,
    embedder: &E,
    store: &IndexStore,
) -> Result<IngestionReport, IngestError> {
    let documents = load_documents(folder)?;
    info!(folder = %folder.display(), documents = documents.len(), "loaded corpus");

    let chunks = chunk_documents(&documents, options)?;
    if chunks.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "corpus in {} produced no chunks",
            folder.display()
        )));
    }

    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
    let vectors = embedder.embed(&texts).await?;

    if vectors.len() != chunks.len() {
        return Err(IngestError::Embedding(
            crate::error::EmbeddingError::Response(format!(
                "expected {} vectors, got {}",
                chunks.len(),
                vectors.len()
            )),
        ));
    }

    let records: Vec<EmbeddingRecord> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| EmbeddingRecord { chunk, vector })
        .collect();

    store.save(&records)?;

    Ok(IngestionReport {
        documents: documents.len(),
        chunks: records.len(),
        dimensions: embedder.dimensions(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::NgramEmbedder;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discovery_is_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();

        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        fs::write(nested.join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("ignored.md"), "nope").unwrap();

        let files = discover_text_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.txt"));
        assert!(files[1].ends_with("nested/a.txt"));
    }

    #[test]
    fn loading_an_empty_folder_fails() {
        let dir = tempdir().unwrap();
        let result = load_documents(dir.path());
        assert!(matches!(result, Err(IngestError::InvalidArgument(_))));
    }

    #[test]
    fn chunk_indices_run_across_documents() {
        let documents = vec![
            Document {
                source: "a.txt".to_string(),
                text: "abcdefghij".to_string(),
            },
            Document {
                source: "b.txt".to_string(),
                text: "klmnopqrst".to_string(),
            },
        ];

        let options = ChunkingOptions {
            chunk_size: 5,
            chunk_overlap: 0,
        };
        let chunks = chunk_documents(&documents, options).unwrap();

        assert_eq!(chunks.len(), 4);
        let indices: Vec<u64> = chunks.iter().map(|chunk| chunk.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(chunks[2].source, "b.txt");
    }

    #[tokio::test]
    async fn ingestion_produces_a_loadable_index() {
        let corpus = tempdir().unwrap();
        let data = tempdir().unwrap();

        // Three documents; one long enough for multiple windows.
        fs::write(corpus.path().join("one.txt"), "x".repeat(250)).unwrap();
        fs::write(corpus.path().join("two.txt"), "wifi setup steps").unwrap();
        fs::write(corpus.path().join("three.txt"), "battery warnings").unwrap();

        let options = ChunkingOptions {
            chunk_size: 100,
            chunk_overlap: 20,
        };
        let embedder = NgramEmbedder { dimensions: 64 };
        let store = IndexStore::new(data.path().join("index.json"));

        let report = ingest_corpus(corpus.path(), options, &embedder, &store)
            .await
            .unwrap();

        // 250 chars at size 100 / overlap 20 yields 3 windows, plus one
        // window for each short document.
        assert_eq!(report.documents, 3);
        assert_eq!(report.chunks, 5);
        assert_eq!(report.dimensions, 64);

        let records = store.load().unwrap();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|record| record.vector.len() == 64));
    }

    #[tokio::test]
    async fn ingestion_fails_on_an_empty_folder() {
        let corpus = tempdir().unwrap();
        let data = tempdir().unwrap();
        let store = IndexStore::new(data.path().join("index.json"));
        let embedder = NgramEmbedder::default();

        let result =
            ingest_corpus(corpus.path(), ChunkingOptions::default(), &embedder, &store).await;
        assert!(result.is_err());
        assert!(store.load().is_err());
    }
}
