use crate::error::IngestError;
use crate::models::{Chunk, ChunkingOptions, Document};
use sha2::{Digest, Sha256};

/// Split text into overlapping windows of `chunk_size` characters.
///
/// Successive windows advance by `chunk_size - chunk_overlap`; the final
/// window may be shorter and is kept as-is. Offsets are character-based so
/// multi-byte text never splits inside a code point.
pub fn split_text(text: &str, options: ChunkingOptions) -> Result<Vec<String>, IngestError> {
    options.validate()?;

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(Vec::new());
    }

    let stride = options.chunk_size - options.chunk_overlap;
    let mut windows = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + options.chunk_size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += stride;
    }

    Ok(windows)
}

/// Chunk one document, assigning source ids and a running chunk index.
///
/// Returns the chunks and the next free index so callers can keep indices
/// unique across a whole corpus.
pub fn chunk_document(
    document: &Document,
    options: ChunkingOptions,
    start_index: u64,
) -> Result<(Vec<Chunk>, u64), IngestError> {
    let mut chunks = Vec::new();
    let mut cursor = start_index;

    for window in split_text(&document.text, options)? {
        if window.trim().is_empty() {
            continue;
        }

        chunks.push(Chunk {
            chunk_id: make_chunk_id(&document.source, cursor, &window),
            source: document.source.clone(),
            chunk_index: cursor,
            text: window,
        });
        cursor = cursor.saturating_add(1);
    }

    Ok((chunks, cursor))
}

fn make_chunk_id(source: &str, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
