pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod retriever;
pub mod traits;

pub use chunking::{chunk_document, split_text};
pub use embeddings::{HttpEmbedder, NgramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{EmbeddingError, GenerationError, IndexError, IngestError, QueryError};
pub use generation::{build_prompt, format_context, GenerationOptions, HttpCompleter};
pub use index::IndexStore;
pub use ingest::{chunk_documents, discover_text_files, ingest_corpus, load_documents};
pub use models::{
    Answer, Chunk, ChunkingOptions, Document, EmbeddingRecord, IngestionReport, ScoredChunk,
};
pub use pipeline::ChatPipeline;
pub use retriever::{cosine_similarity, retrieve};
pub use traits::{Completer, Embedder};
