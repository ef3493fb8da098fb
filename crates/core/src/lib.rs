pub mod chunking;
pub mod dedup;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod models;
pub mod stores;
pub mod tags;
pub mod traits;

pub use chunking::{split_chunks, Chunks};
pub use dedup::{DuplicateFilter, SIMILARITY_THRESHOLD};
pub use embeddings::{Embedder, HashedNgramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{IngestError, SimilarityError};
pub use ingest::{
    discover_ingestible_files, IngestionPipeline, IngestionReport, SkippedFile,
};
pub use loader::{Loader, RecordStream};
pub use models::{
    ChunkMetadata, DuplicateDecision, FileTags, IndexableChunk, IngestionOptions, RawRecord,
};
pub use stores::ChromaStore;
pub use tags::extract_file_tags;
pub use traits::{ScoredMatch, SimilaritySearch};
