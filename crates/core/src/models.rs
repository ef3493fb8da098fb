use serde::{Deserialize, Serialize};

/// One loader-produced unit of content before deduplication and
/// chunking: a PDF page, a CSV row, or the whole body of a plain-text
/// file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub content: String,
    pub source_path: String,
    pub page: Option<u32>,
}

/// Structured metadata parsed once per file from its bracket-tagged
/// filename, e.g. `report[1.법률][2024.03].pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTags {
    pub category: String,
    pub year: i32,
}

/// Metadata attached to every chunk of a record. Category and year are
/// absent for plain-text inputs, which carry no filename tags, and are
/// omitted from the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChunkMetadata {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Terminal artifact of one ingest call, in the exact shape the
/// downstream indexer accepts. Not mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexableChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Outcome of one near-duplicate lookup. Never persisted; the pipeline
/// consumes it immediately to decide whether a record proceeds to
/// chunking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateDecision {
    pub accept: bool,
    pub matched_score: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestionOptions {
    /// Skip duplicate detection entirely and index every record, the
    /// mode used for first-time bulk loads.
    pub force: bool,
    /// Chunk width in characters.
    pub chunk_size: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            force: true,
            chunk_size: 500,
        }
    }
}
