use crate::chunking::split_chunks;
use crate::dedup::DuplicateFilter;
use crate::error::IngestError;
use crate::loader::Loader;
use crate::models::{ChunkMetadata, FileTags, IndexableChunk, IngestionOptions, RawRecord};
use crate::tags::extract_file_tags;
use crate::traits::SimilaritySearch;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Orchestrates loading, duplicate filtering, metadata merging, and
/// chunking for one input file at a time.
///
/// Holds no mutable state between calls; callers may run independent
/// `ingest` calls on parallel tasks as long as the backing index
/// tolerates concurrent reads. No timeout is imposed internally; a
/// stuck lookup or read blocks the call, and cancellation belongs to
/// the caller.
pub struct IngestionPipeline<S> {
    filter: DuplicateFilter<S>,
}

impl<S> IngestionPipeline<S>
where
    S: SimilaritySearch,
{
    pub fn new(index: S) -> Self {
        Self {
            filter: DuplicateFilter::new(index),
        }
    }

    /// Builds a pipeline around an already-configured filter, for
    /// callers that tuned the rejection threshold.
    pub fn with_filter(filter: DuplicateFilter<S>) -> Self {
        Self { filter }
    }

    /// Ingests one file into an ordered set of indexable chunks.
    ///
    /// Fatal errors (bad config, unsupported extension, malformed
    /// filename tags, unreadable source, failed lookup) abort the whole
    /// file with no partial output. Records rejected as near-duplicates
    /// are skipped silently, so an all-duplicate file yields `Ok` with
    /// an empty set.
    pub async fn ingest(
        &self,
        path: &Path,
        options: &IngestionOptions,
    ) -> Result<Vec<IndexableChunk>, IngestError> {
        if options.chunk_size == 0 {
            return Err(IngestError::InvalidConfiguration(
                "chunk_size must be a positive number of characters".to_string(),
            ));
        }

        let loader = Loader::for_path(path)?;

        // Tags are parsed once per file; plain text has no tag
        // convention and its chunks carry no category/year.
        let tags = if loader.carries_filename_tags() {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;
            Some(extract_file_tags(name)?)
        } else {
            None
        };

        let records = loader.load(path)?;
        self.collect_chunks(records, tags.as_ref(), loader.row_granular(), options)
            .await
    }

    async fn collect_chunks(
        &self,
        records: impl Iterator<Item = Result<RawRecord, IngestError>>,
        tags: Option<&FileTags>,
        row_granular: bool,
        options: &IngestionOptions,
    ) -> Result<Vec<IndexableChunk>, IngestError> {
        let mut chunks = Vec::new();

        for record in records {
            let record = record?;

            let decision = self
                .filter
                .should_accept(&record.content, options.force)
                .await?;
            if !decision.accept {
                debug!(
                    source = %record.source_path,
                    page = ?record.page,
                    score = ?decision.matched_score,
                    "record filtered as near-duplicate"
                );
                continue;
            }

            let metadata = ChunkMetadata {
                source: record.source_path.clone(),
                page: record.page,
                category: tags.map(|tags| tags.category.clone()),
                year: tags.map(|tags| tags.year),
            };

            for piece in split_chunks(&record.content, options.chunk_size, row_granular)? {
                chunks.push(IndexableChunk {
                    content: piece,
                    metadata: metadata.clone(),
                });
            }
        }

        Ok(chunks)
    }
}

/// Walks `folder` recursively collecting every file a loader exists
/// for, sorted for a stable ingestion order.
pub fn discover_ingestible_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if Loader::for_path(entry.path()).is_ok() {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IngestionReport {
    pub chunks: Vec<IndexableChunk>,
    pub skipped_files: Vec<SkippedFile>,
}

impl<S> IngestionPipeline<S>
where
    S: SimilaritySearch,
{
    /// Ingests every supported file under `folder`, catching per-file
    /// fatal errors into the report so one malformed file does not halt
    /// the batch.
    pub async fn ingest_folder_best_effort(
        &self,
        folder: &Path,
        options: &IngestionOptions,
    ) -> Result<IngestionReport, IngestError> {
        let files = discover_ingestible_files(folder);

        if files.is_empty() {
            return Err(IngestError::InvalidConfiguration(format!(
                "no ingestible documents found in {}",
                folder.display()
            )));
        }

        let mut chunks = Vec::new();
        let mut skipped_files = Vec::new();

        for path in files {
            match self.ingest(&path, options).await {
                Ok(file_chunks) => chunks.extend(file_chunks),
                Err(error) => skipped_files.push(SkippedFile {
                    path,
                    reason: error.to_string(),
                }),
            }
        }

        Ok(IngestionReport {
            chunks,
            skipped_files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::IngestionPipeline;
    use crate::error::{IngestError, SimilarityError};
    use crate::models::{FileTags, IngestionOptions, RawRecord};
    use crate::traits::{ScoredMatch, SimilaritySearch};
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Index stub: returns a fixed nearest-neighbor score (or nothing)
    /// and counts queries. Shared through `Arc` so tests keep a handle
    /// after the pipeline takes ownership.
    #[derive(Default)]
    struct FakeIndex {
        nearest_score: Option<f64>,
        queries: AtomicUsize,
    }

    #[async_trait]
    impl SimilaritySearch for Arc<FakeIndex> {
        async fn similarity_search(
            &self,
            content: &str,
            _k: usize,
        ) -> Result<Vec<ScoredMatch>, SimilarityError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .nearest_score
                .map(|score| ScoredMatch {
                    content: content.to_string(),
                    score,
                })
                .into_iter()
                .collect())
        }
    }

    fn fresh_pipeline(nearest_score: Option<f64>) -> (IngestionPipeline<Arc<FakeIndex>>, Arc<FakeIndex>) {
        let index = Arc::new(FakeIndex {
            nearest_score,
            queries: AtomicUsize::new(0),
        });
        (IngestionPipeline::new(Arc::clone(&index)), index)
    }

    fn page_record(page: u32, length: usize) -> Result<RawRecord, IngestError> {
        Ok(RawRecord {
            content: "a".repeat(length),
            source_path: "/docs/doc[2.경제][2023.01].pdf".to_string(),
            page: Some(page),
        })
    }

    #[tokio::test]
    async fn three_page_layout_chunks_and_tags_as_expected() {
        let (pipeline, _index) = fresh_pipeline(None);
        let tags = FileTags {
            category: "2.경제".to_string(),
            year: 2023,
        };
        let records = vec![page_record(0, 1200), page_record(1, 400), page_record(2, 50)];

        let chunks = pipeline
            .collect_chunks(
                records.into_iter(),
                Some(&tags),
                false,
                &IngestionOptions::default(),
            )
            .await
            .expect("ingestion succeeds");

        let lengths: Vec<usize> = chunks.iter().map(|chunk| chunk.content.len()).collect();
        assert_eq!(lengths, vec![500, 500, 200, 400, 50]);

        let pages: Vec<Option<u32>> = chunks.iter().map(|chunk| chunk.metadata.page).collect();
        assert_eq!(
            pages,
            vec![Some(0), Some(0), Some(0), Some(1), Some(2)]
        );

        for chunk in &chunks {
            assert_eq!(chunk.metadata.category.as_deref(), Some("2.경제"));
            assert_eq!(chunk.metadata.year, Some(2023));
            assert_eq!(chunk.metadata.source, "/docs/doc[2.경제][2023.01].pdf");
        }
    }

    #[tokio::test]
    async fn near_duplicate_text_file_yields_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        fs::write(&path, "almost identical to an indexed entry")?;

        let (pipeline, index) = fresh_pipeline(Some(0.1));
        let options = IngestionOptions {
            force: false,
            ..Default::default()
        };

        let chunks = pipeline.ingest(&path, &options).await?;
        assert!(chunks.is_empty());
        assert_eq!(index.queries.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn text_file_chunks_carry_no_tags() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        fs::write(&path, "short plain body")?;

        let (pipeline, _index) = fresh_pipeline(None);
        let chunks = pipeline
            .ingest(&path, &IngestionOptions::default())
            .await?;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short plain body");
        assert_eq!(chunks[0].metadata.page, Some(0));
        assert_eq!(chunks[0].metadata.category, None);
        assert_eq!(chunks[0].metadata.year, None);
        Ok(())
    }

    #[tokio::test]
    async fn csv_rows_are_not_resplit() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("trade[3.정책][2024.02].csv");
        fs::write(&path, "country,volume\nKR,1204\nJP,987\n")?;

        let (pipeline, _index) = fresh_pipeline(None);
        let options = IngestionOptions {
            chunk_size: 5,
            ..Default::default()
        };

        let chunks = pipeline.ingest(&path, &options).await?;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "country: KR\nvolume: 1204");
        assert_eq!(chunks[0].metadata.category.as_deref(), Some("3.정책"));
        assert_eq!(chunks[0].metadata.year, Some(2024));
        assert_eq!(chunks[0].metadata.page, None);
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_extension_fails_before_any_query() {
        let (pipeline, index) = fresh_pipeline(None);

        let result = pipeline
            .ingest(
                std::path::Path::new("/docs/report[1.법률][2024.01].docx"),
                &IngestionOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(IngestError::UnsupportedFileType(_))));
        assert_eq!(index.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_filename_aborts_the_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("untagged.csv");
        fs::write(&path, "a,b\n1,2\n")?;

        let (pipeline, _index) = fresh_pipeline(None);
        let result = pipeline.ingest(&path, &IngestionOptions::default()).await;

        assert!(matches!(result, Err(IngestError::MalformedFilename(_))));
        Ok(())
    }

    #[tokio::test]
    async fn zero_chunk_size_fails_before_io() {
        let (pipeline, _index) = fresh_pipeline(None);
        let options = IngestionOptions {
            chunk_size: 0,
            ..Default::default()
        };

        let result = pipeline
            .ingest(std::path::Path::new("/nonexistent/notes.txt"), &options)
            .await;

        assert!(matches!(result, Err(IngestError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn folder_batch_skips_bad_files_without_halting() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        fs::write(dir.path().join("good.txt"), "plain body")?;
        fs::write(dir.path().join("untagged.csv"), "a,b\n1,2\n")?;

        let (pipeline, _index) = fresh_pipeline(None);
        let report = pipeline
            .ingest_folder_best_effort(dir.path(), &IngestionOptions::default())
            .await?;

        assert_eq!(report.chunks.len(), 1);
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(
            report.skipped_files[0]
                .path
                .file_name()
                .and_then(|name| name.to_str()),
            Some("untagged.csv")
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_folder_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let (pipeline, _index) = fresh_pipeline(None);

        let result = pipeline
            .ingest_folder_best_effort(dir.path(), &IngestionOptions::default())
            .await;

        assert!(matches!(result, Err(IngestError::InvalidConfiguration(_))));
        Ok(())
    }
}
