use chrono::Utc;
use clap::{Parser, Subcommand};
use doc_ingest_core::{ChromaStore, IngestionOptions, IngestionPipeline, SimilaritySearch};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "doc-ingest", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Chroma base URL
    #[arg(long, default_value = "http://localhost:8000")]
    chroma_url: String,

    /// Chroma collection name
    #[arg(long, default_value = "documents")]
    collection: String,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a folder of documents (.pdf, .csv, .txt) into the collection.
    Ingest {
        /// Folder scanned recursively for ingestible documents.
        #[arg(long)]
        folder: String,
        /// Reject records that are near-duplicates of indexed content
        /// instead of force-indexing everything.
        #[arg(long, default_value_t = false)]
        dedup: bool,
        /// Chunk width in characters.
        #[arg(long, default_value = "500")]
        chunk_size: usize,
    },
    /// Query the collection for the chunks nearest to a text.
    Search {
        /// Query text
        #[arg(long)]
        query: String,
        /// Number of matches to return.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = ChromaStore::connect(&cli.chroma_url, &cli.collection)
        .await
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        collection = %cli.collection,
        "doc-ingest boot"
    );

    match cli.command {
        Command::Ingest {
            folder,
            dedup,
            chunk_size,
        } => {
            let options = IngestionOptions {
                force: !dedup,
                chunk_size,
            };
            let pipeline = IngestionPipeline::new(store.clone());

            let report = pipeline
                .ingest_folder_best_effort(Path::new(&folder), &options)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if !report.skipped_files.is_empty() {
                warn!(
                    "skipped_files={} for folder={}",
                    report.skipped_files.len(),
                    folder
                );
                for skipped in &report.skipped_files {
                    warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
                }
            }

            if report.chunks.is_empty() {
                println!("0 chunks ingested (every record was filtered or skipped)");
                return Ok(());
            }

            info!(folder = %folder, chunk_count = %report.chunks.len(), "indexing chunks");

            store
                .add_chunks(&report.chunks)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!(
                "{} chunks ingested at {}",
                report.chunks.len(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Search { query, top_k } => {
            let matches = store
                .similarity_search(&query, top_k)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("query: {query}");
            for (rank, hit) in matches.iter().enumerate() {
                println!("[{}] distance={:.4}", rank + 1, hit.score);
                println!("  {}", hit.content);
            }
        }
    }

    Ok(())
}
