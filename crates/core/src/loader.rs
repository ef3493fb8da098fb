use crate::error::IngestError;
use crate::models::RawRecord;
use csv::StringRecordsIntoIter;
use lopdf::Document;
use std::fs::{self, File};
use std::path::Path;

/// Extraction strategy, closed over the supported source formats so
/// "unsupported type" is an exhaustive case rather than an open-ended
/// dynamic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    Pdf,
    Csv,
    PlainText,
}

impl Loader {
    /// Picks the strategy for `path` from its extension
    /// (case-insensitive), before any file I/O happens.
    pub fn for_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Loader::Pdf),
            "csv" => Ok(Loader::Csv),
            "txt" => Ok(Loader::PlainText),
            _ => Err(IngestError::UnsupportedFileType(format!(
                "no loader for extension {:?} ({})",
                extension,
                path.display()
            ))),
        }
    }

    /// Whether records from this loader are already a minimal
    /// retrievable unit that must never be re-chunked.
    pub fn row_granular(self) -> bool {
        matches!(self, Loader::Csv)
    }

    /// Whether filenames of this format carry bracket tags. Plain-text
    /// inputs have no category/year convention.
    pub fn carries_filename_tags(self) -> bool {
        !matches!(self, Loader::PlainText)
    }

    /// Opens `path` and returns a lazy, single-pass record stream.
    /// Re-reading a file means calling `load` again; the stream itself
    /// is not restartable.
    pub fn load(self, path: &Path) -> Result<RecordStream, IngestError> {
        let source_path = path.to_string_lossy().to_string();

        match self {
            Loader::PlainText => {
                let content = fs::read_to_string(path)?;
                Ok(RecordStream::Whole(Some(RawRecord {
                    content,
                    source_path,
                    page: Some(0),
                })))
            }
            Loader::Pdf => {
                let document = Document::load(path)
                    .map_err(|error| IngestError::PdfParse(error.to_string()))?;
                // get_pages is ordered; keys are 1-based page ordinals.
                let pages: Vec<u32> = document.get_pages().keys().copied().collect();
                Ok(RecordStream::PdfPages(PdfPages {
                    document,
                    pages,
                    cursor: 0,
                    source_path,
                }))
            }
            Loader::Csv => {
                let mut reader = csv::Reader::from_reader(File::open(path)?);
                let headers: Vec<String> =
                    reader.headers()?.iter().map(str::to_string).collect();
                Ok(RecordStream::CsvRows(CsvRows {
                    rows: reader.into_records(),
                    headers,
                    source_path,
                }))
            }
        }
    }
}

/// Lazy sequence of raw records produced by one [`Loader::load`] call.
/// Records are yielded in source order: page order for PDFs, row order
/// for CSVs, one record for plain text.
pub enum RecordStream {
    Whole(Option<RawRecord>),
    PdfPages(PdfPages),
    CsvRows(CsvRows),
}

impl Iterator for RecordStream {
    type Item = Result<RawRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RecordStream::Whole(record) => record.take().map(Ok),
            RecordStream::PdfPages(pages) => pages.next(),
            RecordStream::CsvRows(rows) => rows.next(),
        }
    }
}

/// Per-page PDF text extraction; the document is loaded once, page text
/// is extracted as the stream advances.
pub struct PdfPages {
    document: Document,
    pages: Vec<u32>,
    cursor: usize,
    source_path: String,
}

impl Iterator for PdfPages {
    type Item = Result<RawRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let page_no = *self.pages.get(self.cursor)?;
        self.cursor += 1;

        let extracted = self
            .document
            .extract_text(&[page_no])
            .map_err(|error| IngestError::PdfParse(error.to_string()));

        Some(extracted.map(|content| RawRecord {
            content,
            source_path: self.source_path.clone(),
            // Zero-based page index in the output contract.
            page: Some(page_no.saturating_sub(1)),
        }))
    }
}

/// Streaming CSV rows, header excluded; each row renders as stable
/// `header: value` lines so a row is a self-describing retrievable
/// unit.
pub struct CsvRows {
    rows: StringRecordsIntoIter<File>,
    headers: Vec<String>,
    source_path: String,
}

impl Iterator for CsvRows {
    type Item = Result<RawRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(error) => return Some(Err(error.into())),
        };

        let content = self
            .headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| format!("{header}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");

        Some(Ok(RawRecord {
            content,
            source_path: self.source_path.clone(),
            page: None,
        }))
    }
}
