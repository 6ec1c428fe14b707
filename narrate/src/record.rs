//! In-memory bookkeeping for one narration run.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// What happened to a single chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Audio was synthesized and written to this path
    Written(PathBuf),
    /// Synthesis failed; `path` is where the audio would have gone
    Failed { path: PathBuf, error: String },
}

impl ChunkOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ChunkOutcome::Written(path) => path,
            ChunkOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, ChunkOutcome::Written(_))
    }
}

/// Progress of one book through the pipeline.
#[derive(Debug, Clone)]
pub struct ProcessingRecord {
    /// Book title
    pub title: String,
    /// Path to the source text file
    pub source: PathBuf,
    /// Whether every chapter and chunk has been visited
    pub processed: bool,
    /// Chunk outcomes indexed by chapter, then chunk
    pub audio_files: Vec<Vec<ChunkOutcome>>,
    /// When the book finished processing
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcessingRecord {
    /// Create a new, unprocessed record.
    pub fn new(title: String, source: PathBuf) -> Self {
        Self {
            title,
            source,
            processed: false,
            audio_files: Vec::new(),
            completed_at: None,
        }
    }

    /// Mark the book as processed with its full outcome list.
    pub fn mark_processed(&mut self, audio_files: Vec<Vec<ChunkOutcome>>) {
        self.audio_files = audio_files;
        self.processed = true;
        self.completed_at = Some(Utc::now());
    }

    pub fn total_chunks(&self) -> usize {
        self.audio_files.iter().map(Vec::len).sum()
    }

    pub fn written_count(&self) -> usize {
        self.outcomes().filter(|o| o.is_written()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total_chunks() - self.written_count()
    }

    /// Paths of successfully written audio, in chapter/chunk order.
    pub fn written_paths(&self) -> Vec<&Path> {
        self.outcomes()
            .filter(|o| o.is_written())
            .map(ChunkOutcome::path)
            .collect()
    }

    fn outcomes(&self) -> impl Iterator<Item = &ChunkOutcome> {
        self.audio_files.iter().flatten()
    }
}

/// Result of a full run over the books directory.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub records: Vec<ProcessingRecord>,
    pub skipped: Vec<String>,
    pub unreadable: Vec<String>,
}

impl RunSummary {
    /// Log one line per book, as the final report of a run.
    pub fn log(&self) {
        for record in &self.records {
            log::info!(
                "Book: {}, Processed: {}, Audio files: {} written, {} failed",
                record.title,
                record.processed,
                record.written_count(),
                record.failed_count()
            );
            log::debug!("  Source: {}", record.source.display());
            log::debug!("  Audio files: {:?}", record.written_paths());
            for outcome in record.audio_files.iter().flatten() {
                if let ChunkOutcome::Failed { path, error } = outcome {
                    log::debug!("  Missing {}: {}", path.display(), error);
                }
            }
        }
        for title in &self.skipped {
            log::info!("Book: {}, Skipped (empty)", title);
        }
        for title in &self.unreadable {
            log::info!("Book: {}, Skipped (unreadable)", title);
        }
    }

    pub fn failed_chunks(&self) -> usize {
        self.records.iter().map(ProcessingRecord::failed_count).sum()
    }

    pub fn unfinished_books(&self) -> usize {
        self.records.iter().filter(|r| !r.processed).count()
    }
}
