//! Book narration pipeline: chapters, chunks, synthesis, files on disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tts_client::{AudioFormat, SpeechProvider, SpeechRequest, TtsError, Voice};

use crate::library::{Document, Library};
use crate::record::{ChunkOutcome, ProcessingRecord, RunSummary};
use crate::text::{self, TextChunk, Tokenizer};

/// Settings shared by every synthesis request in a run.
#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    /// Root of the output tree; each book gets a subdirectory
    pub audio_dir: PathBuf,
    pub max_tokens: usize,
    pub voice: Voice,
    pub model: String,
    pub format: AudioFormat,
    /// Upper bound on a single synthesis call
    pub timeout: Duration,
}

/// Drives books through splitting, chunking and synthesis, one chunk at a time.
pub struct BookProcessor {
    tokenizer: Box<dyn Tokenizer>,
    provider: Arc<dyn SpeechProvider>,
    settings: ProcessorSettings,
}

impl BookProcessor {
    pub fn new(
        tokenizer: Box<dyn Tokenizer>,
        provider: Arc<dyn SpeechProvider>,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            tokenizer,
            provider,
            settings,
        }
    }

    /// Output path for one chunk: `<audio_dir>/<title>/chapter_<i>_chunk_<j>.<ext>`.
    pub fn chunk_path(&self, title: &str, chunk: &TextChunk) -> PathBuf {
        self.settings
            .audio_dir
            .join(title)
            .join(chunk.file_name(self.settings.format.extension()))
    }

    /// Narrate every book in the library, in order.
    pub async fn run(&self, library: Library) -> RunSummary {
        let mut summary = RunSummary {
            records: Vec::with_capacity(library.documents.len()),
            skipped: library.skipped,
            unreadable: library.unreadable,
        };

        for document in &library.documents {
            summary.records.push(self.process_document(document).await);
        }

        log::info!("All books processed.");
        summary
    }

    /// Narrate one book.
    ///
    /// Synthesis failures are recorded per chunk and never stop the book.
    /// Tokenizer and filesystem errors abort the book; its record is then
    /// returned unprocessed with whatever outcomes were collected.
    pub async fn process_document(&self, document: &Document) -> ProcessingRecord {
        let mut record = ProcessingRecord::new(document.title.clone(), document.path.clone());
        log::info!("Processing book: {}", document.title);

        let mut outcomes = Vec::new();
        match self.narrate_chapters(document, &mut outcomes).await {
            Ok(()) => {
                record.mark_processed(outcomes);
                log::info!("Completed processing book: {}", document.title);
            }
            Err(e) => {
                log::error!("Aborted book {}: {:#}", document.title, e);
                record.audio_files = outcomes;
            }
        }

        record
    }

    async fn narrate_chapters(
        &self,
        document: &Document,
        outcomes: &mut Vec<Vec<ChunkOutcome>>,
    ) -> Result<()> {
        let chapters = text::split_chapters(&document.contents);

        for (chapter_id, chapter) in chapters.iter().enumerate() {
            log::info!("Processing chapter {} of {}", chapter_id, document.title);

            let chunks = text::process_chapter(
                chapter_id,
                chapter,
                self.settings.max_tokens,
                self.tokenizer.as_ref(),
            )
            .with_context(|| {
                format!(
                    "Failed to tokenize chapter {} of {} ({} encoding)",
                    chapter_id,
                    document.title,
                    self.tokenizer.name()
                )
            })?;

            outcomes.push(Vec::with_capacity(chunks.len()));
            for chunk in &chunks {
                let outcome = self.narrate_chunk(&document.title, chunk).await?;
                if let Some(chapter_outcomes) = outcomes.last_mut() {
                    chapter_outcomes.push(outcome);
                }
            }
        }

        Ok(())
    }

    /// Synthesize one chunk and write it to disk.
    ///
    /// Returns `Err` only for filesystem failures.
    async fn narrate_chunk(&self, title: &str, chunk: &TextChunk) -> Result<ChunkOutcome> {
        let path = self.chunk_path(title, chunk);
        log::info!("Generating audio for {}", path.display());

        match self.synthesize(&chunk.text).await {
            Ok(audio) => {
                write_audio(&path, &audio).await?;
                Ok(ChunkOutcome::Written(path))
            }
            Err(e) => {
                log::warn!(
                    "Synthesis failed for {} chapter {} chunk {} ({}): {}",
                    title,
                    chunk.chapter_id,
                    chunk.chunk_id,
                    if e.is_transient() { "transient" } else { "permanent" },
                    e
                );
                Ok(ChunkOutcome::Failed {
                    path,
                    error: e.to_string(),
                })
            }
        }
    }

    async fn synthesize(&self, text: &str) -> tts_client::Result<Vec<u8>> {
        let request = SpeechRequest {
            text: text.to_string(),
            voice: self.settings.voice,
            model: self.settings.model.clone(),
            format: self.settings.format,
        };

        match tokio::time::timeout(self.settings.timeout, self.provider.synthesize(request)).await {
            Ok(response) => Ok(response?.audio),
            Err(_) => Err(TtsError::Timeout),
        }
    }
}

/// Write audio bytes, creating the book directory if needed.
async fn write_audio(path: &Path, audio: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, audio)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
