//! Text processing for narration: chapter splitting and token-bounded chunking.

pub mod chapters;
pub mod chunker;
pub mod tokenizer;

pub use chapters::split_chapters;
pub use chunker::process_chapter;
pub use tokenizer::{Cl100kTokenizer, Tokenizer};

/// A chunk of text ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The chapter this chunk belongs to
    pub chapter_id: usize,
    /// The chunk index within the chapter
    pub chunk_id: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(chapter_id: usize, chunk_id: usize, text: String) -> Self {
        Self {
            chapter_id,
            chunk_id,
            text,
        }
    }

    /// Output file name for this chunk's audio, e.g. `chapter_0_chunk_3.mp3`.
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "chapter_{}_chunk_{}.{}",
            self.chapter_id, self.chunk_id, extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_creation() {
        let chunk = TextChunk::new(0, 1, "Hello world".to_string());
        assert_eq!(chunk.chapter_id, 0);
        assert_eq!(chunk.chunk_id, 1);
        assert_eq!(chunk.text, "Hello world");
    }

    #[test]
    fn test_file_name() {
        let chunk = TextChunk::new(2, 7, String::new());
        assert_eq!(chunk.file_name("mp3"), "chapter_2_chunk_7.mp3");
        assert_eq!(chunk.file_name("wav"), "chapter_2_chunk_7.wav");
    }
}
