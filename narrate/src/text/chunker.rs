//! Token-bounded chunking for synthesis requests.

use super::TextChunk;
use super::tokenizer::{Tokenizer, TokenizerError};

/// Default ceiling on tokens per synthesis request.
pub const DEFAULT_MAX_TOKENS: usize = 4096;

/// Split text into chunks of at most `max_tokens` tokens.
///
/// The text is encoded once and the token sequence is sliced into
/// consecutive, non-overlapping windows; each window is decoded on its
/// own. Boundaries fall on token indices, so a chunk may end mid-word.
/// Empty text yields no chunks.
pub fn split_into_chunks(
    text: &str,
    max_tokens: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<String>, TokenizerError> {
    let tokens = tokenizer.encode(text);
    token_windows(&tokens, max_tokens)?
        .map(|(start, window)| {
            tokenizer.decode(window).map_err(|e| match e {
                TokenizerError::Decode { message, .. } => TokenizerError::Decode {
                    start,
                    end: start + window.len(),
                    message,
                },
                other => other,
            })
        })
        .collect()
}

/// Consecutive `(offset, window)` slices covering `tokens` exactly.
fn token_windows(
    tokens: &[u32],
    max_tokens: usize,
) -> Result<impl Iterator<Item = (usize, &[u32])>, TokenizerError> {
    if max_tokens == 0 {
        return Err(TokenizerError::ZeroLimit);
    }
    Ok(tokens
        .chunks(max_tokens)
        .enumerate()
        .map(move |(i, window)| (i * max_tokens, window)))
}

/// Process a chapter's text into synthesis-ready chunks.
///
/// # Arguments
/// * `chapter_id` - The chapter's index within its book
/// * `text` - The chapter text
/// * `max_tokens` - Token ceiling per chunk (default: 4096)
/// * `tokenizer` - Encoding used to measure and slice the text
pub fn process_chapter(
    chapter_id: usize,
    text: &str,
    max_tokens: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<TextChunk>, TokenizerError> {
    let raw_chunks = split_into_chunks(text, max_tokens, tokenizer)?;

    Ok(raw_chunks
        .into_iter()
        .enumerate()
        .map(|(chunk_id, text)| TextChunk::new(chapter_id, chunk_id, text))
        .collect())
}
