//! Chapter splitting on blank-line runs.

/// Four consecutive newlines mark a chapter break.
pub const CHAPTER_DELIMITER: &str = "\n\n\n\n";

/// Split a document into chapters.
///
/// Each segment between delimiters is trimmed and re-wrapped with one
/// leading and one trailing newline. Empty segments (delimiter at the
/// very start or end, or back to back) are kept as `"\n\n"` so chapter
/// indices line up with delimiter positions.
pub fn split_chapters(document: &str) -> Vec<String> {
    document
        .split(CHAPTER_DELIMITER)
        .map(|chapter| format!("\n{}\n", chapter.trim()))
        .collect()
}
