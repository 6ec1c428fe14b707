//! Discovery of input books.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of input book files.
const BOOK_EXTENSION: &str = "txt";

/// A plain-text book loaded from disk.
#[derive(Debug, Clone)]
pub struct Document {
    /// File stem of the source file
    pub title: String,
    /// Where the text was read from
    pub path: PathBuf,
    /// Full text content, never empty or whitespace-only
    pub contents: String,
}

/// Books found in a directory, plus the titles that were left out.
#[derive(Debug, Default)]
pub struct Library {
    pub documents: Vec<Document>,
    /// Empty or whitespace-only books
    pub skipped: Vec<String>,
    /// Books that could not be read as UTF-8 text
    pub unreadable: Vec<String>,
}

/// Load every `*.txt` book in `dir`.
///
/// Books are ordered by file name. Empty and whitespace-only files are
/// logged and reported in [`Library::skipped`]; files that fail to read
/// (including non-UTF-8 text) go to [`Library::unreadable`]. Only a
/// missing or unlistable directory is an error.
pub fn discover_documents(dir: &Path) -> Result<Library> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read books directory {}", dir.display()))?
    {
        let path = entry?.path();
        let is_book = path.is_file()
            && path
                .extension()
                .map(|e| e == BOOK_EXTENSION)
                .unwrap_or(false);
        if is_book {
            paths.push(path);
        }
    }
    paths.sort();

    let mut library = Library::default();

    for path in paths {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("Loading book: {}", title);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Skipping unreadable file {}: {}", path.display(), e);
                library.unreadable.push(title);
                continue;
            }
        };
        if contents.trim().is_empty() {
            log::warn!("Skipping empty file: {}", title);
            library.skipped.push(title);
            continue;
        }

        library.documents.push(Document {
            title,
            path,
            contents,
        });
    }

    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discovers_txt_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("zeta.txt"), "Z").unwrap();
        fs::write(dir.path().join("alpha.txt"), "A").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let library = discover_documents(dir.path()).unwrap();
        let titles: Vec<&str> = library.documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha", "zeta"]);
        assert_eq!(library.documents[0].contents, "A");
        assert_eq!(library.documents[0].path, dir.path().join("alpha.txt"));
        assert!(library.skipped.is_empty());
    }

    #[test]
    fn test_skips_whitespace_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blank.txt"), "   \n  ").unwrap();
        fs::write(dir.path().join("empty.txt"), "").unwrap();
        fs::write(dir.path().join("book.txt"), "Once upon a time.").unwrap();

        let library = discover_documents(dir.path()).unwrap();
        assert_eq!(library.documents.len(), 1);
        assert_eq!(library.documents[0].title, "book");
        assert_eq!(library.skipped, vec!["blank", "empty"]);
    }

    #[test]
    fn test_skips_non_utf8_book() {
        let dir = TempDir::new().unwrap();
        // "café" in Latin-1
        fs::write(dir.path().join("latin1.txt"), b"caf\xe9 au lait").unwrap();
        fs::write(dir.path().join("utf8.txt"), "Café au lait.").unwrap();

        let library = discover_documents(dir.path()).unwrap();
        assert_eq!(library.documents.len(), 1);
        assert_eq!(library.documents[0].title, "utf8");
        assert_eq!(library.unreadable, vec!["latin1"]);
        assert!(library.skipped.is_empty());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover_documents(&dir.path().join("nope")).is_err());
    }
}
