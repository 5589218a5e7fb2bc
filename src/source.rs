use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ExtractError, Result};

/// Supplier of per-page plain text, in document order.
///
/// The document-to-text conversion happens elsewhere (e.g. `pdftotext`);
/// implementors only hand the engine already-decoded pages.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of page `index` (0-based).
    fn page_text(&self, index: usize) -> Result<String>;
}

/// A single text dump with pages separated by form feeds, as written by
/// `pdftotext`.
#[derive(Debug, Clone)]
pub struct FormFeedDump {
    pages: Vec<String>,
}

impl FormFeedDump {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
        let dump = Self::from_text(&raw);
        if dump.pages.is_empty() {
            return Err(ExtractError::NoPages(path.to_path_buf()));
        }
        info!("Loaded {} pages from {}", dump.pages.len(), path.display());
        Ok(dump)
    }

    pub fn from_text(raw: &str) -> Self {
        let raw = raw.replace("\r\n", "\n");
        let mut pages: Vec<String> = raw.split('\x0c').map(str::to_string).collect();
        // pdftotext ends every page, including the last, with a form feed.
        if pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        FormFeedDump { pages }
    }
}

impl PageSource for FormFeedDump {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(ExtractError::PageOutOfRange {
                index,
                count: self.pages.len(),
            })
    }
}

/// A directory of `*.txt` files, one per page, ordered by file name.
/// Pages are read lazily.
#[derive(Debug, Clone)]
pub struct PageDir {
    files: Vec<PathBuf>,
}

impl PageDir {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| ExtractError::io(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        if files.is_empty() {
            return Err(ExtractError::NoPages(dir.to_path_buf()));
        }
        files.sort();
        info!("Found {} page files in {}", files.len(), dir.display());
        Ok(PageDir { files })
    }
}

impl PageSource for PageDir {
    fn page_count(&self) -> usize {
        self.files.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let path = self.files.get(index).ok_or(ExtractError::PageOutOfRange {
            index,
            count: self.files.len(),
        })?;
        fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))
    }
}

/// Pick the source by path type: directory → [`PageDir`], file → [`FormFeedDump`].
pub fn open(path: &Path) -> Result<Box<dyn PageSource>> {
    if path.is_dir() {
        Ok(Box::new(PageDir::open(path)?))
    } else {
        Ok(Box::new(FormFeedDump::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feed_split() {
        let dump = FormFeedDump::from_text("page one\x0cpage two\x0c");
        assert_eq!(dump.page_count(), 2);
        assert_eq!(dump.page_text(1).unwrap(), "page two");
        assert!(matches!(
            dump.page_text(2),
            Err(ExtractError::PageOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn blank_middle_pages_are_kept() {
        let dump = FormFeedDump::from_text("a\x0c\x0cc");
        assert_eq!(dump.page_count(), 3);
        assert_eq!(dump.page_text(1).unwrap(), "");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = FormFeedDump::open("tests/fixtures/does_not_exist.txt").unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[test]
    fn empty_dump_has_no_pages() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let err = FormFeedDump::open(f.path()).unwrap_err();
        assert!(matches!(err, ExtractError::NoPages(_)));
    }

    #[test]
    fn page_dir_orders_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page-002.txt"), "second").unwrap();
        fs::write(dir.path().join("page-001.txt"), "first").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        let pages = PageDir::open(dir.path()).unwrap();
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_text(0).unwrap(), "first");
        assert_eq!(pages.page_text(1).unwrap(), "second");
    }

    #[test]
    fn open_dispatches_on_path_kind() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("p1.txt"), "x").unwrap();
        assert_eq!(open(dir.path()).unwrap().page_count(), 1);
        let dump = dir.path().join("p1.txt");
        assert_eq!(open(&dump).unwrap().page_count(), 1);
    }
}
