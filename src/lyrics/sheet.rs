//! Lyric sheet loading.
//!
//! A [`LyricSheet`] is the ordered sequence of lines loaded from a plain-text
//! lyrics file. Lines are read **verbatim**, line terminators included, so
//! the display preserves the file's original spacing. A sheet is created in
//! bulk on load, replaced wholesale on the next load, and never mutated.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// LyricsError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a lyrics file.
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("failed to open lyrics file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to read lyrics file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// LyricLine
// ---------------------------------------------------------------------------

/// One verbatim line of lyrics, terminator included.
///
/// Identified by its 0-based position in the owning [`LyricSheet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// Raw line text, trailing newline characters preserved.
    pub text: String,
}

// ---------------------------------------------------------------------------
// LyricSheet
// ---------------------------------------------------------------------------

/// Ordered, immutable sequence of [`LyricLine`]s.
///
/// An empty sheet means "nothing loaded": callers that fail to load a file
/// install an empty sheet after surfacing the error, so downstream code only
/// ever distinguishes empty vs non-empty. The `Err` returned by
/// [`LyricSheet::load`] is what tells a failed load apart from a genuinely
/// empty file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricSheet {
    lines: Vec<LyricLine>,
}

impl LyricSheet {
    /// Create an empty sheet (the "nothing loaded" state).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a sheet from `path`, reading each physical line verbatim.
    ///
    /// Uses a `read_line` loop rather than `lines()` so terminators survive.
    ///
    /// # Errors
    ///
    /// [`LyricsError::Open`] when the file cannot be opened,
    /// [`LyricsError::Read`] when a read fails mid-file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LyricsError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LyricsError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();

        loop {
            let mut text = String::new();
            let n = reader
                .read_line(&mut text)
                .map_err(|source| LyricsError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            lines.push(LyricLine { text });
        }

        log::info!("loaded {} lyric lines from {}", lines.len(), path.display());
        Ok(Self { lines })
    }

    /// Number of lines in the sheet.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `true` when no lines are loaded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line at `index`, or `None` past the end (the terminal display
    /// state shows no line).
    pub fn line(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    /// Iterate over all lines in order.
    pub fn iter(&self) -> impl Iterator<Item = &LyricLine> {
        self.lines.iter()
    }
}

#[cfg(test)]
impl LyricSheet {
    /// Build a sheet directly from strings (test helper).
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|s| LyricLine { text: s.into() })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).expect("create");
        f.write_all(content.as_bytes()).expect("write");
        path
    }

    #[test]
    fn loads_lines_verbatim_with_terminators() {
        let dir = tempdir().expect("temp dir");
        let path = write_file(&dir, "song.txt", "Hello\nWorld\n");

        let sheet = LyricSheet::load(&path).expect("load");
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.line(0).unwrap().text, "Hello\n");
        assert_eq!(sheet.line(1).unwrap().text, "World\n");
    }

    #[test]
    fn last_line_without_terminator_is_kept() {
        let dir = tempdir().expect("temp dir");
        let path = write_file(&dir, "song.txt", "one\ntwo");

        let sheet = LyricSheet::load(&path).expect("load");
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.line(1).unwrap().text, "two");
    }

    #[test]
    fn blank_lines_and_indentation_survive() {
        let dir = tempdir().expect("temp dir");
        let path = write_file(&dir, "song.txt", "  lead-in\n\n  chorus  \n");

        let sheet = LyricSheet::load(&path).expect("load");
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.line(0).unwrap().text, "  lead-in\n");
        assert_eq!(sheet.line(1).unwrap().text, "\n");
        assert_eq!(sheet.line(2).unwrap().text, "  chorus  \n");
    }

    /// An empty file loads successfully as an empty sheet; only the Err path
    /// means "load failed".
    #[test]
    fn empty_file_is_ok_and_empty() {
        let dir = tempdir().expect("temp dir");
        let path = write_file(&dir, "empty.txt", "");

        let sheet = LyricSheet::load(&path).expect("load");
        assert!(sheet.is_empty());
    }

    #[test]
    fn missing_file_returns_open_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("missing.txt");

        let err = LyricSheet::load(&path).unwrap_err();
        assert!(matches!(err, LyricsError::Open { .. }));
    }

    #[test]
    fn line_past_end_is_none() {
        let sheet = LyricSheet::from_lines(["a\n"]);
        assert!(sheet.line(0).is_some());
        assert!(sheet.line(1).is_none());
    }
}
