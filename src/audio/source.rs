//! Audio source selection.
//!
//! The user picks a playback source by entering a literal kind string:
//! `"file"` resolves to a local media file played in-process, `"youtube"`
//! hands a URL to the system's default browser. Anything else is a
//! validation error and changes nothing.
//!
//! The external variant is a deliberate scope boundary: once the browser has
//! the URL the application has no further control, so play/stop/position are
//! no-ops for it.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// SourceError
// ---------------------------------------------------------------------------

/// Errors from source selection and the browser hand-off.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The selection string was neither `"file"` nor `"youtube"`.
    #[error("invalid audio source '{0}' — enter 'file' or 'youtube'")]
    InvalidKind(String),

    /// The default browser could not be launched.
    #[error("failed to open browser: {0}")]
    Browser(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Which resolution path the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Local media file played through the in-process audio player.
    LocalFile,
    /// YouTube link delegated to the default browser.
    YouTube,
}

impl SourceKind {
    /// Parse the user's selection string.
    ///
    /// # Errors
    ///
    /// [`SourceError::InvalidKind`] for any literal other than `"file"` or
    /// `"youtube"`; the caller surfaces it and keeps its current source.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        match input {
            "file" => Ok(SourceKind::LocalFile),
            "youtube" => Ok(SourceKind::YouTube),
            other => Err(SourceError::InvalidKind(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Selected
// ---------------------------------------------------------------------------

/// A resolved audio source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected {
    /// Path to a local media file; position is queryable and settable.
    LocalFile(PathBuf),
    /// URL already handed to the browser; no further control.
    External(String),
}

impl Selected {
    /// `true` for the local-file variant (the only one with a position).
    pub fn is_local(&self) -> bool {
        matches!(self, Selected::LocalFile(_))
    }

    /// Short description for the status line.
    pub fn describe(&self) -> String {
        match self {
            Selected::LocalFile(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("file: {name}")
            }
            Selected::External(url) => format!("browser: {url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Browser hand-off
// ---------------------------------------------------------------------------

/// Open `url` in the system's default browser.
///
/// There is no return channel; success only means the launcher accepted the
/// URL.
pub fn open_external(url: &str) -> Result<(), SourceError> {
    open::that(url)?;
    log::info!("handed off to browser: {url}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_file() {
        assert_eq!(SourceKind::parse("file").unwrap(), SourceKind::LocalFile);
    }

    #[test]
    fn parse_youtube() {
        assert_eq!(SourceKind::parse("youtube").unwrap(), SourceKind::YouTube);
    }

    #[test]
    fn parse_rejects_other_literals() {
        for input in ["File", "YOUTUBE", "radio", "", " file"] {
            let err = SourceKind::parse(input).unwrap_err();
            match err {
                SourceError::InvalidKind(s) => assert_eq!(s, input),
                other => panic!("expected InvalidKind, got {other:?}"),
            }
        }
    }

    #[test]
    fn only_local_files_have_a_position() {
        assert!(Selected::LocalFile(PathBuf::from("/tmp/song.mp3")).is_local());
        assert!(!Selected::External("https://youtube.com/watch?v=x".into()).is_local());
    }

    #[test]
    fn describe_uses_file_name() {
        let sel = Selected::LocalFile(PathBuf::from("/music/track01.ogg"));
        assert_eq!(sel.describe(), "file: track01.ogg");
    }

    #[test]
    fn describe_external_shows_url() {
        let sel = Selected::External("https://youtu.be/abc".into());
        assert_eq!(sel.describe(), "browser: https://youtu.be/abc");
    }
}
