//! Playback-position snapshot persistence.
//!
//! [`StateStore`] writes and reads a single flat JSON object at a fixed
//! path (`karaoke_state.json` in the working directory). There is no schema
//! versioning and no history; saving overwrites any prior content.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default snapshot file name, created next to the executable's working
/// directory.
pub const STATE_FILE: &str = "karaoke_state.json";

// ---------------------------------------------------------------------------
// PersistedState
// ---------------------------------------------------------------------------

/// The only durable record: current lyric line plus audio position.
///
/// Serialised as `{ "current_line": <int>, "audio_position": <int> }`.
/// `audio_position` is milliseconds of local-file playback; it is
/// meaningless for browser-delegated playback and restores as a no-op there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// 0-based lyric line index.
    pub current_line: usize,
    /// Local playback position in milliseconds.
    pub audio_position: u64,
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors that can occur while persisting or restoring a snapshot.
///
/// All variants are recoverable; callers surface them as a notification and
/// leave the current session state untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No snapshot file exists yet.
    #[error("no previous state found at {0}")]
    NotFound(String),

    /// The snapshot file exists but is not valid JSON for the schema.
    #[error("state file is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    /// Any other filesystem failure.
    #[error("state file I/O error: {0}")]
    Io(std::io::Error),
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Reads and writes the [`PersistedState`] snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store backed by [`STATE_FILE`] in the working directory.
    pub fn new() -> Self {
        Self::at(STATE_FILE)
    }

    /// Store backed by an explicit path (useful for tests).
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `state` as the sole content of the backing file, overwriting
    /// any prior snapshot.
    pub fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        std::fs::write(&self.path, json).map_err(StoreError::Io)?;
        log::info!(
            "saved state (line {}, {} ms) to {}",
            state.current_line,
            state.audio_position,
            self.path.display()
        );
        Ok(())
    }

    /// Read the snapshot back.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no snapshot exists,
    /// [`StoreError::Parse`] when the file is not a valid snapshot object,
    /// [`StoreError::Io`] for other read failures.
    pub fn load(&self) -> Result<PersistedState, StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(self.path.display().to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        let state: PersistedState = serde_json::from_str(&content)?;
        Ok(state)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_round_trip_is_exact() {
        let dir = tempdir().expect("temp dir");
        let store = StateStore::at(dir.path().join("state.json"));

        let state = PersistedState {
            current_line: 7,
            audio_position: 15_000,
        };
        store.save(&state).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded, state);
    }

    #[test]
    fn save_overwrites_prior_snapshot() {
        let dir = tempdir().expect("temp dir");
        let store = StateStore::at(dir.path().join("state.json"));

        store
            .save(&PersistedState {
                current_line: 1,
                audio_position: 100,
            })
            .expect("first save");
        store
            .save(&PersistedState {
                current_line: 9,
                audio_position: 42_000,
            })
            .expect("second save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.current_line, 9);
        assert_eq!(loaded.audio_position, 42_000);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().expect("temp dir");
        let store = StateStore::at(dir.path().join("never-written.json"));

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn load_malformed_json_is_parse_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = StateStore::at(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn load_wrong_schema_is_parse_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"current_line": "seven"}"#).expect("write");

        let err = StateStore::at(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    /// Wire format must match the fixed schema exactly.
    #[test]
    fn wire_format_field_names() {
        let json = serde_json::to_value(PersistedState {
            current_line: 3,
            audio_position: 500,
        })
        .expect("to_value");

        assert_eq!(json["current_line"], 3);
        assert_eq!(json["audio_position"], 500);
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
