//! Audio playback — source selection plus the local rodio player.
//!
//! ```text
//! "file"    → Selected::LocalFile(path) → AudioPlayer (dedicated thread)
//! "youtube" → Selected::External(url)   → default browser, no control
//! ```

pub mod player;
pub mod source;

pub use player::{AudioPlayer, PlayerError, PlayerEvent};
pub use source::{open_external, Selected, SourceError, SourceKind};
