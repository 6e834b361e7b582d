//! Singalong — a desktop karaoke helper.
//!
//! Displays lyrics line-by-line in time with locally loaded audio or a
//! YouTube link, samples the microphone once per session for an
//! encouragement notification, and can save/restore a playback-position
//! snapshot.
//!
//! # Architecture
//!
//! The library is organized into small, single-purpose modules:
//!
//! - `config`  - settings structs, TOML persistence, platform paths
//! - `lyrics`  - verbatim lyric-sheet loading
//! - `session` - the lyric-advance state machine (the only stateful core)
//! - `audio`   - source selection, local rodio playback, browser hand-off
//! - `voice`   - one-shot microphone probe + cloud speech recognition
//! - `store`   - the flat JSON position snapshot
//! - `app`     - the egui window tying it all together
//!
//! All session state lives in [`session::SessionController`] and is mutated
//! only on the UI event loop; the single background task (the voice probe)
//! reports back over a channel and never touches shared state.

pub mod app;
pub mod audio;
pub mod config;
pub mod lyrics;
pub mod session;
pub mod store;
pub mod voice;
