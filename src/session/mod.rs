//! Session module — the only stateful core of the application.
//!
//! [`SessionController`] drives the line-by-line lyric display:
//!
//! ```text
//! start(now)              — precondition checks, index = 0, arm deadline
//!   │
//!   ▼
//! tick(now) each frame    — fire due deadline: index += 1, re-arm
//!   │                       (disarm at the terminal index)
//!   ▼
//! stop() / replace_lyrics — cancel = clear the armed deadline
//! ```
//!
//! The controller is pure state plus instants; it owns no thread and no OS
//! timer, which is what makes cancellation race-free on the single UI loop.

pub mod controller;
pub mod state;

pub use controller::{Advance, SessionController, SessionError};
pub use state::SessionPhase;
