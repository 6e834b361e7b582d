//! Session state machine types.
//!
//! [`SessionPhase`] is the externally visible state of the lyric session:
//!
//! ```text
//! Idle ──start──▶ Running ──last line shown──▶ Finished
//!   ▲               │                             │
//!   └──stop / lyrics reload──────────────────────┘
//! ```
//!
//! `Finished` is the terminal display state: the line index has reached the
//! line count, no line is shown, and the advance deadline is disarmed, but
//! the session still counts as running until explicitly stopped.

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Externally visible phase of the lyric session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session in progress; waiting for the user to start.
    Idle,

    /// Lines are advancing on the configured delay.
    Running,

    /// The index reached the line count; the loop exited silently.
    Finished,
}

impl SessionPhase {
    /// A short human-readable label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Running => "Singing",
            SessionPhase::Finished => "Song finished",
        }
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
