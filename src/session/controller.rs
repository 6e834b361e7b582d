//! Session controller — the lyric-advance loop and its state.
//!
//! [`SessionController`] owns the current line index, the running flag, and
//! the single-shot advance deadline. All mutation happens on the UI event
//! loop: the egui frame calls [`tick`](SessionController::tick) with the
//! current instant, and the controller fires at most one advance per due
//! deadline. Between deadlines the controller holds no timer resource at
//! all — the deadline is plain data, so cancelling (stop, lyrics reload) is
//! simply clearing it, and a stale wake-up can never mutate fresh state.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::lyrics::LyricSheet;

use super::state::SessionPhase;

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Precondition failures when starting a session.
///
/// Both leave the controller's prior state completely unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no lyrics loaded — load a lyrics file first")]
    NoLyrics,

    #[error("no audio source selected — choose a file or YouTube link first")]
    NoAudio,
}

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

/// Outcome of a due advance deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The index moved to `0-based line`; that line should be rendered now.
    Line(usize),
    /// The index reached the line count; the loop exited.
    Finished,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives the line-by-line lyric display.
///
/// Invariant: while running, `current_line <= sheet.len()`;
/// `current_line == sheet.len()` is the terminal display state (no line
/// shown) and the advance deadline is disarmed there.
#[derive(Debug)]
pub struct SessionController {
    sheet: LyricSheet,
    current_line: usize,
    running: bool,
    line_delay: Duration,
    /// Armed single-shot deadline for the next advance. `None` = no pending
    /// wake-up; clearing this is the cancellation mechanism.
    next_advance: Option<Instant>,
}

impl SessionController {
    /// Controller with no lyrics loaded and the given per-line delay.
    pub fn new(line_delay: Duration) -> Self {
        Self {
            sheet: LyricSheet::empty(),
            current_line: 0,
            running: false,
            line_delay,
            next_advance: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// 0-based index of the line currently displayed.
    pub fn current_line(&self) -> usize {
        self.current_line
    }

    /// Number of lines in the loaded sheet.
    pub fn line_count(&self) -> usize {
        self.sheet.len()
    }

    /// Verbatim text of the current line, or `None` in the terminal state
    /// (or when the index was restored past the sheet).
    pub fn current_text(&self) -> Option<&str> {
        self.sheet.line(self.current_line).map(|l| l.text.as_str())
    }

    /// `true` while a session is in progress (including the terminal
    /// display state).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `true` when at least one lyric line is loaded.
    pub fn has_lyrics(&self) -> bool {
        !self.sheet.is_empty()
    }

    /// The armed advance deadline, if any. The UI uses this to schedule its
    /// next repaint; it must never act on it directly.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_advance
    }

    /// Current phase for display purposes.
    pub fn phase(&self) -> SessionPhase {
        if !self.running {
            SessionPhase::Idle
        } else if self.current_line >= self.sheet.len() {
            SessionPhase::Finished
        } else {
            SessionPhase::Running
        }
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Install a freshly loaded sheet.
    ///
    /// Always resets the index to 0, stops any running session, and cancels
    /// a pending advance so the old deadline cannot fire against new lines.
    pub fn replace_lyrics(&mut self, sheet: LyricSheet) {
        self.sheet = sheet;
        self.current_line = 0;
        self.running = false;
        self.next_advance = None;
    }

    /// Start (or restart) the session at line 0.
    ///
    /// `audio_ready` reports whether an audio source has been resolved; the
    /// caller starts actual playback and dispatches the voice probe after
    /// this returns `Ok`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoLyrics`] / [`SessionError::NoAudio`] when a
    /// precondition is missing; prior state is left unchanged.
    pub fn start(&mut self, now: Instant, audio_ready: bool) -> Result<(), SessionError> {
        if self.sheet.is_empty() {
            return Err(SessionError::NoLyrics);
        }
        if !audio_ready {
            return Err(SessionError::NoAudio);
        }

        // Restart discards any pending deadline before arming a new one, so
        // two start presses never leave two live wake-ups.
        self.current_line = 0;
        self.running = true;
        self.next_advance = Some(now + self.line_delay);
        log::info!("session started: {} lines", self.sheet.len());
        Ok(())
    }

    /// Stop the session and cancel any pending advance.
    ///
    /// The index is left where it was so a later save captures it.
    pub fn stop(&mut self) {
        self.running = false;
        self.next_advance = None;
    }

    /// Restore a previously saved line index.
    ///
    /// Never arms the timer and never sets `running`: after a restore the
    /// session stays idle until [`start`](Self::start) is called again.
    pub fn restore_line(&mut self, index: usize) {
        self.current_line = index;
        self.running = false;
        self.next_advance = None;
    }

    /// Advance the loop if the armed deadline is due.
    ///
    /// Fires at most one advance per call. Re-arms at `deadline + delay`
    /// (not `now + delay`) so frame jitter does not drift the cadence; at
    /// the terminal index it disarms and reports [`Advance::Finished`] once.
    pub fn tick(&mut self, now: Instant) -> Option<Advance> {
        let due = self.next_advance?;
        if !self.running || now < due {
            return None;
        }

        self.current_line += 1;
        if self.current_line < self.sheet.len() {
            self.next_advance = Some(due + self.line_delay);
            Some(Advance::Line(self.current_line))
        } else {
            self.next_advance = None;
            Some(Advance::Finished)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
