//! Voice probe — one bounded microphone capture per session, classified by
//! a cloud recognition service.
//!
//! # Pipeline
//!
//! ```text
//! MicCapture::record (cpal, blocking)
//!        → downmix_to_mono → resample to 16 kHz
//!        → extract_voiced_span (ambient-calibrated RMS frames)
//!        → SpeechRecognizer::recognize (reqwest)
//!        → ProbeOutcome → notification on the UI
//! ```
//!
//! The probe runs as a single fire-and-forget tokio task; its outcome is
//! delivered back over a channel and never mutates session state.

pub mod capture;
pub mod probe;
pub mod recognize;
pub mod signal;

pub use capture::{CaptureError, MicCapture};
pub use probe::{ProbeOutcome, VoiceProbe};
pub use recognize::{HttpRecognizer, RecognizeError, SpeechRecognizer};
pub use signal::{downmix_to_mono, pcm16_bytes, resample, RECOGNITION_RATE};
