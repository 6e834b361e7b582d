//! The voice probe — one bounded capture-and-classify per session.
//!
//! When a session starts, exactly one [`VoiceProbe::run`] task is spawned,
//! fire-and-forget. It records a fixed window of microphone audio
//! (1 s ambient-noise calibration followed by a 5 s listen window), looks
//! for a voiced span above the calibrated threshold, submits that span to
//! the cloud recognizer, and reports a coarse [`ProbeOutcome`]. The outcome
//! feeds a user-facing notification only; it never touches session state
//! and is never retried.

use std::sync::Arc;
use std::time::Duration;

use crate::voice::capture::{CaptureError, MicCapture};
use crate::voice::recognize::SpeechRecognizer;
use crate::voice::signal::{downmix_to_mono, resample, RECOGNITION_RATE};

/// Ambient-noise calibration window at the start of every capture.
const CALIBRATION_WINDOW: Duration = Duration::from_secs(1);
/// Listen window after calibration; speech must appear within it.
const LISTEN_WINDOW: Duration = Duration::from_secs(5);

/// Analysis frame length: 30 ms at the recognition rate.
const FRAME_SIZE: usize = 480;
/// A frame counts as voiced when its RMS exceeds the ambient RMS by this
/// factor.
const AMBIENT_RATIO: f32 = 1.5;
/// Lower bound on the voiced threshold so a dead-silent room does not turn
/// the faintest noise into "speech".
const THRESHOLD_FLOOR: f32 = 0.01;

// ---------------------------------------------------------------------------
// ProbeOutcome
// ---------------------------------------------------------------------------

/// Coarse result of the one-shot probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The service transcribed the captured audio.
    Recognized(String),
    /// Voiced audio was captured but the service found no recognizable
    /// speech in it.
    NoSpeech,
    /// Nothing crossed the ambient threshold during the listen window.
    TimedOut,
    /// Capture or the recognition call failed.
    ServiceError(String),
}

impl ProbeOutcome {
    /// The encouragement / advice line shown to the user.
    pub fn notification(&self) -> String {
        match self {
            ProbeOutcome::Recognized(_) => "Nice, keep it on!".into(),
            ProbeOutcome::NoSpeech => "No speech detected. Try again.".into(),
            ProbeOutcome::TimedOut => "Listening timed out, please try again.".into(),
            ProbeOutcome::ServiceError(msg) => format!("Speech recognition error: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceProbe
// ---------------------------------------------------------------------------

/// One-shot microphone probe. Cheap to clone; a fresh clone is consumed by
/// each session's background task.
#[derive(Clone)]
pub struct VoiceProbe {
    recognizer: Arc<dyn SpeechRecognizer>,
    input_device: Option<String>,
}

impl VoiceProbe {
    /// Probe using `recognizer` and the named input device (`None` for the
    /// system default).
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, input_device: Option<String>) -> Self {
        Self {
            recognizer,
            input_device,
        }
    }

    /// Capture, analyse, and classify once.
    ///
    /// Infallible by design: every failure mode collapses into a
    /// [`ProbeOutcome`] so the caller only ever shows a notification.
    pub async fn run(&self) -> ProbeOutcome {
        log::info!("listening for voice input");

        let device = self.input_device.clone();
        let captured =
            tokio::task::spawn_blocking(move || capture_clip(device.as_deref())).await;

        let clip = match captured {
            Ok(Ok(clip)) => clip,
            Ok(Err(e)) => return ProbeOutcome::ServiceError(e.to_string()),
            Err(e) => return ProbeOutcome::ServiceError(format!("capture task failed: {e}")),
        };

        let voiced = extract_voiced_span(&clip);
        classify(self.recognizer.as_ref(), voiced.as_deref()).await
    }
}

// ---------------------------------------------------------------------------
// Capture & analysis helpers
// ---------------------------------------------------------------------------

/// Record the full calibration + listen window and condition it to
/// [`RECOGNITION_RATE`] mono.
fn capture_clip(device: Option<&str>) -> Result<Vec<f32>, CaptureError> {
    let mic = MicCapture::new(device)?;
    let raw = mic.record(CALIBRATION_WINDOW + LISTEN_WINDOW)?;
    let mono = downmix_to_mono(&raw, mic.channels());
    Ok(resample(&mono, mic.sample_rate(), RECOGNITION_RATE))
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}

/// Find the voiced span in a conditioned clip.
///
/// The first [`CALIBRATION_WINDOW`] worth of samples establishes the
/// ambient RMS; the remainder is scanned in 30 ms frames. Returns the span
/// from the first through the last voiced frame, or `None` when nothing in
/// the listen window crossed the threshold (the probe's timeout condition).
pub(crate) fn extract_voiced_span(clip: &[f32]) -> Option<Vec<f32>> {
    let calibration_len = (CALIBRATION_WINDOW.as_secs() as usize) * RECOGNITION_RATE as usize;
    if clip.len() <= calibration_len {
        return None;
    }

    let ambient = rms(&clip[..calibration_len]);
    let threshold = (ambient * AMBIENT_RATIO).max(THRESHOLD_FLOOR);
    log::debug!("ambient rms {ambient:.4}, voiced threshold {threshold:.4}");

    let listen = &clip[calibration_len..];
    let total_frames = listen.len().div_ceil(FRAME_SIZE);

    let frame = |i: usize| {
        let s = i * FRAME_SIZE;
        let e = ((i + 1) * FRAME_SIZE).min(listen.len());
        &listen[s..e]
    };

    let start_frame = (0..total_frames).find(|&i| rms(frame(i)) > threshold)?;
    let end_frame = (0..total_frames)
        .rfind(|&i| rms(frame(i)) > threshold)
        .unwrap_or(start_frame);

    let start = start_frame * FRAME_SIZE;
    let end = ((end_frame + 1) * FRAME_SIZE).min(listen.len());
    Some(listen[start..end].to_vec())
}

/// Map the voiced span (or its absence) through the recognizer into an
/// outcome.
pub(crate) async fn classify(
    recognizer: &dyn SpeechRecognizer,
    voiced: Option<&[f32]>,
) -> ProbeOutcome {
    let Some(voiced) = voiced else {
        log::info!("probe heard nothing above the ambient threshold");
        return ProbeOutcome::TimedOut;
    };

    match recognizer.recognize(voiced, RECOGNITION_RATE).await {
        Ok(Some(text)) => {
            log::info!("recognized: {text:?}");
            ProbeOutcome::Recognized(text)
        }
        Ok(None) => ProbeOutcome::NoSpeech,
        Err(e) => ProbeOutcome::ServiceError(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::recognize::{MockRecognizer, RecognizeError};

    const CAL: usize = RECOGNITION_RATE as usize; // 1 s calibration in samples

    /// quiet calibration + listen window with a voiced burst at `at..at+len`
    fn clip_with_burst(ambient: f32, at: usize, len: usize) -> Vec<f32> {
        let listen_len = 5 * RECOGNITION_RATE as usize;
        let mut clip = vec![ambient; CAL + listen_len];
        for s in clip[CAL + at..CAL + at + len].iter_mut() {
            *s = 0.5;
        }
        clip
    }

    // ---- rms ---------------------------------------------------------------

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&vec![0.0_f32; 480]), 0.0);
    }

    #[test]
    fn rms_of_constant_signal() {
        assert!((rms(&vec![0.5_f32; 480]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rms_of_empty_is_zero() {
        assert_eq!(rms(&[]), 0.0);
    }

    // ---- extract_voiced_span ----------------------------------------------

    #[test]
    fn silent_clip_has_no_voiced_span() {
        let clip = vec![0.0_f32; CAL + 5 * CAL];
        assert!(extract_voiced_span(&clip).is_none());
    }

    #[test]
    fn burst_is_found_and_trimmed() {
        // 1 s of voice starting 2 s into the listen window
        let clip = clip_with_burst(0.001, 2 * CAL, CAL);
        let span = extract_voiced_span(&clip).expect("voiced span");

        // Frame-aligned trim: within one frame of the burst length.
        assert!(span.len() >= CAL);
        assert!(span.len() <= CAL + 2 * FRAME_SIZE);
        assert!(span.iter().all(|&s| s > 0.4 || s < 0.01));
    }

    #[test]
    fn burst_at_window_start_is_found() {
        let clip = clip_with_burst(0.001, 0, FRAME_SIZE * 4);
        let span = extract_voiced_span(&clip).expect("voiced span");
        assert!(span.len() >= FRAME_SIZE * 4);
    }

    /// Loud ambient noise raises the threshold: a signal that would count
    /// as voice in a quiet room is masked.
    #[test]
    fn ambient_noise_scales_the_threshold() {
        let listen_len = 5 * CAL;
        let mut clip = vec![0.2_f32; CAL + listen_len];
        // "Voice" only barely above the ambient level
        for s in clip[CAL..CAL + FRAME_SIZE].iter_mut() {
            *s = 0.25;
        }
        assert!(extract_voiced_span(&clip).is_none());
    }

    #[test]
    fn clip_shorter_than_calibration_yields_none() {
        assert!(extract_voiced_span(&vec![0.5_f32; CAL / 2]).is_none());
        assert!(extract_voiced_span(&[]).is_none());
    }

    // ---- classify ----------------------------------------------------------

    #[tokio::test]
    async fn no_span_classifies_as_timed_out() {
        let mock = MockRecognizer::transcript("never called");
        assert_eq!(classify(&mock, None).await, ProbeOutcome::TimedOut);
    }

    #[tokio::test]
    async fn transcript_classifies_as_recognized() {
        let mock = MockRecognizer::transcript("la la la");
        let span = vec![0.5_f32; 480];
        let out = classify(&mock, Some(span.as_slice())).await;
        assert_eq!(out, ProbeOutcome::Recognized("la la la".into()));
    }

    #[tokio::test]
    async fn empty_service_result_classifies_as_no_speech() {
        let mock = MockRecognizer::no_speech();
        let span = vec![0.5_f32; 480];
        let out = classify(&mock, Some(span.as_slice())).await;
        assert_eq!(out, ProbeOutcome::NoSpeech);
    }

    #[tokio::test]
    async fn service_failure_classifies_as_service_error() {
        let mock = MockRecognizer::err(RecognizeError::Service("HTTP 500: boom".into()));
        let span = vec![0.5_f32; 480];
        let out = classify(&mock, Some(span.as_slice())).await;
        match out {
            ProbeOutcome::ServiceError(msg) => assert!(msg.contains("HTTP 500")),
            other => panic!("expected ServiceError, got {other:?}"),
        }
    }

    // ---- notifications -----------------------------------------------------

    #[test]
    fn notifications_match_outcomes() {
        assert_eq!(
            ProbeOutcome::Recognized("x".into()).notification(),
            "Nice, keep it on!"
        );
        assert_eq!(
            ProbeOutcome::NoSpeech.notification(),
            "No speech detected. Try again."
        );
        assert_eq!(
            ProbeOutcome::TimedOut.notification(),
            "Listening timed out, please try again."
        );
        assert!(ProbeOutcome::ServiceError("offline".into())
            .notification()
            .contains("offline"));
    }
}
