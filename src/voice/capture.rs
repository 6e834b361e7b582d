//! One-shot microphone capture via `cpal`.
//!
//! [`MicCapture`] wraps the cpal host/device/stream lifecycle for the voice
//! probe. Unlike a streaming recorder it only ever performs one bounded
//! [`record`](MicCapture::record): the stream is built, samples accumulate
//! over an mpsc channel until the requested duration is filled, and the
//! stream is dropped again.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

/// Extra wall-clock allowance past the requested duration before a record
/// gives up waiting for the hardware.
const RECORD_GRACE: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running the capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// MicCapture
// ---------------------------------------------------------------------------

/// Microphone wrapper for a single bounded recording.
pub struct MicCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    /// Native sample rate reported by the device (Hz).
    sample_rate: u32,
    /// Number of interleaved channels reported by the device.
    channels: u16,
}

impl MicCapture {
    /// Open the named input device, or the system default when `name` is
    /// `None` or not found.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoDevice`] when no input device exists at all, or
    /// [`CaptureError::DefaultConfig`] when the device cannot report a
    /// stream configuration.
    pub fn new(name: Option<&str>) -> Result<Self, CaptureError> {
        let host = cpal::default_host();

        let device = match name {
            Some(wanted) => {
                let found = host
                    .input_devices()
                    .ok()
                    .and_then(|mut devices| {
                        devices.find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                    });
                match found {
                    Some(d) => d,
                    None => {
                        log::warn!("input device '{wanted}' not found, using default");
                        host.default_input_device().ok_or(CaptureError::NoDevice)?
                    }
                }
            }
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
        };

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Record `duration` of audio, blocking the calling thread.
    ///
    /// The cpal callback runs on its own audio thread and forwards raw `f32`
    /// buffers over a channel; this method accumulates them until the
    /// requested sample count is reached (or the duration plus a grace
    /// period elapses, whichever comes first). The returned samples are
    /// interleaved at the device's native rate and channel count.
    pub fn record(&self, duration: Duration) -> Result<Vec<f32>, CaptureError> {
        let (tx, rx) = mpsc::channel::<Vec<f32>>();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Ignore send errors; the receiver is dropped once enough
                // audio has arrived.
                let _ = tx.send(data.to_vec());
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;
        stream.play()?;

        let needed =
            (duration.as_secs_f64() * self.sample_rate as f64) as usize * self.channels as usize;
        let deadline = Instant::now() + duration + RECORD_GRACE;

        let mut samples = Vec::with_capacity(needed);
        while samples.len() < needed {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => samples.extend_from_slice(&chunk),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if Instant::now() >= deadline {
                        log::warn!(
                            "capture ended short: {} of {} samples",
                            samples.len(),
                            needed
                        );
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        drop(stream);
        samples.truncate(needed);
        Ok(samples)
    }

    /// Native sample rate of the device in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels in the recorded buffer.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Opening a nonsense device name must fall back to the default rather
    /// than erroring, as long as any input device exists.
    #[test]
    fn unknown_device_name_falls_back_to_default() {
        match MicCapture::new(Some("definitely-not-a-real-device")) {
            Ok(mic) => {
                assert!(mic.sample_rate() > 0);
                assert!(mic.channels() > 0);
            }
            // Headless CI has no input device at all; that path is NoDevice.
            Err(CaptureError::NoDevice) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn capture_error_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CaptureError>();
    }
}
