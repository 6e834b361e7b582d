//! Signal conditioning for captured microphone audio.
//!
//! The recognition service wants 16 kHz mono LINEAR16; the microphone
//! delivers whatever the device's native config is. This module provides the
//! conversion steps: channel downmix, linear-interpolation resampling, and
//! the f32 → 16-bit PCM byte encoding sent over the wire.

/// Sample rate the recognition request is encoded at.
pub const RECOGNITION_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging each frame.
///
/// Already-mono input is returned as an owned copy; `channels == 0` yields
/// an empty vector.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample
// ---------------------------------------------------------------------------

/// Resample mono audio from `source_rate` to `target_rate` Hz using linear
/// interpolation.
///
/// A matching source rate is a no-op copy. The output length is
/// `samples.len() * target_rate / source_rate`, rounded up.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// pcm16_bytes
// ---------------------------------------------------------------------------

/// Encode `f32` samples in `[-1.0, 1.0]` as little-endian 16-bit PCM bytes
/// (the LINEAR16 wire encoding). Out-of-range samples are clamped.
pub fn pcm16_bytes(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
