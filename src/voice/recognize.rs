//! Cloud speech-recognition client.
//!
//! [`SpeechRecognizer`] is the seam the probe talks through; the production
//! implementation [`HttpRecognizer`] POSTs one LINEAR16 clip to a
//! Google-style `speech:recognize` REST endpoint. All connection details
//! come from [`RecognizerConfig`]; nothing is hardcoded and nothing is
//! retried.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::config::RecognizerConfig;
use crate::voice::signal::pcm16_bytes;

// ---------------------------------------------------------------------------
// RecognizeError
// ---------------------------------------------------------------------------

/// Errors that can occur during a recognition call.
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// HTTP transport or connection error.
    #[error("recognition request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("recognition request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse recognition response: {0}")]
    Parse(String),

    /// The service answered with a non-success status.
    #[error("recognition service error: {0}")]
    Service(String),
}

impl From<reqwest::Error> for RecognizeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RecognizeError::Timeout
        } else {
            RecognizeError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Async seam for speech recognition.
///
/// Implementors must be `Send + Sync` so they can sit behind an
/// `Arc<dyn SpeechRecognizer>` shared with the probe task.
///
/// `Ok(Some(text))` is a transcript, `Ok(None)` means the service found no
/// recognizable speech in the clip; everything else is an error.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Submit one mono `f32` clip at `sample_rate` Hz for recognition.
    async fn recognize(
        &self,
        audio: &[f32],
        sample_rate: u32,
    ) -> Result<Option<String>, RecognizeError>;
}

// Compile-time assertion: Box<dyn SpeechRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

// ---------------------------------------------------------------------------
// HttpRecognizer
// ---------------------------------------------------------------------------

/// Calls a Google-style `POST {base_url}/v1/speech:recognize` endpoint.
///
/// Request body:
/// `{config: {encoding, sampleRateHertz, languageCode}, audio: {content}}`
/// with the clip as base64 LINEAR16. The API key, when configured, travels
/// as the `key` query parameter.
pub struct HttpRecognizer {
    client: reqwest::Client,
    config: RecognizerConfig,
}

impl HttpRecognizer {
    /// Build an `HttpRecognizer` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`; a default client is the last-resort fallback
    /// if the builder fails.
    pub fn from_config(config: &RecognizerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for HttpRecognizer {
    async fn recognize(
        &self,
        audio: &[f32],
        sample_rate: u32,
    ) -> Result<Option<String>, RecognizeError> {
        let url = format!("{}/v1/speech:recognize", self.config.base_url);

        let body = serde_json::json!({
            "config": {
                "encoding":        "LINEAR16",
                "sampleRateHertz": sample_rate,
                "languageCode":    self.config.language,
            },
            "audio": {
                "content": STANDARD.encode(pcm16_bytes(audio)),
            }
        });

        let mut req = self.client.post(&url).json(&body);

        // The key query parameter is attached only when configured, so a
        // local test endpoint needs no authentication.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.query(&[("key", key)]);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RecognizeError::Service(format!("HTTP {status}: {detail}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RecognizeError::Parse(e.to_string()))?;

        // An empty `results` array is the service's "could not understand
        // the audio" answer, not an error.
        let transcript = json["results"][0]["alternatives"][0]["transcript"]
            .as_str()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(transcript)
    }
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double that returns a pre-configured response without any network.
#[cfg(test)]
pub struct MockRecognizer {
    response: Result<Option<String>, RecognizeError>,
}

#[cfg(test)]
impl MockRecognizer {
    /// Mock that always returns a transcript.
    pub fn transcript(text: impl Into<String>) -> Self {
        Self {
            response: Ok(Some(text.into())),
        }
    }

    /// Mock that always reports "no recognizable speech".
    pub fn no_speech() -> Self {
        Self { response: Ok(None) }
    }

    /// Mock that always fails with `error`.
    pub fn err(error: RecognizeError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn recognize(
        &self,
        _audio: &[f32],
        _sample_rate: u32,
    ) -> Result<Option<String>, RecognizeError> {
        match &self.response {
            Ok(t) => Ok(t.clone()),
            Err(RecognizeError::Request(m)) => Err(RecognizeError::Request(m.clone())),
            Err(RecognizeError::Timeout) => Err(RecognizeError::Timeout),
            Err(RecognizeError::Parse(m)) => Err(RecognizeError::Parse(m.clone())),
            Err(RecognizeError::Service(m)) => Err(RecognizeError::Service(m.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> RecognizerConfig {
        RecognizerConfig {
            base_url: "http://localhost:8085".into(),
            api_key: api_key.map(|s| s.to_string()),
            language: "en-US".into(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _ = HttpRecognizer::from_config(&make_config(None));
    }

    #[test]
    fn from_config_accepts_api_key() {
        let _ = HttpRecognizer::from_config(&make_config(Some("test-key")));
    }

    /// Verify that `HttpRecognizer` is usable as `dyn SpeechRecognizer`.
    #[test]
    fn recognizer_is_object_safe() {
        let boxed: Box<dyn SpeechRecognizer> =
            Box::new(HttpRecognizer::from_config(&make_config(None)));
        drop(boxed);
    }

    #[tokio::test]
    async fn mock_transcript_round_trip() {
        let mock = MockRecognizer::transcript("hello world");
        let out = mock.recognize(&[0.0; 160], 16_000).await.unwrap();
        assert_eq!(out.as_deref(), Some("hello world"));
    }

    #[tokio::test]
    async fn mock_no_speech_is_none() {
        let mock = MockRecognizer::no_speech();
        assert!(mock.recognize(&[0.0; 160], 16_000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mock_error_propagates() {
        let mock = MockRecognizer::err(RecognizeError::Timeout);
        let err = mock.recognize(&[0.0; 160], 16_000).await.unwrap_err();
        assert!(matches!(err, RecognizeError::Timeout));
    }
}
