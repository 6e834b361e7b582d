//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings for the lyric-advance session loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Milliseconds each lyric line stays on screen before the next one.
    pub line_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            line_delay_ms: 2_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioSettings
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Audio input device name. `None` means the system default.
    pub input_device: Option<String>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { input_device: None }
    }
}

// ---------------------------------------------------------------------------
// RecognizerConfig
// ---------------------------------------------------------------------------

/// Settings for the cloud speech-recognition call made once per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Base URL of the recognition endpoint.
    pub base_url: String,
    /// API key appended to the request. `None` disables authentication,
    /// which only works against local test servers.
    pub api_key: Option<String>,
    /// BCP-47 language code sent with each request (e.g. `"en-US"`).
    pub language: String,
    /// Maximum seconds to wait for a recognition response.
    pub timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://speech.googleapis.com".into(),
            api_key: None,
            language: "en-US".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use singalong::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lyric session loop settings.
    pub session: SessionConfig,
    /// Microphone capture settings.
    pub audio: AudioSettings,
    /// Speech-recognition service settings.
    pub recognizer: RecognizerConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A default `AppConfig` must survive a TOML round trip unchanged.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.session.line_delay_ms, loaded.session.line_delay_ms);
        assert_eq!(original.audio.input_device, loaded.audio.input_device);
        assert_eq!(original.recognizer.base_url, loaded.recognizer.base_url);
        assert_eq!(original.recognizer.api_key, loaded.recognizer.api_key);
        assert_eq!(original.recognizer.language, loaded.recognizer.language);
        assert_eq!(
            original.recognizer.timeout_secs,
            loaded.recognizer.timeout_secs
        );
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.session.line_delay_ms, default.session.line_delay_ms);
        assert_eq!(config.recognizer.base_url, default.recognizer.base_url);
        assert_eq!(config.recognizer.language, default.recognizer.language);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.session.line_delay_ms, 2_000);
        assert!(cfg.audio.input_device.is_none());
        assert_eq!(cfg.recognizer.base_url, "https://speech.googleapis.com");
        assert!(cfg.recognizer.api_key.is_none());
        assert_eq!(cfg.recognizer.language, "en-US");
        assert_eq!(cfg.recognizer.timeout_secs, 10);
    }

    /// Modified non-default values must survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.session.line_delay_ms = 1_500;
        cfg.audio.input_device = Some("USB Microphone".into());
        cfg.recognizer.base_url = "http://localhost:8085".into();
        cfg.recognizer.api_key = Some("test-key".into());
        cfg.recognizer.language = "de-DE".into();
        cfg.recognizer.timeout_secs = 30;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.session.line_delay_ms, 1_500);
        assert_eq!(loaded.audio.input_device.as_deref(), Some("USB Microphone"));
        assert_eq!(loaded.recognizer.base_url, "http://localhost:8085");
        assert_eq!(loaded.recognizer.api_key.as_deref(), Some("test-key"));
        assert_eq!(loaded.recognizer.language, "de-DE");
        assert_eq!(loaded.recognizer.timeout_secs, 30);
    }
}
