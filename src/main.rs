//! Application entry point — Singalong.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers) for the voice
//!    probe's capture + recognition task.
//! 4. Build the speech recognizer ([`HttpRecognizer`]) from config.
//! 5. Start the local audio player thread (degrade gracefully when no
//!    output device is present).
//! 6. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use singalong::{
    app::SingalongApp,
    audio::AudioPlayer,
    config::AppConfig,
    voice::{HttpRecognizer, SpeechRecognizer},
};

use eframe::egui;

fn native_options() -> eframe::NativeOptions {
    let vp = egui::ViewportBuilder::default()
        .with_inner_size([440.0, 360.0])
        .with_min_inner_size([360.0, 300.0]);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Singalong starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 workers — capture and recognition each take one)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Speech recognizer
    let recognizer: Arc<dyn SpeechRecognizer> =
        Arc::new(HttpRecognizer::from_config(&config.recognizer));

    // 5. Local audio player — the app still launches without an output
    //    device; only browser playback is available then.
    let player = match AudioPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            log::warn!("Local playback unavailable: {e}");
            None
        }
    };

    // 6. Build the egui app and run it (blocks until the window is closed)
    let app = SingalongApp::new(&config, player, recognizer, rt.handle().clone());

    eframe::run_native(
        "Karaoke Machine",
        native_options(),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
