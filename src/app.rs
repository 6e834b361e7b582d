//! Karaoke window — egui/eframe application.
//!
//! # Architecture
//!
//! [`SingalongApp`] is the top-level [`eframe::App`]. It owns the
//! [`SessionController`] and mutates it only from `update`, which eframe
//! calls on the single UI thread:
//!
//! * every frame it drains the probe-outcome and player-event channels
//!   (non-blocking `try_recv`), ticks the controller, and schedules the
//!   next repaint no later than the armed advance deadline;
//! * user actions (load lyrics, select source, load audio, start, stop,
//!   save/load state) run synchronously in the frame, except the voice
//!   probe, which is spawned fire-and-forget on the tokio runtime.
//!
//! Every error surfaces as a status-line notification; none are fatal and
//! the window always returns to an interactive idle state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::audio::{open_external, AudioPlayer, PlayerEvent, Selected, SourceKind};
use crate::config::AppConfig;
use crate::lyrics::LyricSheet;
use crate::session::{Advance, SessionController};
use crate::store::{PersistedState, StateStore};
use crate::voice::{ProbeOutcome, SpeechRecognizer, VoiceProbe};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Severity of the current notification, mapped to a text colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    fn color(self) -> egui::Color32 {
        match self {
            StatusKind::Info => egui::Color32::from_rgb(160, 160, 160),
            StatusKind::Success => egui::Color32::from_rgb(80, 200, 120),
            StatusKind::Warning => egui::Color32::from_rgb(255, 136, 68),
            StatusKind::Error => egui::Color32::from_rgb(255, 80, 80),
        }
    }
}

// ---------------------------------------------------------------------------
// SingalongApp
// ---------------------------------------------------------------------------

/// eframe application — the karaoke helper window.
pub struct SingalongApp {
    // ── Session core ─────────────────────────────────────────────────────
    controller: SessionController,

    // ── Collaborators ────────────────────────────────────────────────────
    /// Local playback; `None` when no audio output device was available at
    /// startup (browser playback still works).
    player: Option<AudioPlayer>,
    /// The resolved audio source, if any.
    selected: Option<Selected>,
    probe: VoiceProbe,
    store: StateStore,

    // ── Background task plumbing ─────────────────────────────────────────
    rt: tokio::runtime::Handle,
    probe_tx: mpsc::Sender<ProbeOutcome>,
    probe_rx: mpsc::Receiver<ProbeOutcome>,
    /// A probe task has been spawned and its outcome not yet received.
    probe_in_flight: bool,

    // ── UI state ─────────────────────────────────────────────────────────
    /// Literal source-kind entry ("file" or "youtube").
    source_entry: String,
    /// YouTube URL entry, used when the source kind is "youtube".
    url_entry: String,
    status: Option<(StatusKind, String)>,
}

impl SingalongApp {
    /// Build the app from its collaborators.
    pub fn new(
        config: &AppConfig,
        player: Option<AudioPlayer>,
        recognizer: Arc<dyn SpeechRecognizer>,
        rt: tokio::runtime::Handle,
    ) -> Self {
        let (probe_tx, probe_rx) = mpsc::channel::<ProbeOutcome>(4);

        Self {
            controller: SessionController::new(Duration::from_millis(
                config.session.line_delay_ms,
            )),
            player,
            selected: None,
            probe: VoiceProbe::new(recognizer, config.audio.input_device.clone()),
            store: StateStore::new(),
            rt,
            probe_tx,
            probe_rx,
            probe_in_flight: false,
            source_entry: String::new(),
            url_entry: String::new(),
            status: None,
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some((kind, text.into()));
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending probe outcomes (non-blocking).
    fn poll_probe(&mut self) {
        while let Ok(outcome) = self.probe_rx.try_recv() {
            self.probe_in_flight = false;
            let kind = match &outcome {
                ProbeOutcome::Recognized(_) => StatusKind::Success,
                ProbeOutcome::NoSpeech | ProbeOutcome::TimedOut => StatusKind::Warning,
                ProbeOutcome::ServiceError(_) => StatusKind::Error,
            };
            self.set_status(kind, outcome.notification());
        }
    }

    /// Drain all pending player events (non-blocking).
    fn poll_player(&mut self) {
        let mut pending = Vec::new();
        if let Some(ref player) = self.player {
            while let Some(event) = player.try_recv_event() {
                pending.push(event);
            }
        }
        for event in pending {
            match event {
                PlayerEvent::Started(name) => log::info!("playing {name}"),
                PlayerEvent::Error(msg) => self.set_status(StatusKind::Error, msg),
            }
        }
    }

    // ── User actions ─────────────────────────────────────────────────────

    /// LoadLyrics: pick a text file and install it wholesale.
    fn load_lyrics(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text Files", &["txt"])
            .add_filter("All Files", &["*"])
            .pick_file()
        else {
            return;
        };

        match LyricSheet::load(&path) {
            Ok(sheet) => {
                let count = sheet.len();
                self.controller.replace_lyrics(sheet);
                self.set_status(StatusKind::Info, format!("Loaded {count} lyric lines"));
            }
            Err(e) => {
                // A failed load leaves "nothing loaded", not the previous
                // sheet.
                self.controller.replace_lyrics(LyricSheet::empty());
                self.set_status(StatusKind::Error, format!("Error loading file: {e}"));
            }
        }
    }

    /// LoadAudioFile: pick a local media file as the audio source.
    fn load_audio_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Audio Files", &["mp3", "wav", "ogg", "flac"])
            .add_filter("All Files", &["*"])
            .pick_file()
        else {
            return;
        };

        let selected = Selected::LocalFile(path);
        self.set_status(StatusKind::Info, selected.describe());
        self.selected = Some(selected);
    }

    /// SelectAudioSource: dispatch on the literal kind entry.
    fn select_audio_source(&mut self) {
        match SourceKind::parse(self.source_entry.trim()) {
            Ok(SourceKind::LocalFile) => self.load_audio_file(),
            Ok(SourceKind::YouTube) => self.open_youtube_link(),
            Err(e) => {
                // Validation error: surface it, keep the current source.
                self.set_status(StatusKind::Warning, e.to_string());
            }
        }
    }

    /// Hand the entered URL to the default browser and remember the
    /// external source.
    fn open_youtube_link(&mut self) {
        let url = self.url_entry.trim().to_string();
        if url.is_empty() {
            self.set_status(StatusKind::Warning, "Enter a YouTube URL first");
            return;
        }

        match open_external(&url) {
            Ok(()) => {
                let selected = Selected::External(url);
                self.set_status(StatusKind::Info, selected.describe());
                self.selected = Some(selected);
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    /// StartSession: precondition checks, playback, advance loop, probe.
    fn start_session(&mut self) {
        if let Err(e) = self
            .controller
            .start(Instant::now(), self.selected.is_some())
        {
            self.set_status(StatusKind::Warning, e.to_string());
            return;
        }

        // Start playback for the local variant; the external variant is
        // already playing in the browser and offers no control.
        let local_path = match &self.selected {
            Some(Selected::LocalFile(path)) => Some(path.clone()),
            _ => None,
        };
        if let Some(path) = local_path {
            if let Some(ref player) = self.player {
                player.play(path);
            } else {
                self.set_status(
                    StatusKind::Warning,
                    "No audio output available, lyrics only",
                );
            }
        }

        // One fire-and-forget probe per session; its outcome comes back
        // over the channel and only ever drives a notification.
        let probe = self.probe.clone();
        let tx = self.probe_tx.clone();
        self.rt.spawn(async move {
            let outcome = probe.run().await;
            let _ = tx.send(outcome).await;
        });
        self.probe_in_flight = true;
    }

    /// Stop the session and local playback; cancels the pending advance.
    fn stop_session(&mut self) {
        self.controller.stop();
        if let Some(ref player) = self.player {
            player.stop();
        }
        self.set_status(StatusKind::Info, "Stopped");
    }

    /// SaveState: snapshot the line index and local playback position.
    fn save_state(&mut self) {
        let audio_position = self
            .player
            .as_ref()
            .map(|p| p.position_ms())
            .unwrap_or(0);

        let state = PersistedState {
            current_line: self.controller.current_line(),
            audio_position,
        };

        match self.store.save(&state) {
            Ok(()) => self.set_status(StatusKind::Info, "State saved"),
            Err(e) => self.set_status(StatusKind::Error, format!("Error saving state: {e}")),
        }
    }

    /// LoadState: restore the snapshot without starting the advance loop.
    fn load_state(&mut self) {
        match self.store.load() {
            Ok(state) => {
                self.controller.restore_line(state.current_line);
                // Position restore is meaningful for local playback only.
                if let Some(ref player) = self.player {
                    player.seek_ms(state.audio_position);
                }
                self.set_status(
                    StatusKind::Info,
                    format!("Restored line {}", state.current_line),
                );
            }
            Err(e) => self.set_status(StatusKind::Warning, e.to_string()),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// The lyric panel: the current line, highlighted, or the phase label.
    fn draw_lyrics(&self, ui: &mut egui::Ui) {
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), 90.0),
            egui::Sense::hover(),
        );
        ui.painter()
            .rect_filled(rect, egui::CornerRadius::same(4), egui::Color32::from_rgb(20, 20, 20));

        let text = match self.controller.current_text() {
            Some(line) => egui::RichText::new(line.trim_end_matches(['\n', '\r']))
                .size(22.0)
                .color(egui::Color32::BLACK)
                .background_color(egui::Color32::from_rgb(240, 220, 80)),
            None => egui::RichText::new(self.controller.phase().label())
                .size(15.0)
                .color(egui::Color32::from_rgb(120, 120, 120)),
        };
        ui.put(rect, egui::Label::new(text));

        if self.controller.has_lyrics() {
            ui.label(
                egui::RichText::new(format!(
                    "line {} / {}",
                    self.controller
                        .current_line()
                        .min(self.controller.line_count()),
                    self.controller.line_count()
                ))
                .size(11.0)
                .color(egui::Color32::from_rgb(120, 120, 120)),
            );
        }
    }

    /// Source row, URL row, and the action buttons.
    fn draw_actions(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Source:").size(12.0));
            ui.add(
                egui::TextEdit::singleline(&mut self.source_entry)
                    .hint_text("file or youtube")
                    .desired_width(100.0),
            );
            if ui.button("Select Audio Source").clicked() {
                self.select_audio_source();
            }
        });

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("URL:").size(12.0));
            ui.add(
                egui::TextEdit::singleline(&mut self.url_entry)
                    .hint_text("https://youtube.com/watch?v=...")
                    .desired_width(260.0),
            );
        });

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Load Lyrics").clicked() {
                self.load_lyrics();
            }
            if ui.button("Load Audio File").clicked() {
                self.load_audio_file();
            }
            if self.controller.is_running() {
                if ui.button("Stop").clicked() {
                    self.stop_session();
                }
            } else if ui.button("Start Karaoke").clicked() {
                self.start_session();
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Save State").clicked() {
                self.save_state();
            }
            if ui.button("Load State").clicked() {
                self.load_state();
            }
        });
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        if let Some(ref source) = self.selected {
            ui.label(
                egui::RichText::new(source.describe())
                    .size(11.0)
                    .color(egui::Color32::from_rgb(120, 120, 120)),
            );
        }
        if let Some((kind, ref text)) = self.status {
            ui.label(
                egui::RichText::new(text.as_str())
                    .size(12.0)
                    .color(kind.color()),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for SingalongApp {
    /// Called every frame by eframe. Polls channels, ticks the advance
    /// loop, then renders.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_probe();
        self.poll_player();

        // --- Advance loop -------------------------------------------------
        let now = Instant::now();
        if let Some(advance) = self.controller.tick(now) {
            if advance == Advance::Finished {
                log::info!("lyrics finished");
            }
        }

        // --- Schedule the next wake-up ------------------------------------
        // Suspend until the armed advance deadline; while a probe is in
        // flight, poll its channel at a coarse cadence instead.
        if let Some(deadline) = self.controller.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        } else if self.probe_in_flight {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        // --- Render -------------------------------------------------------
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Karaoke Machine");
            ui.add_space(4.0);

            self.draw_lyrics(ui);
            ui.add_space(6.0);
            self.draw_actions(ui);
            ui.separator();
            self.draw_status(ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("karaoke window closing");
    }
}
