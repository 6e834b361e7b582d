//! Local audio playback via `rodio`, on a dedicated thread.
//!
//! The rodio `OutputStream` is not `Send`, so [`AudioPlayer`] spawns one
//! `audio-player` thread that owns the stream and the current `Sink`, and
//! accepts commands over an mpsc channel. Decode failures come back as
//! [`PlayerEvent`]s for the UI to poll; position queries use a per-call
//! reply channel.
//!
//! Each `Play` builds a fresh sink and decoder; `Stop` drops the sink, so a
//! position query while stopped answers 0.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

/// How long a position query waits for the player thread before giving up
/// and answering 0.
const POSITION_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// PlayerError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up the playback thread.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to open audio output: {0}")]
    NoOutput(String),

    #[error("failed to spawn audio-player thread: {0}")]
    Thread(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Commands & events
// ---------------------------------------------------------------------------

/// Commands accepted by the playback thread.
enum PlayerCommand {
    Play(PathBuf),
    Stop,
    SeekMs(u64),
    PositionMs(mpsc::Sender<u64>),
    Shutdown,
}

/// Events emitted by the playback thread, polled by the UI each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Playback of the named file began.
    Started(String),
    /// The file could not be opened or decoded.
    Error(String),
}

// ---------------------------------------------------------------------------
// AudioPlayer
// ---------------------------------------------------------------------------

/// Handle to the dedicated playback thread.
///
/// Dropping the handle shuts the thread down.
pub struct AudioPlayer {
    cmd_tx: mpsc::Sender<PlayerCommand>,
    event_rx: mpsc::Receiver<PlayerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    /// Spawn the playback thread and wait for its audio output to
    /// initialise.
    ///
    /// # Errors
    ///
    /// [`PlayerError::NoOutput`] when no output device is available; the
    /// application degrades to browser-only playback in that case.
    pub fn new() -> Result<Self, PlayerError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), String>>();

        let thread = std::thread::Builder::new()
            .name("audio-player".into())
            .spawn(move || Self::run(cmd_rx, event_tx, init_tx))?;

        let init = init_rx
            .recv()
            .map_err(|_| PlayerError::NoOutput("audio thread died during init".into()))?;
        init.map_err(PlayerError::NoOutput)?;

        Ok(Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    // ── Command surface ──────────────────────────────────────────────────

    /// Start playing `path` from the beginning, replacing any current
    /// playback.
    pub fn play(&self, path: PathBuf) {
        let _ = self.cmd_tx.send(PlayerCommand::Play(path));
    }

    /// Stop playback and drop the current sink.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Stop);
    }

    /// Seek the current playback to `ms`. A no-op when nothing is playing.
    pub fn seek_ms(&self, ms: u64) {
        let _ = self.cmd_tx.send(PlayerCommand::SeekMs(ms));
    }

    /// Current playback position in milliseconds; 0 when nothing is
    /// playing or the thread does not answer in time.
    pub fn position_ms(&self) -> u64 {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.cmd_tx.send(PlayerCommand::PositionMs(reply_tx)).is_err() {
            return 0;
        }
        reply_rx.recv_timeout(POSITION_REPLY_TIMEOUT).unwrap_or(0)
    }

    /// Non-blocking poll for the next player event.
    pub fn try_recv_event(&self) -> Option<PlayerEvent> {
        self.event_rx.try_recv().ok()
    }

    // ── Thread body ──────────────────────────────────────────────────────

    fn run(
        cmd_rx: mpsc::Receiver<PlayerCommand>,
        event_tx: mpsc::Sender<PlayerEvent>,
        init_tx: mpsc::Sender<Result<(), String>>,
    ) {
        // The stream must outlive every sink built on its handle.
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(e.to_string()));
                return;
            }
        };
        let _ = init_tx.send(Ok(()));

        let mut sink: Option<Sink> = None;

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                PlayerCommand::Play(path) => {
                    if let Some(old) = sink.take() {
                        old.stop();
                    }

                    let decoder = File::open(&path)
                        .map_err(|e| e.to_string())
                        .and_then(|f| {
                            Decoder::new(BufReader::new(f)).map_err(|e| e.to_string())
                        });

                    match decoder {
                        Ok(source) => match Sink::try_new(&handle) {
                            Ok(new_sink) => {
                                new_sink.append(source);
                                new_sink.play();
                                let _ = event_tx.send(PlayerEvent::Started(
                                    path.display().to_string(),
                                ));
                                sink = Some(new_sink);
                            }
                            Err(e) => {
                                let _ = event_tx.send(PlayerEvent::Error(format!(
                                    "audio output rejected playback: {e}"
                                )));
                            }
                        },
                        Err(e) => {
                            let _ = event_tx.send(PlayerEvent::Error(format!(
                                "cannot play {}: {e}",
                                path.display()
                            )));
                        }
                    }
                }
                PlayerCommand::Stop => {
                    if let Some(old) = sink.take() {
                        old.stop();
                    }
                }
                PlayerCommand::SeekMs(ms) => {
                    if let Some(ref s) = sink {
                        if let Err(e) = s.try_seek(Duration::from_millis(ms)) {
                            log::warn!("seek to {ms} ms failed: {e}");
                        }
                    } else {
                        log::debug!("seek ignored: nothing playing");
                    }
                }
                PlayerCommand::PositionMs(reply) => {
                    let ms = sink
                        .as_ref()
                        .map(|s| s.get_pos().as_millis() as u64)
                        .unwrap_or(0);
                    let _ = reply.send(ms);
                }
                PlayerCommand::Shutdown => break,
            }
        }
    }

    fn shutdown_inner(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
