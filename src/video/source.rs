//! Session-scoped live video pipeline.
//!
//! Each `start()` opens a new session with a fresh token. A session runs three
//! stages on their own threads: the frame reader (subprocess stdout → frame
//! mailbox), the converter (mailbox → ASCII text) and the watcher (waits for
//! the subprocess, then for the converter, then reports `Stopped`). Every event
//! carries its session token; the consumer drops anything not tagged with the
//! current one.

use super::convert::{to_color_ascii, to_mono_ascii, GlyphTable};
use super::decoder::{DecoderLauncher, DecoderProcess};
use super::resolve::ManifestResolver;
use crate::config::{
    DECODER_POLL_INTERVAL, FRAME_QUEUE_CAPACITY, MIN_VIDEO_COLS, MIN_VIDEO_ROWS, VIDEO_CHROME_ROWS,
};
use crate::diagnostics::DiagnosticLog;
use crate::lock::lock_or_recover;
use crate::mailbox::{mailbox, MailboxReceiver, MailboxSender, Offer, OverflowPolicy};
use crossbeam_channel::Sender;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

pub type SessionToken = u64;

/// ASCII text of one decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub token: SessionToken,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoEvent {
    Frame(RenderedFrame),
    Error { token: SessionToken, message: String },
    Stopped { token: SessionToken },
}

impl VideoEvent {
    pub fn token(&self) -> SessionToken {
        match self {
            VideoEvent::Frame(frame) => frame.token,
            VideoEvent::Error { token, .. } | VideoEvent::Stopped { token } => *token,
        }
    }
}

/// Decoded frame size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub cols: u16,
    pub rows: u16,
}

impl FrameGeometry {
    /// Frame area for a terminal of `cols`×`rows`, leaving room for the
    /// header and controls.
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(MIN_VIDEO_COLS),
            rows: rows.max(MIN_VIDEO_ROWS) - VIDEO_CHROME_ROWS,
        }
    }

    pub fn frame_bytes(&self) -> usize {
        usize::from(self.cols) * usize::from(self.rows) * 3
    }
}

/// What `start()` set in motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The station has no video source; nothing runs.
    NoVideo { token: SessionToken },
    /// Resolution and decoding are underway on background threads.
    Loading { token: SessionToken },
}

type ProcessSlot = Arc<Mutex<Option<Box<dyn DecoderProcess>>>>;

struct Session {
    process: ProcessSlot,
    frames: Arc<MailboxReceiver<Vec<u8>>>,
}

pub struct LiveFrameSource {
    resolver: Arc<dyn ManifestResolver>,
    launcher: Arc<dyn DecoderLauncher>,
    events: Sender<VideoEvent>,
    diag: DiagnosticLog,
    current: Arc<AtomicU64>,
    session: Option<Session>,
}

impl LiveFrameSource {
    pub fn new(
        resolver: Arc<dyn ManifestResolver>,
        launcher: Arc<dyn DecoderLauncher>,
        events: Sender<VideoEvent>,
        diag: DiagnosticLog,
    ) -> Self {
        Self {
            resolver,
            launcher,
            events,
            diag,
            current: Arc::new(AtomicU64::new(0)),
            session: None,
        }
    }

    pub fn current_token(&self) -> SessionToken {
        self.current.load(Ordering::SeqCst)
    }

    /// Whether an event belongs to the live session.
    pub fn accepts(&self, event: &VideoEvent) -> bool {
        event.token() == self.current_token()
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a new session. Any previous session is stopped first.
    pub fn start(
        &mut self,
        source: Option<&str>,
        geometry: FrameGeometry,
        color: bool,
    ) -> StartOutcome {
        self.stop();
        let token = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(source) = source.filter(|s| !s.trim().is_empty()) else {
            return StartOutcome::NoVideo { token };
        };

        let (frame_tx, frame_rx) = mailbox(FRAME_QUEUE_CAPACITY, OverflowPolicy::EvictOldest);
        let session = Session {
            process: Arc::new(Mutex::new(None)),
            frames: Arc::new(frame_rx),
        };
        let worker = SessionWorker {
            token,
            current: Arc::clone(&self.current),
            source: source.to_string(),
            geometry,
            color,
            resolver: Arc::clone(&self.resolver),
            launcher: Arc::clone(&self.launcher),
            events: self.events.clone(),
            diag: self.diag.clone(),
            process: Arc::clone(&session.process),
            frames: Arc::clone(&session.frames),
        };
        self.diag.push(format!(
            "video session {token}: {}x{} {}",
            geometry.cols,
            geometry.rows,
            if color { "color" } else { "mono" }
        ));
        thread::spawn(move || worker.run(frame_tx));
        self.session = Some(session);
        StartOutcome::Loading { token }
    }

    /// Invalidate the current token and tear the session down. Idempotent.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.current.fetch_add(1, Ordering::SeqCst);
        if let Some(mut process) = lock_or_recover(&session.process, "video_stop").take() {
            process.kill();
        }
        session.frames.clear();
    }
}

impl Drop for LiveFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SessionWorker {
    token: SessionToken,
    current: Arc<AtomicU64>,
    source: String,
    geometry: FrameGeometry,
    color: bool,
    resolver: Arc<dyn ManifestResolver>,
    launcher: Arc<dyn DecoderLauncher>,
    events: Sender<VideoEvent>,
    diag: DiagnosticLog,
    process: ProcessSlot,
    frames: Arc<MailboxReceiver<Vec<u8>>>,
}

impl SessionWorker {
    fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.token
    }

    fn fail(&self, message: String) {
        self.diag.push(format!("video session {}: {message}", self.token));
        let _ = self.events.send(VideoEvent::Error {
            token: self.token,
            message,
        });
    }

    fn run(self, frame_tx: MailboxSender<Vec<u8>>) {
        let url = match self.resolver.resolve(&self.source) {
            Ok(url) => url,
            Err(err) => {
                if self.is_current() {
                    self.fail(format!("resolve failed: {err}"));
                }
                return;
            }
        };
        if !self.is_current() {
            return;
        }

        let launched = self
            .launcher
            .launch(&url, self.geometry.cols, self.geometry.rows, &self.diag);
        let stdout = {
            // Checked under the slot lock so a concurrent stop() either sees the
            // process or we see the new token.
            let mut slot = lock_or_recover(&self.process, "video_spawn");
            let mut process = match launched {
                Ok(process) => process,
                Err(err) => {
                    drop(slot);
                    if self.is_current() {
                        self.fail(format!("decoder failed: {err:#}"));
                    }
                    return;
                }
            };
            if !self.is_current() {
                process.kill();
                return;
            }
            let stdout = process.take_stdout();
            *slot = Some(process);
            stdout
        };
        let Some(stdout) = stdout else {
            self.fail("decoder has no output pipe".to_string());
            return;
        };

        let frame_bytes = self.geometry.frame_bytes();
        let reader = thread::spawn(move || read_frames(stdout, frame_bytes, frame_tx));
        let converter = self.spawn_converter();
        self.watch(reader, converter);
    }

    fn spawn_converter(&self) -> JoinHandle<usize> {
        let token = self.token;
        let current = Arc::clone(&self.current);
        let frames = Arc::clone(&self.frames);
        let events = self.events.clone();
        let (cols, rows) = (
            usize::from(self.geometry.cols),
            usize::from(self.geometry.rows),
        );
        let color = self.color;
        thread::spawn(move || {
            let table = GlyphTable::new();
            let mut emitted = 0usize;
            while let Some(frame) = frames.recv() {
                if current.load(Ordering::SeqCst) != token {
                    continue;
                }
                let text = if color {
                    to_color_ascii(&frame, cols, rows, &table)
                } else {
                    to_mono_ascii(&frame, cols, rows, &table)
                };
                if events
                    .send(VideoEvent::Frame(RenderedFrame { token, text }))
                    .is_err()
                {
                    break;
                }
                emitted += 1;
            }
            emitted
        })
    }

    fn watch(self, reader: JoinHandle<()>, converter: JoinHandle<usize>) {
        let status = loop {
            {
                let mut slot = lock_or_recover(&self.process, "video_watch");
                match slot.as_mut() {
                    Some(process) => {
                        if let Some(status) = process.poll_exit() {
                            break status;
                        }
                    }
                    None => break "killed".to_string(),
                }
            }
            thread::sleep(DECODER_POLL_INTERVAL);
        };
        let _ = reader.join();
        let emitted = converter.join().unwrap_or(0);
        self.diag.push(format!(
            "video session {}: decoder exited ({status}) after {emitted} frames, {} skipped",
            self.token,
            self.frames.dropped()
        ));
        let _ = self.events.send(VideoEvent::Stopped { token: self.token });
    }
}

/// Read whole frames until EOF or error, offering each to the mailbox.
fn read_frames(mut stdout: Box<dyn Read + Send>, frame_bytes: usize, frames: MailboxSender<Vec<u8>>) {
    if frame_bytes == 0 {
        return;
    }
    let mut buf = vec![0u8; frame_bytes];
    while stdout.read_exact(&mut buf).is_ok() {
        if frames.offer(buf.clone()) == Offer::Closed {
            break;
        }
    }
}

