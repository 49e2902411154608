//! Fakes for driving a [`RootController`] without a terminal, audio device or network.

use super::*;
use crate::audio::{AmplitudeExtractor, PlaybackId};
use crate::video::{DecoderLauncher, DecoderProcess, ManifestResolver, ResolutionError};
use crossbeam_channel::{unbounded, Receiver};
use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(crate) struct FakePlayback {
    pub(crate) plays: Vec<usize>,
    pub(crate) stops: usize,
}

impl Playback for FakePlayback {
    /// Job ids count plays from 1.
    fn play(&mut self, station: usize, _url: &str) -> PlaybackId {
        self.plays.push(station);
        self.plays.len() as PlaybackId
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

pub(crate) struct UnresolvableVideo;

impl ManifestResolver for UnresolvableVideo {
    fn resolve(&self, _source: &str) -> Result<String, ResolutionError> {
        Err(ResolutionError::Unplayable {
            status: "UNPLAYABLE".to_string(),
            reason: "test".to_string(),
        })
    }
}

pub(crate) struct NoDecoder;

impl DecoderLauncher for NoDecoder {
    fn launch(
        &self,
        _url: &str,
        _cols: u16,
        _rows: u16,
        _diag: &DiagnosticLog,
    ) -> anyhow::Result<Box<dyn DecoderProcess>> {
        Err(anyhow::anyhow!("no decoder in tests"))
    }
}

/// Resolves every source to a fake manifest.
pub(crate) struct OpenResolver;

impl ManifestResolver for OpenResolver {
    fn resolve(&self, source: &str) -> Result<String, ResolutionError> {
        Ok(format!("fake://{source}"))
    }
}

/// Stands in for ffmpeg: one gray frame every 20 ms until killed.
pub(crate) struct LoopingDecoder;

impl DecoderLauncher for LoopingDecoder {
    fn launch(
        &self,
        _url: &str,
        cols: u16,
        rows: u16,
        _diag: &DiagnosticLog,
    ) -> anyhow::Result<Box<dyn DecoderProcess>> {
        let killed = Arc::new(AtomicBool::new(false));
        let frame = vec![200u8; usize::from(cols) * usize::from(rows) * 3];
        Ok(Box::new(LoopingProcess {
            stdout: Some(Box::new(FrameLoop {
                frame,
                offset: 0,
                killed: Arc::clone(&killed),
            })),
            killed,
        }))
    }
}

struct FrameLoop {
    frame: Vec<u8>,
    offset: usize,
    killed: Arc<AtomicBool>,
}

impl Read for FrameLoop {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.offset == self.frame.len() {
            thread::sleep(Duration::from_millis(20));
            self.offset = 0;
        }
        if self.killed.load(Ordering::SeqCst) {
            return Ok(0);
        }
        let n = buf.len().min(self.frame.len() - self.offset);
        buf[..n].copy_from_slice(&self.frame[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

struct LoopingProcess {
    stdout: Option<Box<dyn Read + Send>>,
    killed: Arc<AtomicBool>,
}

impl DecoderProcess for LoopingProcess {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout.take()
    }

    fn poll_exit(&mut self) -> Option<String> {
        self.killed
            .load(Ordering::SeqCst)
            .then(|| "signal: 9 (SIGKILL)".to_string())
    }

    fn kill(&mut self) {
        self.killed.store(true, Ordering::SeqCst);
    }
}

/// Next event on `rx` matching `wanted`; everything before it is discarded.
pub(crate) fn wait_for(
    rx: &Receiver<VideoEvent>,
    wanted: impl Fn(&VideoEvent) -> bool,
) -> VideoEvent {
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        let event = rx.recv_timeout(left).expect("video event before deadline");
        if wanted(&event) {
            return event;
        }
    }
}

pub(crate) type CallLog = Rc<RefCell<Vec<&'static str>>>;

pub(crate) struct FakeTerminal {
    calls: CallLog,
}

impl TerminalOwner for FakeTerminal {
    fn release(&mut self) -> anyhow::Result<()> {
        self.calls.borrow_mut().push("release");
        Ok(())
    }

    fn reacquire(&mut self) -> anyhow::Result<()> {
        self.calls.borrow_mut().push("reacquire");
        Ok(())
    }
}

pub(crate) struct FakeRunner {
    calls: CallLog,
    result: Result<(), String>,
}

impl FullscreenRunner for FakeRunner {
    fn run(&mut self) -> Result<(), String> {
        self.calls.borrow_mut().push("run");
        self.result.clone()
    }
}

pub(crate) struct Harness {
    pub(crate) controller: RootController<FakePlayback>,
    pub(crate) calls: CallLog,
    pub(crate) video_rx: Receiver<VideoEvent>,
    pub(crate) extractor: AmplitudeExtractor,
}

fn build(
    resolver: Arc<dyn ManifestResolver>,
    launcher: Arc<dyn DecoderLauncher>,
    fullscreen: Result<(), String>,
) -> Harness {
    let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (video_tx, video_rx) = unbounded();
    let diag = DiagnosticLog::new(64);
    let frames = LiveFrameSource::new(resolver, launcher, video_tx, diag.clone());
    let (bars, _) = visualizer_geometry();
    let (extractor, amplitudes) = AmplitudeExtractor::new(bars);
    let controller = RootController::new(
        StationCatalog::builtin(),
        Layout::Horizontal,
        0,
        false,
        ControllerDeps {
            audio: FakePlayback::default(),
            amplitudes,
            frames,
            terminal: Box::new(FakeTerminal {
                calls: Rc::clone(&calls),
            }),
            fullscreen: Box::new(FakeRunner {
                calls: Rc::clone(&calls),
                result: fullscreen,
            }),
            diag,
        },
    );
    Harness {
        controller,
        calls,
        video_rx,
        extractor,
    }
}

pub(crate) fn harness_with(fullscreen: Result<(), String>) -> Harness {
    build(Arc::new(UnresolvableVideo), Arc::new(NoDecoder), fullscreen)
}

pub(crate) fn harness() -> Harness {
    harness_with(Ok(()))
}

/// Video sessions resolve and stream frames until stopped.
pub(crate) fn harness_with_frames() -> Harness {
    build(Arc::new(OpenResolver), Arc::new(LoopingDecoder), Ok(()))
}
