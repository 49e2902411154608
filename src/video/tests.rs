use super::*;
use crate::diagnostics::DiagnosticLog;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(3);

struct FakeResolver {
    // Sources listed here block until the gate receives a message.
    gated: Option<(String, Receiver<()>)>,
}

impl FakeResolver {
    fn open() -> Self {
        Self { gated: None }
    }
}

impl ManifestResolver for FakeResolver {
    fn resolve(&self, source: &str) -> Result<String, ResolutionError> {
        if source == "broken" {
            return Err(ResolutionError::MissingManifest);
        }
        if let Some((gated, gate)) = &self.gated {
            if gated == source {
                let _ = gate.recv_timeout(WAIT);
            }
        }
        Ok(format!("fake://{source}"))
    }
}

#[derive(Clone, Default)]
struct ProcessState {
    exited: Arc<AtomicBool>,
    killed: Arc<AtomicUsize>,
}

/// Emits its frames with a short pause between each, then either ends or
/// stays open until killed.
struct PacedStream {
    frames: Vec<Vec<u8>>,
    current: Vec<u8>,
    offset: usize,
    hold_open: bool,
    state: ProcessState,
}

impl Read for PacedStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        while self.offset >= self.current.len() {
            if self.state.killed.load(Ordering::SeqCst) > 0 {
                self.state.exited.store(true, Ordering::SeqCst);
                return Ok(0);
            }
            if self.frames.is_empty() {
                if !self.hold_open {
                    self.state.exited.store(true, Ordering::SeqCst);
                    return Ok(0);
                }
                thread::sleep(Duration::from_millis(5));
                continue;
            }
            thread::sleep(Duration::from_millis(25));
            self.current = self.frames.remove(0);
            self.offset = 0;
        }
        let n = buf.len().min(self.current.len() - self.offset);
        buf[..n].copy_from_slice(&self.current[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

struct FakeProcess {
    stdout: Option<Box<dyn Read + Send>>,
    state: ProcessState,
}

impl DecoderProcess for FakeProcess {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout.take()
    }

    fn poll_exit(&mut self) -> Option<String> {
        self.state
            .exited
            .load(Ordering::SeqCst)
            .then(|| "exit status: 0".to_string())
    }

    fn kill(&mut self) {
        self.state.killed.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeLauncher {
    frames: Vec<Vec<u8>>,
    hold_open: bool,
    launches: Mutex<Vec<(String, u16, u16)>>,
    states: Mutex<Vec<ProcessState>>,
}

impl FakeLauncher {
    fn new(frames: Vec<Vec<u8>>, hold_open: bool) -> Self {
        Self {
            frames,
            hold_open,
            launches: Mutex::new(Vec::new()),
            states: Mutex::new(Vec::new()),
        }
    }

    fn launches(&self) -> Vec<(String, u16, u16)> {
        self.launches.lock().expect("launches").clone()
    }

    fn states(&self) -> Vec<ProcessState> {
        self.states.lock().expect("states").clone()
    }
}

impl DecoderLauncher for FakeLauncher {
    fn launch(
        &self,
        url: &str,
        cols: u16,
        rows: u16,
        _diag: &DiagnosticLog,
    ) -> anyhow::Result<Box<dyn DecoderProcess>> {
        self.launches
            .lock()
            .expect("launches")
            .push((url.to_string(), cols, rows));
        let state = ProcessState::default();
        self.states.lock().expect("states").push(state.clone());
        Ok(Box::new(FakeProcess {
            stdout: Some(Box::new(PacedStream {
                frames: self.frames.clone(),
                current: Vec::new(),
                offset: 0,
                hold_open: self.hold_open,
                state: state.clone(),
            })),
            state,
        }))
    }
}

fn source_with(
    resolver: FakeResolver,
    launcher: Arc<FakeLauncher>,
) -> (LiveFrameSource, Receiver<VideoEvent>) {
    let (tx, rx): (Sender<VideoEvent>, Receiver<VideoEvent>) = unbounded();
    let source = LiveFrameSource::new(Arc::new(resolver), launcher, tx, DiagnosticLog::new(64));
    (source, rx)
}

fn collect_until_stopped(rx: &Receiver<VideoEvent>, token: SessionToken) -> Vec<VideoEvent> {
    let deadline = Instant::now() + WAIT;
    let mut events = Vec::new();
    while let Ok(event) = rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        let done = matches!(event, VideoEvent::Stopped { token: t } if t == token);
        events.push(event);
        if done {
            break;
        }
    }
    events
}

#[test]
fn geometry_reserves_chrome_rows_and_clamps() {
    assert_eq!(
        FrameGeometry::for_terminal(80, 24),
        FrameGeometry { cols: 80, rows: 21 }
    );
    assert_eq!(
        FrameGeometry::for_terminal(4, 3),
        FrameGeometry { cols: 10, rows: 5 }
    );
    assert_eq!(FrameGeometry { cols: 40, rows: 20 }.frame_bytes(), 2400);
}

#[test]
fn three_raw_frames_become_three_ascii_frames_in_order() {
    let geometry = FrameGeometry { cols: 40, rows: 20 };
    let frames: Vec<Vec<u8>> = [0u8, 100, 200]
        .iter()
        .map(|v| vec![*v; geometry.frame_bytes()])
        .collect();
    let launcher = Arc::new(FakeLauncher::new(frames, false));
    let (mut source, rx) = source_with(FakeResolver::open(), Arc::clone(&launcher));

    let StartOutcome::Loading { token } = source.start(Some("live"), geometry, false) else {
        panic!("expected a running session");
    };
    let events = collect_until_stopped(&rx, token);

    let texts: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            VideoEvent::Frame(frame) if frame.token == token => Some(frame.text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts.len(), 3);
    let table = GlyphTable::new();
    for (text, value) in texts.iter().zip([0u8, 100, 200]) {
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 20);
        let glyph = table.glyph(value, value, value);
        for line in lines {
            assert_eq!(line.chars().count(), 40);
            assert!(line.chars().all(|c| c == glyph));
        }
    }
    assert!(matches!(events.last(), Some(VideoEvent::Stopped { .. })));
    assert_eq!(launcher.launches(), vec![("fake://live".to_string(), 40, 20)]);
}

#[test]
fn second_start_invalidates_the_first_session() {
    let (gate_tx, gate_rx) = bounded(1);
    let resolver = FakeResolver {
        gated: Some(("slow".to_string(), gate_rx)),
    };
    let launcher = Arc::new(FakeLauncher::new(vec![vec![50u8; 10 * 5 * 3]], false));
    let (mut source, rx) = source_with(resolver, Arc::clone(&launcher));
    let geometry = FrameGeometry::for_terminal(10, 8);

    let StartOutcome::Loading { token: first } = source.start(Some("slow"), geometry, false)
    else {
        panic!("expected a running session");
    };
    let StartOutcome::Loading { token: second } = source.start(Some("fast"), geometry, true)
    else {
        panic!("expected a running session");
    };
    assert!(second > first);
    gate_tx.send(()).expect("release gate");

    let events = collect_until_stopped(&rx, second);
    // Give the superseded worker time to finish resolving.
    thread::sleep(Duration::from_millis(100));
    let late: Vec<VideoEvent> = rx.try_iter().collect();

    // The superseded worker finishes resolving but must neither launch nor report.
    assert!(events
        .iter()
        .chain(late.iter())
        .all(|event| event.token() == second));
    assert!(events
        .iter()
        .any(|event| matches!(event, VideoEvent::Frame(f) if f.token == second && source.accepts(event))));
    assert_eq!(launcher.launches(), vec![("fake://fast".to_string(), 10, 5)]);
}

#[test]
fn stop_kills_the_decoder_and_invalidates_its_events() {
    let launcher = Arc::new(FakeLauncher::new(vec![vec![10u8; 10 * 5 * 3]], true));
    let (mut source, rx) = source_with(FakeResolver::open(), Arc::clone(&launcher));
    let StartOutcome::Loading { token } =
        source.start(Some("live"), FrameGeometry::for_terminal(10, 8), false)
    else {
        panic!("expected a running session");
    };
    let first = rx.recv_timeout(WAIT).expect("first frame");
    assert!(matches!(first, VideoEvent::Frame(_)));
    assert!(source.accepts(&first));

    source.stop();
    source.stop();
    assert!(!source.is_running());
    assert!(!source.accepts(&first));

    let events = collect_until_stopped(&rx, token);
    assert!(matches!(events.last(), Some(VideoEvent::Stopped { .. })));
    let states = launcher.states();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].killed.load(Ordering::SeqCst), 1);
}

#[test]
fn resolution_failure_reports_an_error_for_the_current_session() {
    let launcher = Arc::new(FakeLauncher::new(Vec::new(), false));
    let (mut source, rx) = source_with(FakeResolver::open(), Arc::clone(&launcher));
    let StartOutcome::Loading { token } =
        source.start(Some("broken"), FrameGeometry::for_terminal(40, 20), false)
    else {
        panic!("expected a running session");
    };
    let event = rx.recv_timeout(WAIT).expect("error event");
    match &event {
        VideoEvent::Error { token: t, message } => {
            assert_eq!(*t, token);
            assert!(message.contains("no hls manifest url"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(source.accepts(&event));
    assert!(launcher.launches().is_empty());
}

#[test]
fn station_without_video_starts_nothing() {
    let launcher = Arc::new(FakeLauncher::new(Vec::new(), false));
    let (mut source, rx) = source_with(FakeResolver::open(), Arc::clone(&launcher));
    let outcome = source.start(None, FrameGeometry::for_terminal(40, 20), false);
    assert!(matches!(outcome, StartOutcome::NoVideo { .. }));
    assert!(!source.is_running());
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(launcher.launches().is_empty());
}
