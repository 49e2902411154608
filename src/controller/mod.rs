//! Root state machine: which view owns the terminal and where each event goes.
//!
//! The event loop feeds every [`AppEvent`] through [`RootController::handle`]
//! one at a time and redraws afterwards. Key events go to whichever view has
//! focus (the video view takes all of them while open); everything else is
//! routed by type to its owner whether or not that owner is visible.

mod chat;
mod player;
mod video_view;

pub use chat::ChatPane;
pub use player::{scroll_window, PlayerCommand, PlayerState};
pub use video_view::VideoView;

use crate::audio::{AudioEvent, Playback, PlaybackId};
use crate::compositor::visualizer_geometry;
use crate::config::Layout;
use crate::diagnostics::DiagnosticLog;
use crate::logging::{log_debug_content, ContentKind};
use crate::mailbox::MailboxReceiver;
use crate::metadata::MetadataUpdate;
use crate::stations::StationCatalog;
use crate::video::{FrameGeometry, LiveFrameSource, SessionToken, VideoEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Smallest terminal the video view lays itself out for.
const VIDEO_MIN_TERMINAL: (u16, u16) = (10, 12);
/// Assumed until the first resize event arrives.
const INITIAL_SIZE: (u16, u16) = (80, 24);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Player,
    Chat,
    VideoAscii,
    ExternalFullscreen,
}

/// Every message the event loop handles.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
    VisualizerTick,
    ScrollTick,
    Audio(AudioEvent),
    Metadata(MetadataUpdate),
    Video(VideoEvent),
    FullscreenExited { error: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Exclusive use of the terminal by this process.
pub trait TerminalOwner {
    /// Leave the alternate screen and raw mode and stop reading input.
    fn release(&mut self) -> anyhow::Result<()>;
    /// Undo [`TerminalOwner::release`].
    fn reacquire(&mut self) -> anyhow::Result<()>;
}

/// Runs the full-screen child to completion on the inherited terminal.
pub trait FullscreenRunner {
    fn run(&mut self) -> Result<(), String>;
}

/// Collaborators the controller drives.
pub struct ControllerDeps<P: Playback> {
    pub audio: P,
    pub amplitudes: MailboxReceiver<Vec<f32>>,
    pub frames: LiveFrameSource,
    pub terminal: Box<dyn TerminalOwner>,
    pub fullscreen: Box<dyn FullscreenRunner>,
    pub diag: DiagnosticLog,
}

pub struct RootController<P: Playback> {
    view: ViewState,
    /// View to return to when the video or fullscreen view closes.
    return_to: ViewState,
    stations: StationCatalog,
    player: PlayerState,
    chat: ChatPane,
    video: VideoView,
    audio: P,
    /// Job whose events are current; `None` while nothing should be playing.
    audio_job: Option<PlaybackId>,
    amplitudes: MailboxReceiver<Vec<f32>>,
    frames: LiveFrameSource,
    terminal: Box<dyn TerminalOwner>,
    fullscreen: Box<dyn FullscreenRunner>,
    diag: DiagnosticLog,
    size: (u16, u16),
    clear_requested: bool,
}

impl<P: Playback> RootController<P> {
    pub fn new(
        stations: StationCatalog,
        layout: Layout,
        start_station: usize,
        video_color: bool,
        deps: ControllerDeps<P>,
    ) -> Self {
        let (bars, rows) = visualizer_geometry();
        let start_station = start_station.min(stations.len().saturating_sub(1));
        let (cols, term_rows) = INITIAL_SIZE;
        let mut player = PlayerState::new(layout, start_station, bars, rows);
        player.resize(cols, term_rows, stations.len());
        Self {
            view: ViewState::Player,
            return_to: ViewState::Player,
            stations,
            player,
            chat: ChatPane::new(cols, term_rows),
            video: VideoView::new(video_color),
            audio: deps.audio,
            audio_job: None,
            amplitudes: deps.amplitudes,
            frames: deps.frames,
            terminal: deps.terminal,
            fullscreen: deps.fullscreen,
            diag: deps.diag,
            size: INITIAL_SIZE,
            clear_requested: false,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn stations(&self) -> &StationCatalog {
        &self.stations
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn chat(&self) -> &ChatPane {
        &self.chat
    }

    pub fn video(&self) -> &VideoView {
        &self.video
    }

    pub fn diag(&self) -> &DiagnosticLog {
        &self.diag
    }

    /// Token of the live video session; events carrying any other are stale.
    #[cfg(test)]
    pub(crate) fn video_token(&self) -> SessionToken {
        self.frames.current_token()
    }

    /// True once after anything that needs the screen cleared before the next draw.
    pub fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }

    /// Start playing the selected station.
    pub fn start(&mut self) {
        let station = self.player.selected;
        self.player.playing = Some(station);
        self.play(station);
    }

    /// Stop audio and video ahead of exit.
    pub fn shutdown(&mut self) {
        self.frames.stop();
        self.stop_audio();
    }

    pub fn handle(&mut self, event: AppEvent) -> ControlFlow {
        match event {
            AppEvent::Key(key) => return self.handle_key(key),
            AppEvent::Resize { cols, rows } => self.handle_resize(cols, rows),
            AppEvent::VisualizerTick => {
                let mut latest = None;
                while let Some(amplitudes) = self.amplitudes.try_recv() {
                    latest = Some(amplitudes);
                }
                self.player.envelope.tick(latest.as_deref());
            }
            AppEvent::ScrollTick => self.player.scroll_tick(&self.stations),
            AppEvent::Audio(event) => self.handle_audio(event),
            AppEvent::Metadata(update) => {
                let changed = self.stations.apply_now_playing(update.0.iter());
                for idx in &changed {
                    if let Some(station) = self.stations.get(*idx) {
                        log_debug_content(ContentKind::NowPlaying, &station.now_playing);
                    }
                }
                if !changed.is_empty() {
                    tracing::debug!(stations = changed.len(), "now playing updated");
                }
            }
            AppEvent::Video(event) => self.handle_video(event),
            AppEvent::FullscreenExited { error } => {
                match error {
                    Some(err) => self.diag.push(format!("fullscreen exited: {err}")),
                    None => self.diag.push("fullscreen exited"),
                }
                self.view = self.return_to;
                self.clear_requested = true;
            }
        }
        ControlFlow::Continue
    }

    fn handle_key(&mut self, key: KeyEvent) -> ControlFlow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.shutdown();
            return ControlFlow::Quit;
        }
        if self.view == ViewState::VideoAscii {
            self.handle_video_key(key);
            return ControlFlow::Continue;
        }

        let typing = self.view == ViewState::Chat && self.chat.input_focused();
        match key.code {
            KeyCode::Tab => {
                self.view = match self.view {
                    ViewState::Chat => ViewState::Player,
                    _ => ViewState::Chat,
                };
                return ControlFlow::Continue;
            }
            KeyCode::Char('d') | KeyCode::Char('D') if !typing => {
                self.run_fullscreen();
                return ControlFlow::Continue;
            }
            KeyCode::Char('y') | KeyCode::Char('Y') if !typing => {
                self.open_video();
                return ControlFlow::Continue;
            }
            _ => {}
        }

        if self.view == ViewState::Chat {
            self.chat.handle_key(key);
            return ControlFlow::Continue;
        }
        match self.player.handle_key(key, &self.stations) {
            PlayerCommand::None => {}
            PlayerCommand::Play(station) => self.play(station),
            PlayerCommand::Stop => self.stop_audio(),
            PlayerCommand::Quit => {
                self.shutdown();
                return ControlFlow::Quit;
            }
        }
        ControlFlow::Continue
    }

    fn handle_video_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.video.color = !self.video.color;
                self.restart_video(self.video.station, self.video_terminal_size());
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.frames.stop();
                self.video.lose_video();
                self.view = self.return_to;
                self.clear_requested = true;
            }
            KeyCode::Left | KeyCode::Right => {
                let delta = if key.code == KeyCode::Left { -1 } else { 1 };
                let station = self.stations.wrap_index(self.video.station, delta);
                self.restart_video(station, self.video_terminal_size());
                self.player.playing = Some(station);
                self.player.scroll_offset = 0;
                self.play(station);
            }
            _ => {}
        }
    }

    /// Player and chat stay resident behind every view, so both always get the new size.
    fn handle_resize(&mut self, cols: u16, rows: u16) {
        self.size = (cols, rows);
        self.player.resize(cols, rows, self.stations.len());
        self.chat.resize(cols, rows);
        if self.view == ViewState::VideoAscii {
            self.restart_video(self.video.station, self.video_terminal_size());
        }
    }

    fn handle_audio(&mut self, event: AudioEvent) {
        if self.audio_job != Some(event.job()) {
            return;
        }
        match event {
            AudioEvent::Started { .. } => self.player.error = None,
            AudioEvent::Failed { error, .. } => {
                self.audio_job = None;
                self.player.playing = None;
                self.player.error = Some(error);
            }
            AudioEvent::Ended { .. } => {
                self.audio_job = None;
                self.player.playing = None;
                self.player.error = Some("stream ended".to_string());
            }
        }
    }

    fn handle_video(&mut self, event: VideoEvent) {
        if !self.frames.accepts(&event) {
            return;
        }
        match event {
            VideoEvent::Frame(frame) => self.video.show_frame(frame.text),
            VideoEvent::Error { message, .. } => {
                self.diag.push(format!("video: {message}"));
                self.video.lose_video();
            }
            VideoEvent::Stopped { .. } => self.video.lose_video(),
        }
    }

    fn play(&mut self, station: usize) {
        let Some(url) = self.stations.get(station).map(|s| s.stream_url.clone()) else {
            return;
        };
        self.diag.push(format!("play {url}"));
        self.audio_job = Some(self.audio.play(station, &url));
    }

    fn stop_audio(&mut self) {
        self.audio_job = None;
        self.audio.stop();
    }

    fn video_terminal_size(&self) -> (u16, u16) {
        (
            self.size.0.max(VIDEO_MIN_TERMINAL.0),
            self.size.1.max(VIDEO_MIN_TERMINAL.1),
        )
    }

    fn open_video(&mut self) {
        let station = self
            .player
            .playing
            .filter(|index| *index < self.stations.len())
            .unwrap_or(0);
        self.return_to = self.view;
        self.view = ViewState::VideoAscii;
        self.clear_requested = true;
        self.restart_video(station, self.video_terminal_size());
    }

    fn restart_video(&mut self, station: usize, (cols, rows): (u16, u16)) {
        let geometry = FrameGeometry::for_terminal(cols, rows);
        let source = self
            .stations
            .get(station)
            .and_then(|s| s.video_url.clone());
        let outcome = self
            .frames
            .start(source.as_deref(), geometry, self.video.color);
        self.video.begin(station, geometry, outcome);
    }

    /// Hand the terminal to the full-screen child and block until it exits.
    /// The sequence is the same however the child ends.
    fn run_fullscreen(&mut self) {
        self.return_to = self.view;
        self.view = ViewState::ExternalFullscreen;
        if let Err(err) = self.terminal.release() {
            self.diag.push(format!("release terminal: {err:#}"));
        }
        let result = self.fullscreen.run();
        if let Err(err) = self.terminal.reacquire() {
            self.diag.push(format!("restore terminal: {err:#}"));
        }
        self.handle(AppEvent::FullscreenExited {
            error: result.err(),
        });
    }
}

#[cfg(test)]
pub(crate) mod testing;
