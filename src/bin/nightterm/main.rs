//! nightterm entrypoint: radio player, ASCII visualizer and live video in one terminal.
//!
//! # Architecture
//!
//! - Input thread: reads terminal events, paused while a child owns the terminal
//! - Audio worker: fetches and decodes the stream, feeds the output callback
//! - Metadata client: SSE now-playing feed with reconnect backoff
//! - Video session: resolver, decoder subprocess, frame reader and converter
//! - Event loop: routes every message through the root controller and redraws

mod event_loop;
mod input;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use crossterm::terminal::size as terminal_size;
use nightterm::audio::{AudioEngine, AudioOutput};
use nightterm::compositor::visualizer_geometry;
use nightterm::config::{
    AppConfig, AUDIO_EVENT_CAPACITY, INPUT_CHANNEL_CAPACITY, METADATA_CHANNEL_CAPACITY,
    VIDEO_EVENT_CAPACITY,
};
use nightterm::controller::{AppEvent, ControllerDeps, RootController};
use nightterm::diagnostics::{DiagnosticLog, DIAGNOSTIC_LOG_CAPACITY};
use nightterm::fullscreen::{run_child, ChildProcessRunner};
use nightterm::mailbox::{mailbox, OverflowPolicy};
use nightterm::metadata::MetadataClient;
use nightterm::stations::StationCatalog;
use nightterm::terminal_restore::TerminalRestoreGuard;
use nightterm::video::{FfmpegLauncher, LiveFrameSource, YouTubeResolver};
use nightterm::{crash_log_path, init_logging, init_tracing, log_debug, log_file_path};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;

use crate::event_loop::{run_event_loop, EventSources};
use crate::input::{spawn_input_thread, InputGate};
use crate::terminal::{set_window_title, ConsoleTerminal};

fn main() -> Result<()> {
    let mut config = AppConfig::parse();
    if config.fullscreen_child {
        return run_child();
    }
    if config.list_output_devices {
        for name in AudioOutput::list_devices()? {
            println!("{name}");
        }
        return Ok(());
    }

    config.validate()?;
    init_logging(&config);
    init_tracing(&config);
    log_debug("=== nightterm started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));
    log_debug(&format!("Crash log: {:?}", crash_log_path()));

    let diag = DiagnosticLog::new(DIAGNOSTIC_LOG_CAPACITY);
    let stations = StationCatalog::builtin();
    let start_station = config
        .start_station
        .as_deref()
        .and_then(|key| stations.index_of_key(key))
        .unwrap_or(0);

    let (audio_tx, audio_rx) = bounded(AUDIO_EVENT_CAPACITY);
    let (bars, _) = visualizer_geometry();
    let (audio, amplitudes) =
        AudioEngine::new(config.stream_config(), bars, diag.clone(), audio_tx);

    let video_config = config.video_config();
    let (video_tx, video_rx) = bounded(VIDEO_EVENT_CAPACITY);
    let frames = LiveFrameSource::new(
        Arc::new(YouTubeResolver::new()),
        Arc::new(FfmpegLauncher::new(video_config.ffmpeg_cmd, video_config.fps)),
        video_tx,
        diag.clone(),
    );

    let (metadata_tx, metadata_rx) = mailbox(METADATA_CHANNEL_CAPACITY, OverflowPolicy::EvictOldest);
    let mut metadata = if config.no_metadata {
        drop(metadata_tx);
        None
    } else {
        Some(MetadataClient::spawn(
            config.metadata_url.clone(),
            metadata_tx,
            diag.clone(),
        ))
    };

    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard
        .enable_raw_mode()
        .context("enable raw mode")?;
    let mut stdout = io::stdout();
    terminal_guard
        .enter_alt_screen(&mut stdout)
        .context("enter alternate screen")?;
    set_window_title(&mut stdout).context("set window title")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")?;

    let gate = InputGate::new();
    let (input_tx, input_rx) = bounded(INPUT_CHANNEL_CAPACITY);
    let _input_handle = spawn_input_thread(input_tx, Arc::clone(&gate));

    let mut controller = RootController::new(
        stations,
        config.layout(),
        start_station,
        video_config.color,
        ControllerDeps {
            audio,
            amplitudes,
            frames,
            terminal: Box::new(ConsoleTerminal::new(Arc::clone(&gate))),
            fullscreen: Box::new(ChildProcessRunner::new()),
            diag: diag.clone(),
        },
    );
    if let Ok((cols, rows)) = terminal_size() {
        controller.handle(AppEvent::Resize { cols, rows });
    }
    controller.start();

    let result = run_event_loop(
        &mut terminal,
        &mut controller,
        EventSources {
            input: input_rx,
            audio: audio_rx,
            metadata: metadata_rx,
            video: video_rx,
        },
    );

    controller.shutdown();
    if let Some(client) = metadata.as_mut() {
        client.shutdown();
    }
    drop(terminal);
    drop(terminal_guard);
    log_debug("=== nightterm exited ===");
    result
}
