//! Single-threaded loop: one event at a time, then a redraw.

use anyhow::{Context, Result};
use crossbeam_channel::{never, select, tick, Receiver};
use nightterm::audio::{AudioEvent, Playback};
use nightterm::config::{SCROLL_TICK, VISUALIZER_TICK};
use nightterm::controller::{AppEvent, ControlFlow, RootController};
use nightterm::mailbox::MailboxReceiver;
use nightterm::metadata::MetadataUpdate;
use nightterm::video::VideoEvent;
use nightterm::{log_debug, ui};
use ratatui::{backend::Backend, Terminal};

/// Receivers feeding the loop besides its own timers.
pub(crate) struct EventSources {
    pub(crate) input: Receiver<AppEvent>,
    pub(crate) audio: Receiver<AudioEvent>,
    pub(crate) metadata: MailboxReceiver<MetadataUpdate>,
    pub(crate) video: Receiver<VideoEvent>,
}

pub(crate) fn run_event_loop<B: Backend, P: Playback>(
    terminal: &mut Terminal<B>,
    controller: &mut RootController<P>,
    sources: EventSources,
) -> Result<()> {
    let EventSources {
        mut input,
        mut audio,
        metadata: metadata_mailbox,
        mut video,
    } = sources;
    // The mailbox stays alive for the whole loop so its producer keeps delivering.
    let mut metadata = metadata_mailbox.channel().clone();
    let visualizer = tick(VISUALIZER_TICK);
    let scroll = tick(SCROLL_TICK);

    terminal
        .draw(|frame| ui::draw(frame, controller))
        .context("initial draw")?;

    loop {
        // A disconnected source is swapped for `never()` so select! stops waking on it.
        let event = select! {
            recv(input) -> msg => match msg {
                Ok(event) => Some(event),
                Err(_) => {
                    log_debug("input channel closed");
                    input = never();
                    None
                }
            },
            recv(visualizer) -> _ => Some(AppEvent::VisualizerTick),
            recv(scroll) -> _ => Some(AppEvent::ScrollTick),
            recv(audio) -> msg => match msg {
                Ok(event) => Some(AppEvent::Audio(event)),
                Err(_) => {
                    audio = never();
                    None
                }
            },
            recv(metadata) -> msg => match msg {
                Ok(update) => Some(AppEvent::Metadata(update)),
                Err(_) => {
                    metadata = never();
                    None
                }
            },
            recv(video) -> msg => match msg {
                Ok(event) => Some(AppEvent::Video(event)),
                Err(_) => {
                    video = never();
                    None
                }
            },
        };
        let Some(event) = event else {
            continue;
        };

        if controller.handle(event) == ControlFlow::Quit {
            return Ok(());
        }
        if controller.take_clear_request() {
            terminal.clear().context("clear terminal")?;
        }
        terminal
            .draw(|frame| ui::draw(frame, controller))
            .context("draw")?;
    }
}
