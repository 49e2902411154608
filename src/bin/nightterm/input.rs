//! Terminal input thread. It stops reading while a child process owns the terminal.

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyEventKind};
use nightterm::controller::AppEvent;
use nightterm::log_debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PARKED_SLEEP: Duration = Duration::from_millis(10);
const PAUSE_WAIT: Duration = Duration::from_millis(250);

/// Lets the event loop stop the input thread from consuming keystrokes.
#[derive(Debug, Default)]
pub(crate) struct InputGate {
    paused: AtomicBool,
    parked: AtomicBool,
}

impl InputGate {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Ask the thread to stop reading and wait until it has parked.
    pub(crate) fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + PAUSE_WAIT;
        while !self.parked.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(PARKED_SLEEP);
        }
    }

    pub(crate) fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn set_parked(&self, parked: bool) {
        self.parked.store(parked, Ordering::SeqCst);
    }
}

fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Resize(cols, rows) => Some(AppEvent::Resize { cols, rows }),
        _ => None,
    }
}

pub(crate) fn spawn_input_thread(
    tx: Sender<AppEvent>,
    gate: Arc<InputGate>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        if gate.is_paused() {
            gate.set_parked(true);
            thread::sleep(PARKED_SLEEP);
            continue;
        }
        gate.set_parked(false);
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => {
                log_debug(&format!("input poll error: {err}"));
                return;
            }
        }
        let event = match event::read() {
            Ok(event) => event,
            Err(err) => {
                log_debug(&format!("input read error: {err}"));
                return;
            }
        };
        if let Some(event) = translate(event) {
            if tx.send(event).is_err() {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn only_presses_and_resizes_are_forwarded() {
        let press = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE);
        assert_eq!(translate(Event::Key(press)), Some(AppEvent::Key(press)));
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert_eq!(translate(Event::Key(release)), None);
        assert_eq!(
            translate(Event::Resize(100, 40)),
            Some(AppEvent::Resize {
                cols: 100,
                rows: 40
            })
        );
        assert_eq!(translate(Event::FocusGained), None);
    }

    #[test]
    fn pause_gives_up_after_the_wait_when_nothing_parks() {
        let gate = InputGate::new();
        let started = Instant::now();
        gate.pause();
        assert!(gate.is_paused());
        assert!(started.elapsed() >= PAUSE_WAIT);
        gate.resume();
        assert!(!gate.is_paused());
    }
}
