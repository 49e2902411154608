use crate::input::InputGate;
use anyhow::{Context, Result};
use crossterm::{execute, terminal::SetTitle};
use nightterm::controller::TerminalOwner;
use nightterm::terminal_restore::TerminalRestoreGuard;
use std::io::{self, Write};
use std::sync::Arc;

pub(crate) const WINDOW_TITLE: &str = "Nightride";

/// Set the window title through OSC 0.
pub(crate) fn set_window_title(out: &mut impl Write) -> io::Result<()> {
    execute!(out, SetTitle(WINDOW_TITLE))
}

/// The real terminal: raw mode and alternate screen through the restore
/// guard, input through the gated reader thread.
pub(crate) struct ConsoleTerminal {
    guard: TerminalRestoreGuard,
    gate: Arc<InputGate>,
}

impl ConsoleTerminal {
    pub(crate) fn new(gate: Arc<InputGate>) -> Self {
        Self {
            guard: TerminalRestoreGuard::new(),
            gate,
        }
    }
}

impl TerminalOwner for ConsoleTerminal {
    fn release(&mut self) -> Result<()> {
        self.gate.pause();
        self.guard.release();
        Ok(())
    }

    fn reacquire(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        let result = self
            .guard
            .reacquire(&mut stdout)
            .context("re-enter raw mode and alternate screen")
            .and_then(|()| set_window_title(&mut stdout).context("set window title"));
        self.gate.resume();
        result
    }
}
