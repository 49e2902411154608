//! The full-screen child: the same binary re-run with `--fullscreen-child`.
//!
//! The parent hands over the terminal, runs the child with inherited stdio and
//! blocks until it exits. The child draws a plasma animation until a quit key.

use crate::compositor::{palette_for, Gradient};
use crate::controller::FullscreenRunner;
use crate::terminal_restore::TerminalRestoreGuard;
use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// Flag that switches the binary into child mode.
pub const FULLSCREEN_CHILD_FLAG: &str = "--fullscreen-child";

const PLASMA_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const FRAME_INTERVAL: Duration = Duration::from_millis(40);

/// Runs `current_exe --fullscreen-child` on the inherited terminal.
#[derive(Debug, Clone, Default)]
pub struct ChildProcessRunner {
    program: Option<PathBuf>,
}

impl ChildProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `program` instead of the current executable.
    #[cfg(test)]
    pub(crate) fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn program(&self) -> Result<PathBuf, String> {
        match &self.program {
            Some(program) => Ok(program.clone()),
            None => std::env::current_exe()
                .map_err(|err| format!("failed to locate current executable: {err}")),
        }
    }
}

impl FullscreenRunner for ChildProcessRunner {
    fn run(&mut self) -> Result<(), String> {
        let program = self.program()?;
        let status = Command::new(&program)
            .arg(FULLSCREEN_CHILD_FLAG)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|err| format!("failed to spawn {}: {err}", program.display()))?;
        status_to_result(status)
    }
}

fn status_to_result(status: ExitStatus) -> Result<(), String> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(format!("fullscreen child exited with code {code}")),
        None => Err("fullscreen child was terminated by a signal".to_string()),
    }
}

/// One frame of the plasma: `rows` lines of `cols` glyphs at time `t` seconds.
pub fn plasma_frame(cols: u16, rows: u16, t: f32) -> Vec<String> {
    let top = PLASMA_RAMP.len() - 1;
    (0..rows)
        .map(|y| {
            (0..cols)
                .map(|x| {
                    let (fx, fy) = (f32::from(x), f32::from(y) * 2.0);
                    let v = (fx / 8.0 + t).sin()
                        + (fy / 6.0 - t * 1.3).sin()
                        + ((fx + fy) / 10.0 + t * 0.7).sin()
                        + ((fx * fx + fy * fy).sqrt() / 8.0 - t).sin();
                    let unit = (v + 4.0) / 8.0;
                    let index = (unit * top as f32).round() as usize;
                    PLASMA_RAMP[index.min(top)]
                })
                .collect()
        })
        .collect()
}

fn is_quit(event: &Event) -> bool {
    let Event::Key(key) = event else {
        return false;
    };
    if key.kind != KeyEventKind::Press {
        return false;
    }
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn draw_plasma(out: &mut impl Write, lines: &[String], gradient: &Gradient) -> io::Result<()> {
    let height = lines.len();
    for (y, line) in lines.iter().enumerate() {
        let color = gradient.at(y, height);
        queue!(
            out,
            MoveTo(0, y as u16),
            SetForegroundColor(Color::Rgb {
                r: color.0,
                g: color.1,
                b: color.2,
            }),
            Print(line)
        )?;
    }
    queue!(out, ResetColor)?;
    out.flush()
}

/// Child-mode entry point. Owns the terminal until a quit key.
pub fn run_child() -> Result<()> {
    let guard = TerminalRestoreGuard::new();
    guard.enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    guard
        .enter_alt_screen(&mut stdout)
        .context("enter alternate screen")?;
    queue!(stdout, Clear(ClearType::All)).context("clear screen")?;

    let gradient = palette_for("nrfm");
    let started = Instant::now();
    loop {
        let (cols, rows) = terminal::size().context("read terminal size")?;
        let lines = plasma_frame(cols, rows, started.elapsed().as_secs_f32());
        draw_plasma(&mut stdout, &lines, &gradient).context("draw plasma")?;
        if event::poll(FRAME_INTERVAL).context("poll input")? {
            let event = event::read().context("read input")?;
            if is_quit(&event) {
                break;
            }
        }
    }
    drop(guard);
    Ok(())
}
