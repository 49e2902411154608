//! Local chat pane: scrollback plus a single-line input.
//!
//! While the input has focus every printable key is text, so global
//! single-letter shortcuts must not fire.

use crate::logging::{log_debug_content, ContentKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;

const SCROLLBACK_LIMIT: usize = 500;
const INPUT_LIMIT: usize = 400;
/// Scrollback borders plus the three-row input box.
const CHAT_CHROME_ROWS: u16 = 5;

#[derive(Debug, Default)]
pub struct ChatPane {
    lines: VecDeque<String>,
    input: String,
    input_focused: bool,
    scroll: usize,
    visible_rows: usize,
}

impl ChatPane {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut pane = Self::default();
        pane.resize(cols, rows);
        pane.push_line("* Chat. [Enter] to type, [Esc] to stop typing, [Tab] back to the player.");
        pane
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    /// Lines scrolled up from the bottom.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Scrollback lines that fit on screen at the current terminal size.
    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Re-fit the scrollback window; a shrink keeps the view inside the history.
    pub fn resize(&mut self, _cols: u16, rows: u16) {
        self.visible_rows = usize::from(rows.saturating_sub(CHAT_CHROME_ROWS)).max(1);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Furthest the view can move up before the oldest line reaches the top.
    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.visible_rows)
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        if self.lines.len() == SCROLLBACK_LIMIT {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.input_focused {
            self.handle_input_key(key);
            return;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char('i') => self.input_focused = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::End => self.scroll = 0,
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_focused = false,
            KeyCode::Enter => {
                let text = self.input.trim().to_string();
                self.input.clear();
                if !text.is_empty() {
                    log_debug_content(ContentKind::Chat, &text);
                    self.push_line(format!("> {text}"));
                    self.scroll = 0;
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.input.chars().count() < INPUT_LIMIT && !c.is_control() {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }
}
