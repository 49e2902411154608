//! Station list, transport state and visualizer of the player view.

use crate::audio::VisualizerEnvelope;
use crate::config::{Layout, TITLE_GAP, TITLE_WINDOW};
use crate::stations::StationCatalog;
use crossterm::event::{KeyCode, KeyEvent};

/// Blank row plus the two header lines above the station list.
const HEADER_ROWS: u16 = 3;
/// Each station takes a name line and a title line.
const ROWS_PER_STATION: usize = 2;

/// What the player asks its owner to do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    None,
    Play(usize),
    Stop,
    Quit,
}

#[derive(Debug)]
pub struct PlayerState {
    pub selected: usize,
    pub playing: Option<usize>,
    pub layout: Layout,
    pub show_help: bool,
    pub show_monitor: bool,
    pub easter_egg: bool,
    /// Last audio failure, shown until dismissed.
    pub error: Option<String>,
    pub scroll_offset: usize,
    pub list_scroll_offset: usize,
    pub envelope: VisualizerEnvelope,
    visual_rows: u16,
    terminal_rows: u16,
    list_rows: usize,
    list_top: usize,
}

impl PlayerState {
    pub fn new(layout: Layout, selected: usize, bars: usize, rows: usize) -> Self {
        Self {
            selected,
            playing: None,
            layout,
            show_help: false,
            show_monitor: false,
            easter_egg: false,
            error: None,
            scroll_offset: 0,
            list_scroll_offset: 0,
            envelope: VisualizerEnvelope::new(bars, rows),
            visual_rows: u16::try_from(rows).unwrap_or(u16::MAX),
            terminal_rows: 0,
            list_rows: 0,
            list_top: 0,
        }
    }

    /// First station shown in the list window.
    pub fn list_top(&self) -> usize {
        self.list_top
    }

    /// Stations that fit in the list window at the current size and layout.
    pub fn visible_stations(&self) -> usize {
        (self.list_rows.saturating_sub(2) / ROWS_PER_STATION).max(1)
    }

    /// Recompute the list window for a `cols`×`rows` terminal.
    pub fn resize(&mut self, _cols: u16, rows: u16, station_count: usize) {
        self.terminal_rows = rows;
        self.layout_list(station_count);
    }

    fn layout_list(&mut self, station_count: usize) {
        let list_rows = match self.layout {
            Layout::Horizontal => self.terminal_rows.saturating_sub(HEADER_ROWS),
            Layout::Vertical => self
                .terminal_rows
                .saturating_sub(self.visual_rows.saturating_add(2)),
        };
        self.list_rows = usize::from(list_rows.max(3));
        self.fit_list(station_count);
    }

    /// Move the list window so the selection is inside it and no rows are wasted below.
    fn fit_list(&mut self, station_count: usize) {
        let visible = self.visible_stations();
        if self.selected < self.list_top {
            self.list_top = self.selected;
        } else if self.selected >= self.list_top + visible {
            self.list_top = self.selected + 1 - visible;
        }
        self.list_top = self.list_top.min(station_count.saturating_sub(visible));
    }

    pub fn handle_key(&mut self, key: KeyEvent, stations: &StationCatalog) -> PlayerCommand {
        match key.code {
            KeyCode::Char('m') | KeyCode::Char('M') => self.show_monitor = !self.show_monitor,
            KeyCode::Char('h') | KeyCode::Char('H') => self.show_help = !self.show_help,
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.layout = self.layout.toggled();
                self.layout_list(stations.len());
            }
            KeyCode::Char('z') | KeyCode::Char('Z') => self.easter_egg = !self.easter_egg,
            KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Esc => self.error = None,
            KeyCode::Char('q') | KeyCode::Char('Q') => return PlayerCommand::Quit,
            KeyCode::Enter => {
                if self.playing == Some(self.selected) {
                    self.playing = None;
                    return PlayerCommand::Stop;
                }
                self.playing = Some(self.selected);
                self.scroll_offset = 0;
                self.error = None;
                return PlayerCommand::Play(self.selected);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                self.list_scroll_offset = 0;
                self.fit_list(stations.len());
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < stations.len() {
                    self.selected += 1;
                }
                self.list_scroll_offset = 0;
                self.fit_list(stations.len());
            }
            _ => {}
        }
        PlayerCommand::None
    }

    /// Advance the marquee of the playing title and of the hovered one.
    pub fn scroll_tick(&mut self, stations: &StationCatalog) {
        let long = |index: usize| {
            stations
                .get(index)
                .is_some_and(|s| s.now_playing.chars().count() > TITLE_WINDOW)
        };
        if let Some(playing) = self.playing {
            if long(playing) {
                self.scroll_offset += 1;
            }
        }
        if self.playing != Some(self.selected) && long(self.selected) {
            self.list_scroll_offset += 1;
        }
    }

    /// Title of the playing station as shown in the header.
    pub fn playing_title(&self, stations: &StationCatalog) -> Option<String> {
        let station = stations.get(self.playing?)?;
        Some(scroll_window(&station.now_playing, self.scroll_offset, TITLE_WINDOW))
    }

    /// Title shown under `index` in the station list.
    pub fn list_title(&self, index: usize, stations: &StationCatalog) -> String {
        let Some(station) = stations.get(index) else {
            return String::new();
        };
        if index == self.selected && self.playing != Some(index) {
            scroll_window(&station.now_playing, self.list_scroll_offset, TITLE_WINDOW)
        } else {
            truncate(&station.now_playing, TITLE_WINDOW)
        }
    }
}

/// `width` characters of `title` starting at `offset`, wrapping around through
/// a short gap. Titles that fit are returned unchanged.
pub fn scroll_window(title: &str, offset: usize, width: usize) -> String {
    let len = title.chars().count();
    if len <= width {
        return title.to_string();
    }
    let total = len + TITLE_GAP.chars().count();
    title
        .chars()
        .chain(TITLE_GAP.chars())
        .cycle()
        .skip(offset % total)
        .take(width)
        .collect()
}

fn truncate(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        return title.to_string();
    }
    let mut out: String = title.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
