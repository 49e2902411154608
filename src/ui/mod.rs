//! ratatui rendering of whichever view owns the terminal.

mod ansi;

pub use ansi::ansi_to_lines;

use crate::audio::Playback;
use crate::compositor::{palette_for, AsciiCompositor, Rgb, EASTER_EGG};
use crate::config::Layout as PanelLayout;
use crate::controller::{PlayerState, RootController, ViewState};
use crate::stations::StationCatalog;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Lines of the diagnostic log the monitor shows.
pub const MONITOR_LINES: usize = 400;

const ACCENT: Color = Color::Rgb(0xff, 0x38, 0x6f);
const TITLE: Color = Color::Rgb(0xff, 0xd7, 0x5f);
const DIM: Color = Color::Rgb(0x88, 0x88, 0x88);
const MUTED: Color = Color::Rgb(0xaa, 0xaa, 0xaa);
const ERROR: Color = Color::Rgb(255, 90, 90);

const STATION_LIST_TITLE: &str = " ↑/↓ Navigate · [↵] Play/Pause · [H] Help ";
const NO_VIDEO: &str = "This station has no video stream. ←/→ switch · [Q] back";
const LOADING_VIDEO: &str = "Loading video…";

const HELP_BOX: &str = "\
┌──────────── HELP ────────────┐
│ ↑/↓, j/k  Navigate stations  │
│ Enter     Play/Pause         │
│ L         Toggle layout      │
│ H         Show/hide help     │
│ D         Fullscreen         │
│ M         Monitor logs       │
│ Y         YouTube ASCII      │
│ Z         Easter egg         │
│ Q,Ctrl+C  Quit               │
└──────────────────────────────┘";

pub fn draw<P: Playback>(frame: &mut Frame<'_>, controller: &RootController<P>) {
    match controller.view() {
        ViewState::Player => draw_player(frame, controller),
        ViewState::Chat => draw_chat(frame, controller),
        ViewState::VideoAscii => draw_video(frame, controller),
        // The child owns the screen; nothing is drawn until it exits.
        ViewState::ExternalFullscreen => {}
    }
}

fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

fn draw_player<P: Playback>(frame: &mut Frame<'_>, controller: &RootController<P>) {
    let area = frame.size();
    let player = controller.player();
    let stations = controller.stations();

    if player.show_monitor {
        draw_monitor(frame, area, &controller.diag().last(MONITOR_LINES));
        return;
    }
    if player.easter_egg {
        let egg = Paragraph::new(EASTER_EGG).style(Style::default().fg(ACCENT));
        frame.render_widget(egg, area);
        return;
    }

    let visual = visual_text(player, stations);
    let visual_width = visual.width() as u16;
    let visual_height = visual.height() as u16;
    let header = header_text(player, stations);

    let (visual_area, header_area, list_area) = match player.layout {
        PanelLayout::Horizontal => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(visual_width + 1), Constraint::Min(20)])
                .split(area);
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Length(2),
                    Constraint::Min(3),
                ])
                .split(columns[1]);
            (columns[0], right[1], right[2])
        }
        PanelLayout::Vertical => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(visual_height),
                    Constraint::Length(2),
                    Constraint::Min(3),
                ])
                .split(area);
            let indented = Rect {
                x: rows[0].x.saturating_add(1),
                width: rows[0].width.saturating_sub(1),
                ..rows[0]
            };
            (indented, rows[1], rows[2])
        }
    };

    frame.render_widget(Paragraph::new(visual), visual_area);
    frame.render_widget(Paragraph::new(header), header_area);
    frame.render_widget(station_list(player, stations), list_area);

    if let Some(error) = &player.error {
        let bottom = Rect {
            y: area.bottom().saturating_sub(1),
            height: area.height.min(1),
            ..area
        };
        let line = Line::from(vec![
            Span::styled(format!(" ⚠ {error} "), Style::default().fg(ERROR)),
            Span::styled("[X] dismiss", Style::default().fg(DIM)),
        ]);
        frame.render_widget(Paragraph::new(line), bottom);
    }
}

fn draw_monitor(frame: &mut Frame<'_>, area: Rect, lines: &[String]) {
    let inner_height = usize::from(area.height.saturating_sub(2));
    let scroll = lines.len().saturating_sub(inner_height);
    let text: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();
    let monitor = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(DIM))
                .title(Span::styled(
                    "Monitor [M to exit]",
                    Style::default().fg(TITLE),
                )),
        )
        .scroll((scroll.min(usize::from(u16::MAX)) as u16, 0));
    frame.render_widget(monitor, area);
}

/// Help box or the composited visualizer for the playing station.
fn visual_text(player: &PlayerState, stations: &StationCatalog) -> Text<'static> {
    if player.show_help {
        return Text::styled(HELP_BOX, Style::default().fg(ACCENT));
    }
    let icon_key = player
        .playing
        .and_then(|index| stations.get(index))
        .map(|s| s.icon_key())
        .unwrap_or_else(|| "nrfm".to_string());
    let frame = AsciiCompositor::for_station(&icon_key).render(player.envelope.heights());
    Text::from(ansi_to_lines(&frame, Style::default()))
}

fn header_text(player: &PlayerState, stations: &StationCatalog) -> Text<'static> {
    let style = Style::default().fg(TITLE);
    match player.playing.and_then(|index| stations.get(index)) {
        Some(station) => {
            let title = player.playing_title(stations).unwrap_or_default();
            Text::from(vec![
                Line::styled(format!("  {}", station.name), style),
                Line::styled(format!("  ▶ {title}"), style),
            ])
        }
        None => Text::from(Line::raw("  ▐▐ PAUSED")),
    }
}

/// Two lines per station, starting at the player's list window.
fn station_list(player: &PlayerState, stations: &StationCatalog) -> Paragraph<'static> {
    let mut lines = Vec::with_capacity(stations.len() * 2);
    for (index, station) in stations.iter().enumerate() {
        let selected = index == player.selected;
        let marker = if player.playing == Some(index) { "▶ " } else { "  " };
        let name_style = if selected {
            let palette = palette_for(&station.icon_key());
            Style::default()
                .fg(rgb(palette.top))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if selected { "│ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(cursor, name_style),
            Span::styled(format!("{marker}{}", station.name), name_style),
        ]));
        let title = player.list_title(index, stations);
        lines.push(Line::styled(format!("    {title}"), Style::default().fg(DIM)));
    }

    let scroll = player.list_top() * 2;
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(DIM))
                .title(Span::styled(STATION_LIST_TITLE, Style::default().fg(ACCENT))),
        )
        .scroll((scroll.min(usize::from(u16::MAX)) as u16, 0))
}

fn draw_chat<P: Playback>(frame: &mut Frame<'_>, controller: &RootController<P>) {
    let chat = controller.chat();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(frame.size());

    let inner_height = usize::from(chunks[0].height.saturating_sub(2));
    let lines: Vec<&str> = chat.lines().collect();
    let end = lines.len().saturating_sub(chat.scroll());
    let start = end.saturating_sub(inner_height);
    let visible: Vec<Line> = lines[start..end].iter().map(|l| Line::from(*l)).collect();

    let scrollback = Paragraph::new(visible).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT))
            .title(Span::styled(
                " Chat ",
                Style::default().fg(TITLE).add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Span::styled(
                " [Tab] player ",
                Style::default().fg(DIM),
            )),
    );
    frame.render_widget(scrollback, chunks[0]);

    let border = if chat.input_focused() { TITLE } else { DIM };
    let hint = if chat.input_focused() {
        " [Esc] stop typing "
    } else {
        " [Enter] type "
    };
    let input = Paragraph::new(chat.input()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title_bottom(Span::styled(hint, Style::default().fg(DIM))),
    );
    frame.render_widget(input, chunks[1]);

    if chat.input_focused() {
        let inner_width = chunks[1].width.saturating_sub(2);
        let input_width = UnicodeWidthStr::width(chat.input()).min(usize::from(u16::MAX)) as u16;
        let cursor_x = chunks[1]
            .x
            .saturating_add(1)
            .saturating_add(input_width.min(inner_width));
        frame.set_cursor(cursor_x, chunks[1].y + 1);
    }
}

fn draw_video<P: Playback>(frame: &mut Frame<'_>, controller: &RootController<P>) {
    let video = controller.video();
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let station = controller.stations().get(video.station);
    let mut head = format!(
        "  YouTube ASCII · {}",
        station.map(|s| s.name.as_str()).unwrap_or_default()
    );
    if let Some(meta) = station.map(|s| s.now_playing.as_str()).filter(|m| !m.is_empty()) {
        head.push_str(" · ");
        head.push_str(meta);
    }
    frame.render_widget(
        Paragraph::new(Line::styled(head, Style::default().fg(TITLE))),
        chunks[0],
    );

    let width = usize::from(area.width.max(10));
    if !video.has_video || video.loading {
        let message = if video.loading { LOADING_VIDEO } else { NO_VIDEO };
        let centered = Rect {
            y: chunks[1].y + chunks[1].height / 2,
            height: chunks[1].height.min(1),
            ..chunks[1]
        };
        frame.render_widget(
            Paragraph::new(Line::styled(
                center_line(message, width),
                Style::default().fg(MUTED),
            )),
            centered,
        );
    } else {
        let lines = ansi_to_lines(&video.frame, Style::default());
        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    let controls = format!(
        "[←/→] station · [C] {} · [Q] quit",
        video.toggle_label()
    );
    frame.render_widget(
        Paragraph::new(Line::styled(controls, Style::default().fg(DIM))),
        chunks[2],
    );
}

/// Left-pad `text` so it sits in the middle of `width` columns.
fn center_line(text: &str, width: usize) -> String {
    let text_width = UnicodeWidthStr::width(text);
    if text_width >= width {
        return text.to_string();
    }
    format!("{}{text}", " ".repeat((width - text_width) / 2))
}
