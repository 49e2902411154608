//! ANSI-colored text (video frames, composited visualizer) → styled ratatui lines.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use vte::{Params, Parser as VteParser, Perform};

/// Convert text carrying SGR foreground colors into lines of styled spans.
///
/// Only `0` (reset), `39` (default foreground) and `38;2;r;g;b` are honored;
/// every other escape sequence is dropped. `base` is the style text starts in
/// and returns to on reset.
pub fn ansi_to_lines(text: &str, base: Style) -> Vec<Line<'static>> {
    let mut parser = VteParser::new();
    let mut collector = SpanCollector::new(base);
    parser.advance(&mut collector, text.as_bytes());
    collector.finish()
}

struct SpanCollector {
    base: Style,
    style: Style,
    run: String,
    spans: Vec<Span<'static>>,
    lines: Vec<Line<'static>>,
}

impl SpanCollector {
    fn new(base: Style) -> Self {
        Self {
            base,
            style: base,
            run: String::new(),
            spans: Vec::new(),
            lines: Vec::new(),
        }
    }

    fn flush_run(&mut self) {
        if !self.run.is_empty() {
            let text = std::mem::take(&mut self.run);
            self.spans.push(Span::styled(text, self.style));
        }
    }

    fn end_line(&mut self) {
        self.flush_run();
        let spans = std::mem::take(&mut self.spans);
        self.lines.push(Line::from(spans));
    }

    fn set_style(&mut self, style: Style) {
        if style != self.style {
            self.flush_run();
            self.style = style;
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.run.is_empty() || !self.spans.is_empty() {
            self.end_line();
        }
        self.lines
    }
}

impl Perform for SpanCollector {
    fn print(&mut self, c: char) {
        self.run.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.end_line(),
            b'\t' => self.run.push(' '),
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], ignore: bool, action: char) {
        if ignore || action != 'm' {
            return;
        }
        let values: Vec<u16> = params.iter().flatten().copied().collect();
        if values.is_empty() {
            self.set_style(self.base);
            return;
        }
        let mut style = self.style;
        let mut i = 0;
        while i < values.len() {
            match values[i] {
                0 => style = self.base,
                39 => style = style.fg(self.base.fg.unwrap_or(Color::Reset)),
                38 if values.get(i + 1) == Some(&2) && i + 4 < values.len() => {
                    let channel = |v: u16| v.min(255) as u8;
                    style = style.fg(Color::Rgb(
                        channel(values[i + 2]),
                        channel(values[i + 3]),
                        channel(values[i + 4]),
                    ));
                    i += 4;
                }
                _ => {}
            }
            i += 1;
        }
        self.set_style(style);
    }
}
