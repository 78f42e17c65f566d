use std::collections::VecDeque;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use skyfall_core::logging::{LogEntry, LogLevel};
use unicode_width::UnicodeWidthStr;

/// Drop-down console: scrollback plus a one-line command input.
pub struct Console {
    visible: bool,
    lines: VecDeque<LogEntry>,
    pub input: String,
    /// Byte offset of the cursor in `input`.
    pub cursor: usize,
    scroll: usize,
    max_lines: usize,
    history: Vec<String>,
    history_pos: Option<usize>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Console {
    pub fn new(max_lines: usize) -> Self {
        Self {
            visible: false,
            lines: VecDeque::with_capacity(max_lines),
            input: String::new(),
            cursor: 0,
            scroll: 0,
            max_lines,
            history: Vec::new(),
            history_pos: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.lines.len() >= self.max_lines {
            self.lines.pop_front();
            self.scroll = self.scroll.saturating_sub(1);
        }
        self.lines.push_back(entry);
    }

    /// Append command output as `console` info lines.
    pub fn print(&mut self, message: impl Into<String>) {
        self.push(LogEntry {
            level: LogLevel::Info,
            target: "console".into(),
            message: message.into(),
        });
    }

    pub fn lines(&self) -> &VecDeque<LogEntry> {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn scroll_up(&mut self, amount: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll = (self.scroll + amount).min(max);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.input.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.input[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Step back through submitted commands.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            Some(pos) => pos.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.recall(Some(pos));
    }

    pub fn history_next(&mut self) {
        match self.history_pos {
            Some(pos) if pos + 1 < self.history.len() => self.recall(Some(pos + 1)),
            Some(_) => self.recall(None),
            None => {}
        }
    }

    /// Take the input line, remembering it in history when non-blank.
    pub fn submit(&mut self) -> String {
        let input = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.history_pos = None;
        if !input.trim().is_empty() && self.history.last() != Some(&input) {
            self.history.push(input.clone());
        }
        input
    }

    fn recall(&mut self, pos: Option<usize>) {
        self.history_pos = pos;
        self.input = pos
            .and_then(|p| self.history.get(p).cloned())
            .unwrap_or_default();
        self.cursor = self.input.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }
}

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Green,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Trace => Color::DarkGray,
    }
}

/// Draw the console over the top half of `area`: title bar, scrollback
/// and input line.
pub fn render_console(f: &mut Frame, area: Rect, console: &Console, tps: f64) {
    let height = (area.height / 2).max(3).min(area.height);
    if height < 3 {
        return;
    }
    let overlay = Rect { height, ..area };
    f.render_widget(Clear, overlay);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(overlay);

    let title = Line::from(vec![
        Span::styled(
            " CONSOLE ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  TPS: {tps:.1}  ")),
        Span::styled("~ to close, 'help' for commands", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray).fg(Color::White)),
        chunks[0],
    );

    let visible = chunks[1].height as usize;
    let total = console.lines().len();
    let end = total.saturating_sub(console.scroll_offset());
    let start = end.saturating_sub(visible);

    let lines: Vec<Line> = console
        .lines()
        .range(start..end)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!(" {:5} ", entry.level),
                    Style::default()
                        .fg(level_color(entry.level))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("[{}] ", entry.target),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.message.as_str()),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::RIGHT)
                    .style(Style::default().bg(Color::Black)),
            )
            .wrap(Wrap { trim: false }),
        chunks[1],
    );

    let input = Line::from(vec![
        Span::styled(
            "> ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(console.input.as_str()),
    ]);
    f.render_widget(
        Paragraph::new(input).style(Style::default().bg(Color::Black).fg(Color::White)),
        chunks[2],
    );

    let col = console.input[..console.cursor].width() as u16;
    f.set_cursor_position((chunks[2].x + 2 + col, chunks[2].y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn typed(console: &mut Console, text: &str) {
        for c in text.chars() {
            console.insert_char(c);
        }
    }

    #[test]
    fn scrollback_is_capped() {
        let mut c = Console::new(3);
        for i in 0..5 {
            c.print(format!("msg {i}"));
        }
        assert_eq!(c.lines().len(), 3);
        assert_eq!(c.lines()[0].message, "msg 2");
    }

    #[test]
    fn scroll_clamps() {
        let mut c = Console::new(100);
        for i in 0..10 {
            c.print(format!("msg {i}"));
        }
        c.scroll_up(100);
        assert_eq!(c.scroll_offset(), 9);
        c.scroll_down(4);
        assert_eq!(c.scroll_offset(), 5);
        c.clear();
        assert_eq!(c.scroll_offset(), 0);
    }

    #[test]
    fn editing_respects_char_boundaries() {
        let mut c = Console::default();
        typed(&mut c, "aé");
        c.cursor_left();
        c.insert_char('x');
        assert_eq!(c.input, "axé");
        c.cursor_right();
        c.backspace();
        assert_eq!(c.input, "ax");
        c.cursor_right();
        assert_eq!(c.cursor, 2);
    }

    #[test]
    fn history_walks_submitted_commands() {
        let mut c = Console::default();
        typed(&mut c, "sync");
        assert_eq!(c.submit(), "sync");
        typed(&mut c, "stats");
        c.submit();
        c.submit();

        c.history_prev();
        assert_eq!(c.input, "stats");
        c.history_prev();
        assert_eq!(c.input, "sync");
        c.history_prev();
        assert_eq!(c.input, "sync");
        c.history_next();
        assert_eq!(c.input, "stats");
        c.history_next();
        assert!(c.input.is_empty());
    }

    #[test]
    fn renders_title_and_input() {
        let mut c = Console::default();
        c.print("hello there");
        typed(&mut c, "help");

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal
            .draw(|f| render_console(f, f.area(), &c, 10.0))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String { (0..60).map(|x| buffer[(x, y)].symbol()).collect() };
        assert!(row(0).contains("CONSOLE"));
        assert!(row(1).contains("hello there"));
        assert!(row(4).starts_with("> help"));
    }
}
