use std::cell::RefCell;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use skyfall_core::canvas::{Canvas, DrawContext, Rgb};
use unicode_width::UnicodeWidthChar;

/// Marks the right half of a double-width character.
const CONTINUATION: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasCell {
    pub symbol: char,
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
}

impl Default for CanvasCell {
    fn default() -> Self {
        Self {
            symbol: ' ',
            fg: None,
            bg: None,
        }
    }
}

/// A character-cell [`Canvas`].
///
/// Features draw into it during render events; [`CanvasView`] copies it
/// into a ratatui buffer afterwards. Everything outside the canvas is
/// clipped.
#[derive(Debug, Clone, Default)]
pub struct TextCanvas {
    width: u16,
    height: u16,
    cells: Vec<CanvasCell>,
}

impl TextCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![CanvasCell::default(); width as usize * height as usize],
        }
    }

    /// A shared canvas plus a [`DrawContext`] over it.
    pub fn context(width: u16, height: u16) -> (DrawContext, Rc<RefCell<TextCanvas>>) {
        let canvas = Rc::new(RefCell::new(Self::new(width, height)));
        (DrawContext::new(canvas.clone()), canvas)
    }

    /// Resize and clear. A no-op clear when the size is unchanged.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        } else {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(CanvasCell::default());
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&CanvasCell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Text of row `y`, for tests and logs.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.cell(x, y))
            .map(|c| c.symbol)
            .filter(|&c| c != CONTINUATION)
            .collect()
    }

    /// Background of the top-left cell, if any feature filled it.
    pub fn backdrop(&self) -> Option<Rgb> {
        self.cell(0, 0).and_then(|c| c.bg)
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}

impl Canvas for TextCanvas {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw_text(&mut self, x: u16, y: u16, text: &str, color: Rgb) {
        let mut col = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if col.saturating_add(width) > self.width {
                break;
            }
            if let Some(i) = self.index(col, y) {
                self.cells[i].symbol = ch;
                self.cells[i].fg = Some(color);
            }
            if width == 2 {
                if let Some(i) = self.index(col + 1, y) {
                    self.cells[i].symbol = CONTINUATION;
                }
            }
            col += width;
        }
    }

    fn fill(&mut self, x: u16, y: u16, width: u16, height: u16, color: Rgb) {
        let right = x.saturating_add(width).min(self.width);
        let bottom = y.saturating_add(height).min(self.height);
        for row in y..bottom {
            for col in x..right {
                if let Some(i) = self.index(col, row) {
                    self.cells[i].bg = Some(color);
                }
            }
        }
    }
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Copies a [`TextCanvas`] into a ratatui buffer at the area's origin.
pub struct CanvasView<'a>(pub &'a TextCanvas);

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.0.size();
        for y in 0..height.min(area.height) {
            for x in 0..width.min(area.width) {
                let Some(src) = self.0.cell(x, y) else {
                    continue;
                };
                let Some(dst) = buf.cell_mut((area.x + x, area.y + y)) else {
                    continue;
                };
                if src.symbol == CONTINUATION {
                    dst.set_char(' ');
                } else if src.symbol != ' ' || src.bg.is_some() {
                    dst.set_char(src.symbol);
                }
                if let Some(fg) = src.fg {
                    dst.set_fg(to_color(fg));
                }
                if let Some(bg) = src.bg {
                    dst.set_bg(to_color(bg));
                }
            }
        }
    }
}
