use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const GRAY: Rgb = Rgb(0xAA, 0xAA, 0xAA);
    pub const GREEN: Rgb = Rgb(0x55, 0xFF, 0x55);
    pub const GOLD: Rgb = Rgb(0xFF, 0xAA, 0x00);
    pub const AQUA: Rgb = Rgb(0x55, 0xFF, 0xFF);
    pub const RED: Rgb = Rgb(0xFF, 0x55, 0x55);

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn parse_hex(raw: &str) -> Option<Rgb> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// The drawing surface a host hands to render events.
///
/// Coordinates are cells relative to the surface's top-left corner; the
/// host decides what a cell means. Draws outside the surface are clipped.
pub trait Canvas {
    fn size(&self) -> (u16, u16);
    fn draw_text(&mut self, x: u16, y: u16, text: &str, color: Rgb);
    fn fill(&mut self, x: u16, y: u16, width: u16, height: u16, color: Rgb);
}

/// Shared, cloneable handle over the host's [`Canvas`].
///
/// Render events carry one of these; features never see the concrete
/// surface type.
#[derive(Clone)]
pub struct DrawContext {
    canvas: Rc<RefCell<dyn Canvas>>,
}

impl DrawContext {
    pub fn new(canvas: Rc<RefCell<dyn Canvas>>) -> Self {
        Self { canvas }
    }

    pub fn size(&self) -> (u16, u16) {
        self.canvas.borrow().size()
    }

    pub fn draw_text(&self, x: u16, y: u16, text: &str, color: Rgb) {
        self.canvas.borrow_mut().draw_text(x, y, text, color);
    }

    pub fn fill(&self, x: u16, y: u16, width: u16, height: u16, color: Rgb) {
        self.canvas.borrow_mut().fill(x, y, width, height, color);
    }
}

/// A canvas that records draw calls instead of rasterising them.
///
/// Used by headless hosts and tests to assert what features drew.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    width: u16,
    height: u16,
    pub ops: Vec<DrawOp>,
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Text { x: u16, y: u16, text: String, color: Rgb },
    Fill { x: u16, y: u16, width: u16, height: u16, color: Rgb },
}

impl RecordingCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Build a recording canvas and a [`DrawContext`] pointing at it.
    pub fn context(width: u16, height: u16) -> (DrawContext, Rc<RefCell<RecordingCanvas>>) {
        let canvas = Rc::new(RefCell::new(Self::new(width, height)));
        (DrawContext::new(canvas.clone()), canvas)
    }

    /// All recorded text, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Fill { .. } => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw_text(&mut self, x: u16, y: u16, text: &str, color: Rgb) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }

    fn fill(&mut self, x: u16, y: u16, width: u16, height: u16, color: Rgb) {
        self.ops.push(DrawOp::Fill {
            x,
            y,
            width,
            height,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_with_and_without_hash() {
        assert_eq!(Rgb::parse_hex("#55FF55"), Some(Rgb::GREEN));
        assert_eq!(Rgb::parse_hex("ffaa00"), Some(Rgb::GOLD));
    }

    #[test]
    fn parse_hex_rejects_garbage() {
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("zzzzzz"), None);
        assert_eq!(Rgb::parse_hex("#ééé"), None);
    }

    #[test]
    fn display_round_trips_hex() {
        assert_eq!(Rgb(1, 2, 255).to_string(), "#0102FF");
    }

    #[test]
    fn context_records_draws() {
        let (ctx, canvas) = RecordingCanvas::context(20, 5);
        assert_eq!(ctx.size(), (20, 5));
        ctx.draw_text(1, 2, "hello", Rgb::WHITE);
        ctx.fill(0, 0, 2, 2, Rgb::RED);
        let canvas = canvas.borrow();
        assert_eq!(canvas.texts(), vec!["hello"]);
        assert_eq!(canvas.ops.len(), 2);
    }
}
