//! Inventory screen widgets: the slot grid and the hovered-item tooltip.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use skyfall_core::item::{ItemStack, Slot, SlotContainer};
use unicode_width::UnicodeWidthChar;

use crate::canvas::{CanvasView, TextCanvas};

pub const CELL_WIDTH: u16 = 8;
pub const CELL_HEIGHT: u16 = 2;
pub const COLUMNS: usize = 9;

/// One slot as resolved for the current frame.
///
/// `backdrop` is the slot-sized canvas the slot render events drew on;
/// `shown`, `hidden` and `tooltip_hidden` are read back from the main
/// slot render event.
#[derive(Debug, Clone)]
pub struct SlotView {
    pub slot: Slot,
    pub shown: ItemStack,
    pub hidden: bool,
    pub tooltip_hidden: bool,
    pub backdrop: TextCanvas,
}

impl SlotView {
    pub fn plain(slot: Slot) -> Self {
        Self {
            shown: slot.stack.clone(),
            slot,
            hidden: false,
            tooltip_hidden: false,
            backdrop: TextCanvas::new(CELL_WIDTH, CELL_HEIGHT),
        }
    }
}

/// Grid position of the `index`-th view. Player slots sit one row below
/// the container rows.
fn grid_position(index: usize, view: &SlotView) -> (u16, u16) {
    let gap = u16::from(view.slot.container == SlotContainer::Player);
    let col = (index % COLUMNS) as u16;
    let row = (index / COLUMNS) as u16 + gap;
    (col, row)
}

/// Inner size needed to show `views`, in cells.
pub fn grid_size(views: &[SlotView]) -> (u16, u16) {
    let rows = views
        .iter()
        .enumerate()
        .map(|(i, v)| grid_position(i, v).1 + 1)
        .max()
        .unwrap_or(0);
    (COLUMNS as u16 * CELL_WIDTH, rows * CELL_HEIGHT)
}

fn truncate(text: &str, width: u16) -> String {
    let mut used = 0u16;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0) as u16;
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// The slot grid of an open screen.
pub struct InventoryGrid<'a> {
    pub title: &'a str,
    pub views: &'a [SlotView],
    pub cursor: usize,
}

impl Widget for InventoryGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title(self.title);
        let inner = block.inner(area);
        block.render(area, buf);

        for (i, view) in self.views.iter().enumerate() {
            let (col, row) = grid_position(i, view);
            let rect = Rect::new(
                inner.x + col * CELL_WIDTH,
                inner.y + row * CELL_HEIGHT,
                CELL_WIDTH,
                CELL_HEIGHT,
            )
            .intersection(inner);
            if rect.is_empty() {
                continue;
            }

            CanvasView(&view.backdrop).render(rect, buf);

            if view.hidden || view.shown.is_empty() {
                buf.set_string(rect.x, rect.y, "·", Style::default().fg(Color::DarkGray));
            } else {
                let label = truncate(&view.shown.name, CELL_WIDTH - 1);
                buf.set_string(rect.x, rect.y, label, Style::default().fg(Color::White));
                if view.shown.count > 1 && rect.height > 1 {
                    let count = view.shown.count.to_string();
                    let x = rect.right().saturating_sub(count.len() as u16 + 1);
                    buf.set_string(x, rect.y + 1, count, Style::default().fg(Color::Yellow));
                }
            }

            if i == self.cursor {
                buf.set_style(rect, Style::default().add_modifier(Modifier::REVERSED));
            }
        }
    }
}

/// Name, lore and position of the hovered slot.
pub struct Tooltip<'a>(pub Option<&'a SlotView>);

impl Widget for Tooltip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::new();
        match self.0 {
            Some(view) if view.tooltip_hidden => {}
            Some(view) if view.shown.is_empty() => lines.push(Line::from("Empty slot")),
            Some(view) => {
                let stack = &view.shown;
                lines.push(Line::styled(
                    stack.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                if stack.count > 1 {
                    lines.push(Line::from(format!("x{}", stack.count)));
                }
                lines.extend(stack.lore.iter().map(|l| Line::from(l.clone())));
                let container = match view.slot.container {
                    SlotContainer::Chest => "container",
                    SlotContainer::Player => "inventory",
                };
                lines.push(Line::styled(
                    format!("slot {} ({container})", view.slot.index),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            None => {}
        }

        Paragraph::new(lines)
            .block(Block::bordered().title("Item"))
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfall_core::canvas::{Canvas, Rgb};

    fn views() -> Vec<SlotView> {
        let mut views: Vec<SlotView> = (0..9)
            .map(|i| SlotView::plain(Slot::new(i, i as i32, SlotContainer::Chest, ItemStack::empty())))
            .collect();
        views.push(SlotView::plain(Slot::new(
            0,
            9,
            SlotContainer::Player,
            ItemStack::new("stone", "Stone").with_count(12),
        )));
        views
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn player_rows_are_offset_by_a_gap() {
        let v = views();
        assert_eq!(grid_position(8, &v[8]), (8, 0));
        assert_eq!(grid_position(9, &v[9]), (0, 2));
        assert_eq!(grid_size(&v), (COLUMNS as u16 * CELL_WIDTH, 3 * CELL_HEIGHT));
    }

    #[test]
    fn truncate_counts_display_width() {
        assert_eq!(truncate("Enchanted Book", 7), "Enchant");
        assert_eq!(truncate("日本語", 5), "日本");
    }

    #[test]
    fn grid_draws_labels_counts_and_hidden_slots() {
        let mut v = views();
        v[1].shown = ItemStack::new("pet", "[Lvl 9] Bee");
        v[2].shown = ItemStack::new("pet", "[Lvl 1] Ant");
        v[2].hidden = true;
        v[3].backdrop.fill(0, 0, CELL_WIDTH, CELL_HEIGHT, Rgb::GOLD);

        let (w, h) = grid_size(&v);
        let area = Rect::new(0, 0, w + 2, h + 2);
        let mut buf = Buffer::empty(area);
        InventoryGrid {
            title: "Pets",
            views: &v,
            cursor: 1,
        }
        .render(area, &mut buf);

        let first = row(&buf, 1);
        assert!(first.contains("[Lvl 9]"));
        assert!(!first.contains("Ant"));
        assert_eq!(buf[(1 + 3 * CELL_WIDTH, 1)].bg, Color::Rgb(0xFF, 0xAA, 0x00));
        assert!(buf[(1 + CELL_WIDTH, 1)].modifier.contains(Modifier::REVERSED));
        assert!(row(&buf, 6).contains("12"));
    }

    #[test]
    fn tooltip_respects_hidden_flag() {
        let mut view = SlotView::plain(Slot::new(
            10,
            10,
            SlotContainer::Chest,
            ItemStack::new("pet", "[Lvl 9] Bee").with_lore(["Click to summon"]),
        ));
        let area = Rect::new(0, 0, 30, 6);

        let mut buf = Buffer::empty(area);
        Tooltip(Some(&view)).render(area, &mut buf);
        assert!(row(&buf, 1).contains("[Lvl 9] Bee"));
        assert!(row(&buf, 2).contains("Click to summon"));

        view.tooltip_hidden = true;
        let mut buf = Buffer::empty(area);
        Tooltip(Some(&view)).render(area, &mut buf);
        assert!(!row(&buf, 1).contains("Bee"));
    }
}
