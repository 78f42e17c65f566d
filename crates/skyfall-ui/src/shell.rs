use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::canvas::{CanvasView, TextCanvas};
use crate::inventory::{InventoryGrid, SlotView, Tooltip};
use crate::layout::HostRects;

pub struct ShellView<'a> {
    pub screen_title: &'a str,
    pub status_line: &'a str,
    pub hud: &'a TextCanvas,
    pub views: &'a [SlotView],
    pub cursor: usize,
}

const KEY_HINTS: &str =
    "arrows move | enter click | shift+enter quick-move | f favourite | tab screen | h hud | ~ console";

/// Draw everything except the console.
pub fn render_shell(f: &mut Frame, rects: HostRects, view: ShellView<'_>) {
    let top = Line::from(vec![
        Span::styled(
            " SKYFALL ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} | {}", view.screen_title, view.status_line)),
    ]);
    f.render_widget(Paragraph::new(top), rects.top);

    let hud_block = Block::bordered().title("HUD");
    let hud_inner = hud_block.inner(rects.hud);
    f.render_widget(hud_block, rects.hud);
    f.render_widget(CanvasView(view.hud), hud_inner);

    f.render_widget(
        InventoryGrid {
            title: view.screen_title,
            views: view.views,
            cursor: view.cursor,
        },
        rects.inventory,
    );
    f.render_widget(Tooltip(view.views.get(view.cursor)), rects.tooltip);

    f.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().fg(Color::DarkGray)),
        rects.help,
    );
}

/// Inner HUD size for `rects`, which the host sizes its HUD canvas to.
pub fn hud_canvas_size(rects: &HostRects) -> (u16, u16) {
    let inner = Block::bordered().inner(rects.hud);
    (inner.width, inner.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::grid_size;
    use crate::layout::host_layout;
    use ratatui::{backend::TestBackend, Terminal};
    use skyfall_core::canvas::{Canvas, Rgb};
    use skyfall_core::item::{ItemStack, Slot, SlotContainer};

    #[test]
    fn shell_shows_title_hud_and_grid() {
        let views: Vec<SlotView> = (0..9)
            .map(|i| {
                SlotView::plain(Slot::new(
                    i,
                    i as i32,
                    SlotContainer::Chest,
                    ItemStack::new("stone", "Stone"),
                ))
            })
            .collect();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal
            .draw(|f| {
                let rects = host_layout(f.area(), 4, grid_size(&views));
                let (w, h) = hud_canvas_size(&rects);
                let mut hud = TextCanvas::new(w, h);
                hud.draw_text(0, 0, "Session 5s", Rgb::AQUA);
                render_shell(
                    f,
                    rects,
                    ShellView {
                        screen_title: "Storage",
                        status_line: "2 features running",
                        hud: &hud,
                        views: &views,
                        cursor: 0,
                    },
                );
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String { (0..120).map(|x| buffer[(x, y)].symbol()).collect() };
        assert!(row(0).contains("Storage | 2 features running"));
        assert!(row(2).contains("Session 5s"));
        assert!(row(6).contains("Stone"));
    }
}
