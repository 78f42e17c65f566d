use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct HostRects {
    pub top: Rect,
    pub hud: Rect,
    pub inventory: Rect,
    pub tooltip: Rect,
    pub help: Rect,
}

/// Top bar, HUD strip, then the inventory grid beside its tooltip, with a
/// key-hint line at the bottom.
///
/// `grid` is the inner size of the inventory grid; the grid gets exactly
/// that plus its border and the tooltip takes the rest of the row.
pub fn host_layout(area: Rect, hud_height: u16, grid: (u16, u16)) -> HostRects {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(hud_height.max(3)),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(grid.0 + 2), Constraint::Min(10)])
        .split(rows[2]);

    let inventory = Rect {
        height: body[0].height.min(grid.1 + 2),
        ..body[0]
    };

    HostRects {
        top: rows[0],
        hud: rows[1],
        inventory,
        tooltip: body[1],
        help: rows[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_stack_and_fit() {
        let area = Rect::new(0, 0, 120, 40);
        let r = host_layout(area, 6, (72, 14));
        assert_eq!(r.top.height, 1);
        assert_eq!(r.hud.height, 6);
        assert_eq!(r.help.y, 39);
        assert_eq!(r.inventory.width, 74);
        assert_eq!(r.inventory.height, 16);
        assert_eq!(r.tooltip.x, 74);
        assert_eq!(r.tooltip.width, 46);
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let r = host_layout(Rect::new(0, 0, 10, 4), 6, (72, 14));
        assert!(r.inventory.height <= 4);
    }
}
