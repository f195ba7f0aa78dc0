//! Layout calculations for the tracker TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Calculate the main layout areas
pub struct AppLayout {
    pub title_area: Rect,
    pub table_area: Rect,
    pub info_area: Rect,
    pub button_bar: Rect,
    pub input_area: Rect,
}

impl AppLayout {
    /// Calculate layout based on terminal size
    pub fn calculate(area: Rect) -> Self {
        // Main vertical split
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Min(8),    // Table + info box
                Constraint::Length(1), // Button bar
                Constraint::Length(3), // Input line
            ])
            .split(area);

        // Content area: table + info box
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[1]);

        Self {
            title_area: main_chunks[0],
            table_area: content_chunks[0],
            info_area: content_chunks[1],
            button_bar: main_chunks[2],
            input_area: main_chunks[3],
        }
    }
}

/// Calculate fixed-size centered popup
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_covers_screen() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = AppLayout::calculate(area);
        assert_eq!(layout.title_area.height, 1);
        assert_eq!(layout.input_area.height, 3);
        assert_eq!(layout.table_area.width + layout.info_area.width, 100);
        assert_eq!(layout.table_area.width, 60);
        assert_eq!(layout.button_bar.y, 26);
    }

    #[test]
    fn test_centered_popup_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered_rect_fixed(50, 30, area);
        assert_eq!(popup, Rect::new(0, 0, 20, 10));

        let popup = centered_rect_fixed(10, 4, area);
        assert_eq!(popup, Rect::new(5, 3, 10, 4));
    }
}
