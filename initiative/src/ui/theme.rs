//! Color theme and styling for the tracker TUI

use ratatui::style::{Color, Modifier, Style};

/// Tracker UI color theme
#[derive(Debug, Clone)]
pub struct TrackerTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // HP colors
    pub hp_healthy: Color,
    pub hp_down: Color,
    pub hp_killed: Color,

    // Table colors
    pub header: Color,
    pub selected_row: Color,
    pub focused_cell: Color,
    pub editing: Color,

    // Text colors
    pub effect_text: Color,
    pub system_text: Color,
    pub accent: Color,
}

impl Default for TrackerTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            hp_healthy: Color::Green,
            hp_down: Color::Yellow,
            hp_killed: Color::Red,

            header: Color::Yellow,
            selected_row: Color::Rgb(40, 40, 60),
            focused_cell: Color::Cyan,
            editing: Color::LightGreen,

            effect_text: Color::LightMagenta,
            system_text: Color::DarkGray,
            accent: Color::LightRed,
        }
    }
}

impl TrackerTheme {
    /// Get style for system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Get style for the text being typed
    pub fn input_style(&self) -> Style {
        Style::default()
            .fg(self.editing)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get style for section headings inside panels
    pub fn heading_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get HP color: dropping to zero is a warning, below zero is killed
    pub fn hp_color(&self, hp: i32) -> Color {
        if hp < 0 {
            self.hp_killed
        } else if hp == 0 {
            self.hp_down
        } else {
            self.hp_healthy
        }
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Get style for a table row
    pub fn row_style(&self, is_selected: bool, is_killed: bool) -> Style {
        let mut style = Style::default().fg(self.foreground);
        if is_selected {
            style = style.bg(self.selected_row).add_modifier(Modifier::BOLD);
        }
        if is_killed {
            style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
        }
        style
    }

    /// Get style for the focused cell of the selected row
    pub fn cell_style(&self, is_editing: bool) -> Style {
        if is_editing {
            Style::default()
                .fg(self.editing)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
                .fg(self.focused_cell)
                .add_modifier(Modifier::REVERSED)
        }
    }
}
