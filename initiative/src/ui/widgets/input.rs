//! Input line widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::TrackerTheme;

/// One-line input for cell edits and prompts
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a TrackerTheme,
    label: &'a str,
    placeholder: &'a str,
    is_active: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a TrackerTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            label: "> ",
            placeholder: "Press Enter to edit the focused cell",
            is_active: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.is_active));

        let inner = block.inner(area);
        block.render(area, buf);

        let label = Span::styled(self.label, self.theme.heading_style());

        let line = if !self.is_active {
            Line::from(vec![
                label,
                Span::styled(
                    self.placeholder,
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ])
        } else {
            // Use character-based slicing for unicode safety
            let before_cursor: String = self.content.chars().take(self.cursor_position).collect();
            let at_cursor = self
                .content
                .chars()
                .nth(self.cursor_position)
                .map(|c| c.to_string())
                .unwrap_or_else(|| " ".to_string());
            let after_cursor: String = self.content.chars().skip(self.cursor_position + 1).collect();

            Line::from(vec![
                label,
                Span::styled(before_cursor, self.theme.input_style()),
                Span::styled(
                    at_cursor,
                    Style::default()
                        .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
                        .fg(self.theme.editing),
                ),
                Span::styled(after_cursor, self.theme.input_style()),
            ])
        };

        Paragraph::new(line).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::widgets::buffer_text;

    #[test]
    fn test_active_shows_label_and_text() {
        let theme = TrackerTheme::default();
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        InputWidget::new("Prøne", &theme)
            .label("Add effect: ")
            .cursor_position(2)
            .active(true)
            .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Add effect: Prøne"), "{text:?}");
    }

    #[test]
    fn test_inactive_shows_placeholder() {
        let theme = TrackerTheme::default();
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);
        InputWidget::new("", &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Press Enter"));
    }
}
