//! Creature selector popup

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::app::{CreatureSelector, SelectorOption};
use crate::ui::theme::TrackerTheme;

/// Filter line plus the matching catalog entries
pub struct CreatureSelectorWidget<'a> {
    selector: &'a CreatureSelector,
    options: &'a [SelectorOption],
    theme: &'a TrackerTheme,
}

impl<'a> CreatureSelectorWidget<'a> {
    pub fn new(
        selector: &'a CreatureSelector,
        options: &'a [SelectorOption],
        theme: &'a TrackerTheme,
    ) -> Self {
        Self {
            selector,
            options,
            theme,
        }
    }
}

impl Widget for CreatureSelectorWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" Creature for #{} ", self.selector.agent))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let filter = Line::from(vec![
            Span::styled("Search: ", self.theme.heading_style()),
            Span::styled(format!("{}_", self.selector.filter), self.theme.input_style()),
        ]);
        Paragraph::new(filter).render(chunks[0], buf);

        let items: Vec<ListItem> = self
            .options
            .iter()
            .map(|option| {
                let style = match option {
                    SelectorOption::Blank => self.theme.system_style(),
                    SelectorOption::New(_) => Style::default().fg(self.theme.accent),
                    SelectorOption::Existing(_) => Style::default().fg(self.theme.foreground),
                };
                ListItem::new(Line::from(Span::styled(option.label(), style)))
            })
            .collect();

        let list = List::new(items)
            .highlight_symbol("> ")
            .highlight_style(
                Style::default()
                    .bg(self.theme.selected_row)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = ListState::default().with_selected(Some(self.selector.highlighted));
        StatefulWidget::render(list, chunks[1], buf, &mut state);
    }
}
