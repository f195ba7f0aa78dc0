//! Initiative table widget

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use initiative_core::{Agent, AgentId, Field};

use crate::ui::theme::TrackerTheme;

/// One row per agent in initiative order, one column per editable property
pub struct InitiativeTableWidget<'a> {
    agents: &'a [&'a Agent],
    theme: &'a TrackerTheme,
    selected: Option<AgentId>,
    column: Field,
    /// Input buffer shown in place of the focused cell while editing
    editing: Option<&'a str>,
    focused: bool,
}

impl<'a> InitiativeTableWidget<'a> {
    pub fn new(agents: &'a [&'a Agent], theme: &'a TrackerTheme) -> Self {
        Self {
            agents,
            theme,
            selected: None,
            column: Field::Name,
            editing: None,
            focused: true,
        }
    }

    pub fn selected(mut self, selected: Option<AgentId>) -> Self {
        self.selected = selected;
        self
    }

    pub fn column(mut self, column: Field) -> Self {
        self.column = column;
        self
    }

    pub fn editing(mut self, buffer: Option<&'a str>) -> Self {
        self.editing = buffer;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn cell_text(agent: &Agent, field: Field) -> String {
        match field {
            Field::Name if agent.is_killed() => format!("{} [KILLED]", agent.name),
            _ => agent.field_value(field),
        }
    }

    fn row(&self, agent: &Agent) -> Row<'a> {
        let is_selected = self.selected == Some(agent.id());
        let killed = agent.is_killed();

        let mut cells = vec![Cell::from(Span::styled(
            format!("#{}", agent.id()),
            Style::default().add_modifier(Modifier::DIM),
        ))];

        for field in Field::all() {
            let focused_cell = is_selected && field == self.column;
            let (text, style) = match (focused_cell, self.editing) {
                (true, Some(buffer)) => (format!("{buffer}_"), self.theme.cell_style(true)),
                (true, None) => (Self::cell_text(agent, field), self.theme.cell_style(false)),
                (false, _) => {
                    let text = Self::cell_text(agent, field);
                    let style = match field {
                        Field::HitPoints => Style::default().fg(self.theme.hp_color(agent.hp)),
                        Field::Status => Style::default().fg(self.theme.effect_text),
                        _ => Style::default(),
                    };
                    (text, style)
                }
            };
            cells.push(Cell::from(text).style(style));
        }

        Row::new(cells).style(self.theme.row_style(is_selected, killed))
    }
}

impl Widget for InitiativeTableWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" Initiative ({}) ", self.agents.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let header = Row::new(
            std::iter::once("#")
                .chain(Field::all().iter().map(|f| f.label()))
                .map(Cell::from),
        )
        .style(
            Style::default()
                .fg(self.theme.header)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = self.agents.iter().map(|agent| self.row(agent)).collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1);
        Widget::render(table, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::widgets::buffer_text;
    use initiative_core::Tracker;

    fn tracker() -> Tracker {
        let mut tracker = Tracker::new();
        for (name, init, hp) in [("Mira", 18, 24), ("Orc", 12, -3), ("Wolf", 15, 11)] {
            let agent = tracker.add();
            agent.name = name.to_string();
            agent.initiative = init;
            agent.hp = hp;
        }
        tracker
    }

    fn render(widget: InitiativeTableWidget<'_>) -> String {
        let area = Rect::new(0, 0, 70, 8);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn test_rows_follow_initiative_order() {
        let tracker = tracker();
        let theme = TrackerTheme::default();
        let agents = tracker.index();
        let text = render(InitiativeTableWidget::new(&agents, &theme));

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("Name"));
        assert!(lines[1].contains("Init"));
        assert!(lines[2].contains("Mira"));
        assert!(lines[3].contains("Wolf"));
        assert!(lines[4].contains("Orc [KILLED]"));
    }

    #[test]
    fn test_editing_cell_shows_buffer() {
        let tracker = tracker();
        let theme = TrackerTheme::default();
        let agents = tracker.index();
        let mira = agents[0].id();
        let text = render(
            InitiativeTableWidget::new(&agents, &theme)
                .selected(Some(mira))
                .column(Field::Name)
                .editing(Some("")),
        );
        let lines: Vec<&str> = text.lines().collect();
        assert!(!lines[2].contains("Mira"), "focused cell starts empty");
        assert!(lines[3].contains("Wolf"));
    }
}
