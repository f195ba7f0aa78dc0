//! Render orchestration for the tracker TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use initiative_core::StorageLocation;

use crate::app::{App, CreatureSelector, InputMode, InputTarget};
use crate::ui::layout::{centered_rect_fixed, AppLayout};
use crate::ui::widgets::{
    ButtonBarWidget, CreatureSelectorWidget, InfoBoxWidget, InitiativeTableWidget, InputWidget,
};

/// Overlay types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
    CreatureSelector(CreatureSelector),
}

/// Main render function. Everything is rebuilt from the session each frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);

    render_title_bar(frame, app, layout.title_area);
    render_table(frame, app, layout.table_area);

    let info = app.selected().and_then(|id| app.session.info(id));
    frame.render_widget(InfoBoxWidget::new(info, &app.theme), layout.info_area);

    let button_bar = ButtonBarWidget::new(app.input_mode, &app.theme)
        .selector_open(matches!(app.overlay(), Some(Overlay::CreatureSelector(_))))
        .message(app.status_message());
    frame.render_widget(button_bar, layout.button_bar);

    render_input(frame, app, layout.input_area);

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let location = match &app.session.config().location {
        StorageLocation::Directory(dir) => dir.display().to_string(),
        StorageLocation::Memory => "memory".to_string(),
    };
    let title = format!(
        " Initiative Tracker | {} agents | {} ",
        app.session.tracker().len(),
        location
    );

    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    app.table_area.set(area);

    let agents = app.session.tracker().index();
    let editing = match app.input_target() {
        Some(InputTarget::Cell { .. }) => Some(app.input_buffer()),
        _ => None,
    };

    let table = InitiativeTableWidget::new(&agents, &app.theme)
        .selected(app.selected())
        .column(app.column)
        .editing(editing)
        .focused(!app.has_overlay());
    frame.render_widget(table, area);
}

/// Render the input area
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let label = app
        .input_target()
        .map(|target| target.label())
        .unwrap_or_else(|| "> ".to_string());

    let placeholder = if app.session.tracker().is_empty() {
        "Press 'a' to add an agent"
    } else {
        "Press Enter to edit the focused cell"
    };

    let input_widget = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .label(&label)
        .placeholder(placeholder)
        .active(app.input_mode == InputMode::Insert);

    frame.render_widget(input_widget, area);
}

/// Render overlay
fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
        Overlay::CreatureSelector(selector) => {
            let popup_area = centered_rect_fixed(44, 18, area);
            frame.render_widget(Clear, popup_area);

            let options = selector.options(app.session.creatures());
            frame.render_widget(
                CreatureSelectorWidget::new(selector, &options, &app.theme),
                popup_area,
            );
        }
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(54, 24, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " Initiative Tracker - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Table:"),
        Line::from("  j/k or ↑/↓      Select row"),
        Line::from("  ←/→ or Tab      Select column"),
        Line::from("  Enter or e      Edit focused cell"),
        Line::from("  Mouse           Hover to select, wheel to scroll"),
        Line::from(""),
        section("Editing:"),
        Line::from("  Enter/Tab/↑/↓   Commit (empty keeps value)"),
        Line::from("  Esc             Cancel"),
        Line::from(""),
        section("Actions:"),
        Line::from("  a               Add agent"),
        Line::from("  c               Choose creature"),
        Line::from("  d / h           Damage / heal"),
        Line::from("  f / F           Add / remove effect"),
        Line::from("  s / l           Save / load"),
        Line::from("  q               Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::widgets::buffer_text;
    use initiative_core::{Field, Session, SessionConfig};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn app() -> App {
        App::new(Session::new(SessionConfig::in_memory()))
    }

    #[test]
    fn test_full_frame() {
        let mut app = app();
        app.add_agent();
        let id = app.selected().unwrap();
        app.session.assign_creature(id, "Goblin").unwrap();

        let text = draw(&app);
        assert!(text.contains("Initiative Tracker | 1 agents | memory"));
        assert!(text.contains("Initiative (1)"));
        assert!(text.contains("Goblin"));
        assert!(text.contains("Scimitar"), "info box shows actions");
        assert!(text.contains("a:Add"));
        assert_eq!(app.table_area.get(), Rect::new(0, 1, 60, 25));
    }

    #[test]
    fn test_editing_frame() {
        let mut app = app();
        app.add_agent();
        app.column = Field::HitPoints;
        app.begin_edit();
        app.type_char('7');

        let text = draw(&app);
        assert!(text.contains("HP: 7"));
        assert!(text.contains("EDIT"));
    }

    #[test]
    fn test_input_placeholder_follows_tracker() {
        let mut app = app();
        assert!(draw(&app).contains("Press 'a' to add an agent"));
        app.add_agent();
        assert!(draw(&app).contains("Press Enter to edit the focused cell"));
    }

    #[test]
    fn test_overlays_draw_on_top() {
        let mut app = app();
        app.toggle_help();
        assert!(draw(&app).contains("Initiative Tracker - Help"));

        app.close_overlay();
        app.add_agent();
        app.open_creature_selector();
        let text = draw(&app);
        assert!(text.contains("Search: _"));
        assert!(text.contains("-- none --"));
    }
}
