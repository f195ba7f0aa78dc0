//! Main application state and logic

use std::cell::Cell;

use initiative_core::creature::Creatures;
use initiative_core::{AgentId, Field, Session};
use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::ui::theme::TrackerTheme;
use crate::ui::Overlay;

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation and hotkeys (default)
    #[default]
    Normal,
    /// Typing into a cell or prompt
    Insert,
}

/// What the input line is feeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    /// Inline edit of one table cell
    Cell { agent: AgentId, field: Field },
    Damage(AgentId),
    Heal(AgentId),
    AddEffect(AgentId),
    RemoveEffect(AgentId),
}

impl InputTarget {
    pub fn agent(&self) -> AgentId {
        match *self {
            InputTarget::Cell { agent, .. }
            | InputTarget::Damage(agent)
            | InputTarget::Heal(agent)
            | InputTarget::AddEffect(agent)
            | InputTarget::RemoveEffect(agent) => agent,
        }
    }

    /// Prompt shown in front of the input line
    pub fn label(&self) -> String {
        match self {
            InputTarget::Cell { field, .. } => format!("{field}: "),
            InputTarget::Damage(_) => "Damage: ".to_string(),
            InputTarget::Heal(_) => "Heal: ".to_string(),
            InputTarget::AddEffect(_) => "Add effect: ".to_string(),
            InputTarget::RemoveEffect(_) => "Remove effect: ".to_string(),
        }
    }
}

/// One entry in the creature selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOption {
    /// The placeholder entry; choosing it changes nothing
    Blank,
    Existing(String),
    /// Typed name not in the catalog yet
    New(String),
}

impl SelectorOption {
    pub fn label(&self) -> String {
        match self {
            SelectorOption::Blank => "-- none --".to_string(),
            SelectorOption::Existing(name) => name.clone(),
            SelectorOption::New(name) => format!("+ new creature \"{name}\""),
        }
    }
}

/// State of the creature selector popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureSelector {
    pub agent: AgentId,
    pub filter: String,
    pub highlighted: usize,
}

impl CreatureSelector {
    pub fn new(agent: AgentId) -> Self {
        Self {
            agent,
            filter: String::new(),
            highlighted: 0,
        }
    }

    /// Blank entry, catalog names containing the filter text, and a
    /// create entry when the typed name is not an exact match
    pub fn options(&self, creatures: &Creatures) -> Vec<SelectorOption> {
        let filter = self.filter.trim();
        let needle = filter.to_lowercase();

        let mut options = vec![SelectorOption::Blank];
        options.extend(
            creatures
                .names()
                .filter(|name| name.to_lowercase().contains(&needle))
                .map(|name| SelectorOption::Existing(name.to_string())),
        );
        if !filter.is_empty() && creatures.find_by(filter).is_none() {
            options.push(SelectorOption::New(filter.to_string()));
        }
        options
    }
}

/// Main application state
pub struct App {
    pub session: Session,

    // UI state
    pub theme: TrackerTheme,
    selected: Option<AgentId>,
    pub column: Field,
    overlay: Option<Overlay>,
    /// Where the table was last drawn, for mouse hover
    pub table_area: Cell<Rect>,

    // Input state
    pub input_mode: InputMode,
    input_target: Option<InputTarget>,
    input_buffer: String,
    cursor_position: usize,

    // Status
    status_message: Option<String>,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            theme: TrackerTheme::default(),
            selected: None,
            column: Field::Name,
            overlay: None,
            table_area: Cell::new(Rect::default()),
            input_mode: InputMode::Normal,
            input_target: None,
            input_buffer: String::new(),
            cursor_position: 0,
            status_message: Some("Press 'a' to add an agent, '?' for help".to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Agent ids in initiative order
    pub fn order(&self) -> Vec<AgentId> {
        self.session
            .tracker()
            .index()
            .iter()
            .map(|a| a.id())
            .collect()
    }

    /// The selected ("hovered") agent; falls back to the top of the order
    pub fn selected(&self) -> Option<AgentId> {
        match self.selected {
            Some(id) if self.session.agent(id).is_some() => Some(id),
            _ => self.order().first().copied(),
        }
    }

    fn selected_position(&self, order: &[AgentId]) -> Option<usize> {
        let selected = self.selected()?;
        order.iter().position(|id| *id == selected)
    }

    pub fn select_next(&mut self) {
        let order = self.order();
        if let Some(pos) = self.selected_position(&order) {
            self.selected = order.get((pos + 1).min(order.len() - 1)).copied();
        }
    }

    pub fn select_prev(&mut self) {
        let order = self.order();
        if let Some(pos) = self.selected_position(&order) {
            self.selected = order.get(pos.saturating_sub(1)).copied();
        }
    }

    /// Select the agent shown on `row` of the table (0 = first agent)
    pub fn select_row(&mut self, row: usize) {
        if let Some(id) = self.order().get(row) {
            self.selected = Some(*id);
        }
    }

    /// Mouse hover: map a terminal position onto a table row
    pub fn hover(&mut self, column: u16, row: u16) {
        let area = self.table_area.get();
        // Border and header take the first two lines
        let first_row = area.y + 2;
        let inside = column > area.x
            && column < area.x + area.width.saturating_sub(1)
            && row >= first_row
            && row < area.y + area.height.saturating_sub(1);
        if inside {
            self.select_row((row - first_row) as usize);
        }
    }

    pub fn column_next(&mut self) {
        let all = Field::all();
        let pos = all.iter().position(|f| *f == self.column).unwrap_or(0);
        self.column = all[(pos + 1) % all.len()];
    }

    pub fn column_prev(&mut self) {
        let all = Field::all();
        let pos = all.iter().position(|f| *f == self.column).unwrap_or(0);
        self.column = all[(pos + all.len() - 1) % all.len()];
    }

    // ------------------------------------------------------------------
    // Tracker actions
    // ------------------------------------------------------------------

    pub fn add_agent(&mut self) {
        let id = self.session.add_agent();
        self.selected = Some(id);
        if let Some(agent) = self.session.agent(id) {
            self.set_status(format!(
                "Added #{} (initiative {})",
                id, agent.initiative
            ));
        }
    }

    pub fn save(&mut self) {
        match self.session.save_tracker() {
            Ok(count) => self.set_status(format!("Saved {count} agents")),
            Err(e) => {
                warn!(error = %e, "save failed");
                self.set_status(format!("Save failed: {e}"));
            }
        }
    }

    pub fn load(&mut self) {
        match self.session.load_tracker() {
            Ok(count) => {
                self.selected = None;
                self.set_status(format!("Loaded {count} agents"));
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                self.set_status(format!("Load failed: {e}"));
            }
        }
    }

    // ------------------------------------------------------------------
    // Input line
    // ------------------------------------------------------------------

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn input_target(&self) -> Option<InputTarget> {
        self.input_target
    }

    /// Focus the selected cell. The displayed text is cleared for fresh entry.
    pub fn begin_edit(&mut self) {
        if let Some(agent) = self.selected() {
            self.begin_input(InputTarget::Cell {
                agent,
                field: self.column,
            });
        }
    }

    /// Open a prompt against the selected agent
    pub fn begin_prompt(&mut self, make: fn(AgentId) -> InputTarget) {
        if let Some(agent) = self.selected() {
            self.begin_input(make(agent));
        } else {
            self.set_status("No agent selected");
        }
    }

    fn begin_input(&mut self, target: InputTarget) {
        self.input_target = Some(target);
        self.input_mode = InputMode::Insert;
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    /// Leave the input line and apply what was typed (focus lost)
    pub fn commit_input(&mut self) {
        let text = std::mem::take(&mut self.input_buffer);
        self.cursor_position = 0;
        self.input_mode = InputMode::Normal;

        let Some(target) = self.input_target.take() else {
            return;
        };
        let agent = target.agent();
        let text = text.trim();
        let was_killed = self.session.agent(agent).is_some_and(|a| a.is_killed());

        let result = match target {
            InputTarget::Cell { field, .. } => self.session.edit(agent, field, text).map(|_| None),
            InputTarget::Damage(_) | InputTarget::Heal(_) if text.is_empty() => Ok(None),
            InputTarget::Damage(_) | InputTarget::Heal(_) => match text.parse::<i32>() {
                Ok(amount) if matches!(target, InputTarget::Damage(_)) => self
                    .session
                    .damage(agent, amount)
                    .map(|_| Some(format!("#{agent} takes {amount} damage"))),
                Ok(amount) => self
                    .session
                    .heal(agent, amount)
                    .map(|_| Some(format!("#{agent} heals {amount}"))),
                Err(_) => {
                    self.set_status(format!("Not a number: {text:?}"));
                    return;
                }
            },
            InputTarget::AddEffect(_) => self.session.add_effect(agent, text).map(|_| None),
            InputTarget::RemoveEffect(_) => self.session.remove_effect(agent, text).map(|removed| {
                (!removed && !text.is_empty()).then(|| format!("#{agent} has no effect {text:?}"))
            }),
        };

        match result {
            Ok(Some(message)) => self.set_status(message),
            Ok(None) => {}
            Err(e) => self.set_status(e.to_string()),
        }

        if let Some(agent) = self.session.agent(agent) {
            if agent.is_killed() && !was_killed {
                info!(agent = %agent.id(), name = %agent.name, "agent killed");
            }
        }
    }

    /// Leave the input line without applying anything
    pub fn cancel_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
        self.input_target = None;
        self.input_mode = InputMode::Normal;
    }

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position)
            {
                self.input_buffer
                    .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position) {
            self.input_buffer
                .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }

    // ------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    pub fn open_creature_selector(&mut self) {
        match self.selected() {
            Some(agent) => self.overlay = Some(Overlay::CreatureSelector(CreatureSelector::new(agent))),
            None => self.set_status("No agent selected"),
        }
    }

    fn selector_mut(&mut self) -> Option<&mut CreatureSelector> {
        match &mut self.overlay {
            Some(Overlay::CreatureSelector(selector)) => Some(selector),
            _ => None,
        }
    }

    pub fn selector_type_char(&mut self, c: char) {
        if let Some(selector) = self.selector_mut() {
            selector.filter.push(c);
            selector.highlighted = if selector.filter.trim().is_empty() { 0 } else { 1 };
        }
    }

    pub fn selector_backspace(&mut self) {
        if let Some(selector) = self.selector_mut() {
            selector.filter.pop();
            selector.highlighted = 0;
        }
    }

    pub fn selector_move(&mut self, delta: isize) {
        let Some(Overlay::CreatureSelector(selector)) = &self.overlay else {
            return;
        };
        let count = selector.options(self.session.creatures()).len();
        if let Some(selector) = self.selector_mut() {
            let next = selector.highlighted as isize + delta;
            selector.highlighted = next.clamp(0, count as isize - 1) as usize;
        }
    }

    /// Apply the highlighted selector entry to its agent and close the popup
    pub fn confirm_selector(&mut self) {
        let Some(Overlay::CreatureSelector(selector)) = self.overlay.take() else {
            return;
        };
        let options = selector.options(self.session.creatures());
        let Some(choice) = options.get(selector.highlighted) else {
            return;
        };

        let name = match choice {
            SelectorOption::Blank => return,
            SelectorOption::Existing(name) | SelectorOption::New(name) => name,
        };

        match self.session.assign_creature(selector.agent, name) {
            Ok(_) => self.set_status(format!("#{} is now {name}", selector.agent)),
            Err(e) => {
                warn!(error = %e, "creature assignment failed");
                self.set_status(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use initiative_core::SessionConfig;

    fn app() -> App {
        App::new(Session::new(SessionConfig::in_memory()))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    #[test]
    fn test_edit_starts_empty_and_commits() {
        let mut app = app();
        app.add_agent();
        app.column = Field::HitPoints;
        app.begin_edit();
        assert_eq!(app.input_mode, InputMode::Insert);
        assert_eq!(app.input_buffer(), "");

        type_str(&mut app, "12");
        app.commit_input();
        assert_eq!(app.input_mode, InputMode::Normal);
        let id = app.selected().unwrap();
        assert_eq!(app.session.agent(id).unwrap().hp, 12);
    }

    #[test]
    fn test_empty_commit_keeps_value() {
        let mut app = app();
        app.add_agent();
        app.column = Field::Name;
        app.begin_edit();
        app.commit_input();
        let id = app.selected().unwrap();
        assert_eq!(app.session.agent(id).unwrap().name, "Unnamed");
    }

    #[test]
    fn test_bad_number_reports_status() {
        let mut app = app();
        app.add_agent();
        app.column = Field::ArmorClass;
        app.begin_edit();
        type_str(&mut app, "plate");
        app.commit_input();
        assert!(app.status_message().unwrap().contains("whole number"));
    }

    #[test]
    fn test_cancel_discards() {
        let mut app = app();
        app.add_agent();
        app.begin_edit();
        type_str(&mut app, "Zed");
        app.cancel_input();
        let id = app.selected().unwrap();
        assert_eq!(app.session.agent(id).unwrap().name, "Unnamed");
    }

    #[test]
    fn test_selection_follows_agent_after_reorder() {
        let mut app = app();
        app.add_agent();
        let first = app.selected().unwrap();
        app.session.edit(first, Field::Initiative, "1").unwrap();
        app.add_agent();
        let second = app.selected().unwrap();
        app.session.edit(second, Field::Initiative, "30").unwrap();

        app.select_row(1);
        assert_eq!(app.selected(), Some(first));
        app.select_prev();
        assert_eq!(app.selected(), Some(second));
        app.select_prev();
        assert_eq!(app.selected(), Some(second));
        app.select_next();
        app.select_next();
        assert_eq!(app.selected(), Some(first));
    }

    #[test]
    fn test_damage_prompt() {
        let mut app = app();
        app.add_agent();
        app.begin_prompt(InputTarget::Damage);
        type_str(&mut app, "3");
        app.commit_input();
        let id = app.selected().unwrap();
        assert_eq!(app.session.agent(id).unwrap().hp, -3);
        assert!(app.session.agent(id).unwrap().is_killed());
    }

    #[test]
    fn test_effect_prompts() {
        let mut app = app();
        app.add_agent();
        app.begin_prompt(InputTarget::AddEffect);
        type_str(&mut app, "Prone");
        app.commit_input();
        app.begin_prompt(InputTarget::RemoveEffect);
        type_str(&mut app, "Stunned");
        app.commit_input();
        assert!(app.status_message().unwrap().contains("no effect"));

        let id = app.selected().unwrap();
        assert_eq!(app.session.agent(id).unwrap().status, vec!["Prone"]);
    }

    #[test]
    fn test_selector_options_filter_and_create() {
        let app = app();
        let mut selector = CreatureSelector::new(AgentId(1));
        let all = selector.options(app.session.creatures());
        assert_eq!(all[0], SelectorOption::Blank);
        assert_eq!(all.len(), app.session.creatures().len() + 1);

        selector.filter = "gob".to_string();
        let options = selector.options(app.session.creatures());
        assert!(options.contains(&SelectorOption::Existing("Goblin".to_string())));
        assert_eq!(options.last(), Some(&SelectorOption::New("gob".to_string())));

        selector.filter = "Goblin".to_string();
        let options = selector.options(app.session.creatures());
        assert!(!options.iter().any(|o| matches!(o, SelectorOption::New(_))));
    }

    #[test]
    fn test_selector_applies_creature() {
        let mut app = app();
        app.add_agent();
        app.open_creature_selector();
        for c in "Ogre".chars() {
            app.selector_type_char(c);
        }
        app.confirm_selector();

        assert!(!app.has_overlay());
        let id = app.selected().unwrap();
        let agent = app.session.agent(id).unwrap();
        assert_eq!(agent.name, "Ogre");
        assert_eq!(agent.hp, 59);
    }

    #[test]
    fn test_selector_blank_is_noop() {
        let mut app = app();
        app.add_agent();
        app.open_creature_selector();
        app.confirm_selector();
        let id = app.selected().unwrap();
        assert_eq!(app.session.agent(id).unwrap().name, "Unnamed");
    }

    #[test]
    fn test_hover_selects_row() {
        let mut app = app();
        app.add_agent();
        app.add_agent();
        app.table_area.set(Rect::new(0, 1, 40, 10));
        let order = app.order();

        // Row 0 of agents sits below the border and header
        app.hover(5, 4);
        assert_eq!(app.selected(), Some(order[1]));
        app.hover(5, 3);
        assert_eq!(app.selected(), Some(order[0]));
        // Border is ignored
        app.hover(0, 3);
        assert_eq!(app.selected(), Some(order[0]));
    }
}
