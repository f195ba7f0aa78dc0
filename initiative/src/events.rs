//! Event handling for the tracker TUI

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::app::{App, InputMode, InputTarget};
use crate::ui::Overlay;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a mouse event
fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    if app.has_overlay() {
        return EventResult::Continue;
    }

    // While editing, only a click moves focus; it commits the edit first
    if app.input_mode == InputMode::Insert {
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return EventResult::Continue;
        }
        app.commit_input();
    }

    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Down(_) => {
            app.hover(mouse.column, mouse.row);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollUp => {
            app.select_prev();
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.select_next();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Some terminals also report releases
    if key.kind != KeyEventKind::Press {
        return EventResult::Continue;
    }

    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    // Handle overlay keys first
    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    // Route based on input mode
    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
    }
}

/// Handle keys in NORMAL mode (navigation and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        // Quit
        KeyCode::Char('q') => EventResult::Quit,

        // Help
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            EventResult::NeedsRedraw
        }
        KeyCode::Right | KeyCode::Tab => {
            app.column_next();
            EventResult::NeedsRedraw
        }
        KeyCode::Left | KeyCode::BackTab => {
            app.column_prev();
            EventResult::NeedsRedraw
        }

        // Editing
        KeyCode::Enter | KeyCode::Char('e') => {
            app.begin_edit();
            EventResult::NeedsRedraw
        }

        // Button bar
        KeyCode::Char('a') => {
            app.add_agent();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('s') => {
            app.save();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('l') => {
            app.load();
            EventResult::NeedsRedraw
        }

        // Agent actions
        KeyCode::Char('c') => {
            app.open_creature_selector();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('d') => {
            app.begin_prompt(InputTarget::Damage);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('h') => {
            app.begin_prompt(InputTarget::Heal);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('f') => {
            app.begin_prompt(InputTarget::AddEffect);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('F') => {
            app.begin_prompt(InputTarget::RemoveEffect);
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

/// Handle keys in INSERT mode (editing a cell or prompt)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    let editing_cell = matches!(app.input_target(), Some(InputTarget::Cell { .. }));

    match key.code {
        KeyCode::Esc => {
            app.cancel_input();
            EventResult::NeedsRedraw
        }

        // Losing focus commits
        KeyCode::Enter => {
            app.commit_input();
            EventResult::NeedsRedraw
        }
        KeyCode::Tab => {
            app.commit_input();
            if editing_cell {
                app.column_next();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::BackTab => {
            app.commit_input();
            if editing_cell {
                app.column_prev();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Up | KeyCode::Down if editing_cell => {
            app.commit_input();
            if key.code == KeyCode::Up {
                app.select_prev();
            } else {
                app.select_next();
            }
            EventResult::NeedsRedraw
        }

        // Input editing
        KeyCode::Left => {
            app.cursor_left();
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Home => {
            app.cursor_home();
            EventResult::NeedsRedraw
        }
        KeyCode::End => {
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.backspace();
            EventResult::NeedsRedraw
        }
        KeyCode::Delete => {
            app.delete();
            EventResult::NeedsRedraw
        }

        // Character input
        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

/// Handle key when overlay is open
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match app.overlay() {
        Some(Overlay::Help) => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                app.close_overlay();
                EventResult::NeedsRedraw
            }
            _ => EventResult::Continue,
        },
        Some(Overlay::CreatureSelector(_)) => match key.code {
            KeyCode::Esc => {
                app.close_overlay();
                EventResult::NeedsRedraw
            }
            KeyCode::Enter => {
                app.confirm_selector();
                EventResult::NeedsRedraw
            }
            KeyCode::Up => {
                app.selector_move(-1);
                EventResult::NeedsRedraw
            }
            KeyCode::Down => {
                app.selector_move(1);
                EventResult::NeedsRedraw
            }
            KeyCode::Backspace => {
                app.selector_backspace();
                EventResult::NeedsRedraw
            }
            KeyCode::Char(c) => {
                app.selector_type_char(c);
                EventResult::NeedsRedraw
            }
            _ => EventResult::Continue,
        },
        None => EventResult::Continue,
    }
}
