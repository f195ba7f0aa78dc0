//! Button bar widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::InputMode;
use crate::ui::theme::TrackerTheme;

/// Hotkeys for the tracker actions plus the current status message
pub struct ButtonBarWidget<'a> {
    input_mode: InputMode,
    selector_open: bool,
    theme: &'a TrackerTheme,
    message: Option<&'a str>,
}

impl<'a> ButtonBarWidget<'a> {
    pub fn new(input_mode: InputMode, theme: &'a TrackerTheme) -> Self {
        Self {
            input_mode,
            selector_open: false,
            theme,
            message: None,
        }
    }

    pub fn selector_open(mut self, open: bool) -> Self {
        self.selector_open = open;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for ButtonBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let hotkeys: &[(&str, bool)] = if self.selector_open {
            &[
                ("type:filter", true),
                ("↑↓:choose", true),
                ("Enter:apply", true),
                ("Esc:close", false),
            ]
        } else {
            match self.input_mode {
                InputMode::Normal => &[
                    ("a:Add", true),
                    ("s:Save", true),
                    ("l:Load", true),
                    ("e:edit", true),
                    ("c:creature", true),
                    ("d/h:dmg/heal", true),
                    ("f/F:effect", true),
                    ("?:Help", false),
                    ("q:Quit", false),
                ],
                InputMode::Insert => &[
                    ("Enter/Tab:commit", true),
                    ("Esc:cancel", true),
                ],
            }
        };

        let (mode_text, mode_style) = match self.input_mode {
            InputMode::Normal => ("NORMAL", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
            InputMode::Insert => ("EDIT", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        };

        let mut spans = vec![Span::styled(format!("-- {mode_text} --"), mode_style), Span::raw(" ")];
        spans.extend(hotkeys.iter().flat_map(|(text, primary)| {
            let style = if *primary {
                Style::default()
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            [Span::styled(*text, style), Span::raw("  ")]
        }));

        if let Some(msg) = self.message {
            spans.push(Span::raw("| "));
            spans.push(Span::styled(msg, self.theme.system_style()));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
