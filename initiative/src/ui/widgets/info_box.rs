//! Info box widget for the hovered agent

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use initiative_core::abilities::signed;
use initiative_core::{Ability, AgentInfo, Creature};

use crate::ui::theme::TrackerTheme;

/// Stat block of the hovered agent's creature template
pub struct InfoBoxWidget<'a> {
    info: Option<AgentInfo<'a>>,
    theme: &'a TrackerTheme,
}

impl<'a> InfoBoxWidget<'a> {
    pub fn new(info: Option<AgentInfo<'a>>, theme: &'a TrackerTheme) -> Self {
        Self { info, theme }
    }

    fn creature_lines(&self, creature: &Creature) -> Vec<Line<'static>> {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(
                creature.header(),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("AC ", label),
                Span::raw(creature.armor_class.to_string()),
                Span::styled("  HP ", label),
                Span::raw(format!("{} ({})", creature.hit_points, creature.hit_dice)),
            ]),
            Line::from(vec![Span::styled("Speed ", label), Span::raw(creature.speed.clone())]),
            Line::from(""),
        ];

        // Ability scores: two rows of three
        for chunk in Ability::all().chunks(3) {
            let spans: Vec<Span> = chunk
                .iter()
                .flat_map(|ability| {
                    let score = creature.abilities.get(*ability);
                    let modifier = creature.abilities.modifier(*ability);
                    [
                        Span::styled(format!("{} ", ability.abbreviation()), label),
                        Span::raw(format!("{score:>2} ({:<3})  ", signed(modifier))),
                    ]
                })
                .collect();
            lines.push(Line::from(spans));
        }

        let saves: Vec<String> = Ability::all()
            .iter()
            .filter_map(|a| creature.saving_throw(*a).map(|b| format!("{} {}", a.abbreviation(), signed(b))))
            .collect();
        if !saves.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Saving Throws ", label),
                Span::raw(saves.join(", ")),
            ]));
        }

        if !creature.skills.is_empty() {
            let skills: Vec<String> = creature
                .skills
                .iter()
                .map(|(name, bonus)| format!("{name} {}", signed(*bonus)))
                .collect();
            lines.push(Line::from(vec![
                Span::styled("Skills ", label),
                Span::raw(skills.join(", ")),
            ]));
        }

        if !creature.actions.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Actions", self.theme.heading_style())));
            for action in &creature.actions {
                let summary = action.summary();
                let mut spans = vec![Span::styled(format!("{}. ", action.name), label)];
                if summary.is_empty() {
                    spans.push(Span::raw(action.desc.clone()));
                } else {
                    spans.push(Span::raw(summary));
                }
                lines.push(Line::from(spans));
            }
        }

        lines
    }
}

impl Widget for InfoBoxWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(info) = self.info else {
            let block = Block::default()
                .title(" Info ")
                .borders(Borders::ALL)
                .border_style(self.theme.border_style(false));
            Paragraph::new(Line::from(Span::styled(
                "No agent selected",
                self.theme.system_style(),
            )))
            .block(block)
            .render(area, buf);
            return;
        };

        let agent = info.agent;
        let block = Block::default()
            .title(format!(" {} ", agent.name))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let (state, color) = if agent.is_killed() {
            ("KILLED", self.theme.hp_killed)
        } else {
            ("alive", self.theme.hp_color(agent.hp))
        };
        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("#{} {} ", agent.id(), agent.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("({state})"), Style::default().fg(color)),
        ])];
        if !agent.status.is_empty() {
            lines.push(Line::from(Span::styled(
                agent.status.join(", "),
                Style::default().fg(self.theme.effect_text),
            )));
        }

        match info.creature {
            Some(creature) => {
                lines.push(Line::from(""));
                lines.extend(self.creature_lines(creature));
            }
            None => lines.push(Line::from(Span::styled(
                "No stat block for this name",
                self.theme.system_style(),
            ))),
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
