//! Headless tracker interface for programmatic use.
//!
//! A line-oriented command interpreter over a [`Session`], for scripted
//! encounters, piping commands from a file, and tests that should not need a
//! terminal.
//!
//! # Example
//!
//! ```
//! use initiative_core::headless::{Headless, Outcome};
//! use initiative_core::SessionConfig;
//!
//! let mut headless = Headless::new(SessionConfig::in_memory());
//! headless.execute("add Goblin").unwrap();
//! if let Outcome::Text(table) = headless.execute("list").unwrap() {
//!     assert!(table.contains("Goblin"));
//! }
//! ```

use thiserror::Error;

use crate::abilities::{signed, Ability};
use crate::dice::{DiceError, DiceExpression};
use crate::session::{AgentInfo, Session, SessionConfig, SessionError};
use crate::tracker::{AgentId, Field};

/// Errors from a headless command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a number: {0}")]
    BadNumber(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Dice(#[from] DiceError),
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Text(String),
    Quit,
}

const HELP: &str = "\
Commands:
  add [name]                 Add an agent (optionally named)
  list                       Show agents in initiative order
  set <id> <field> <value>   Edit name, init, ac, hp or status
  creature <id> <name>       Apply a creature template (created if unknown)
  damage <id> <n>            Subtract hit points
  heal <id> <n>              Add hit points
  effect <id> add <text>     Add a status effect
  effect <id> remove <text>  Remove a status effect
  info <id>                  Show the agent's stat block
  creatures                  List the creature catalog
  roll <dice>                Roll dice, e.g. roll 2d6+3
  save | load                Persist or restore the tracker
  quit                       Exit";

/// A session driven by text commands.
pub struct Headless {
    session: Session,
}

impl Headless {
    pub fn new(config: SessionConfig) -> Self {
        Self::from_session(Session::new(config))
    }

    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one command line.
    pub fn execute(&mut self, line: &str) -> Result<Outcome, CommandError> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let text = match command.to_lowercase().as_str() {
            "" => String::new(),
            "help" | "?" => HELP.to_string(),
            "quit" | "exit" | "q" => return Ok(Outcome::Quit),
            "add" => self.add(rest)?,
            "list" | "ls" => render_table(&self.session),
            "set" => self.set(rest)?,
            "creature" => self.creature(rest)?,
            "damage" => self.adjust_hp(rest, true)?,
            "heal" => self.adjust_hp(rest, false)?,
            "effect" => self.effect(rest)?,
            "info" => {
                let id = parse_id(rest, "info <id>")?;
                let info = self
                    .session
                    .info(id)
                    .ok_or(SessionError::UnknownAgent(id))?;
                render_info(&info)
            }
            "creatures" => self.session.creatures().names().collect::<Vec<_>>().join("\n"),
            "roll" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("roll <dice>"));
                }
                DiceExpression::parse(rest)?.roll().to_string()
            }
            "save" => format!("Saved {} agents", self.session.save_tracker()?),
            "load" => format!("Loaded {} agents", self.session.load_tracker()?),
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Outcome::Text(text))
    }

    fn add(&mut self, name: &str) -> Result<String, CommandError> {
        let id = self.session.add_agent();
        self.session.edit(id, Field::Name, name)?;
        let agent = self
            .session
            .agent(id)
            .ok_or(SessionError::UnknownAgent(id))?;
        Ok(format!(
            "Added #{} {} (initiative {})",
            id, agent.name, agent.initiative
        ))
    }

    fn set(&mut self, args: &str) -> Result<String, CommandError> {
        const USAGE: &str = "set <id> <field> <value>";
        let mut parts = args.splitn(3, char::is_whitespace);
        let id = parse_id(parts.next().unwrap_or(""), USAGE)?;
        let field = Field::parse(parts.next().ok_or(CommandError::Usage(USAGE))?)
            .map_err(SessionError::from)?;
        let value = parts.next().unwrap_or("");

        self.session.edit(id, field, value)?;
        Ok(format!("#{id} {field} = {}", self.field_text(id, field)))
    }

    fn creature(&mut self, args: &str) -> Result<String, CommandError> {
        const USAGE: &str = "creature <id> <name>";
        let (id, name) = args.split_once(char::is_whitespace).ok_or(CommandError::Usage(USAGE))?;
        let id = parse_id(id, USAGE)?;

        if !self.session.assign_creature(id, name)? {
            return Err(CommandError::Usage(USAGE));
        }
        let agent = self
            .session
            .agent(id)
            .ok_or(SessionError::UnknownAgent(id))?;
        Ok(format!(
            "#{} is now {} (init {}, AC {}, HP {})",
            id, agent.name, agent.initiative, agent.ac, agent.hp
        ))
    }

    fn adjust_hp(&mut self, args: &str, is_damage: bool) -> Result<String, CommandError> {
        const USAGE: &str = "damage|heal <id> <n>";
        let (id, amount) = args.split_once(char::is_whitespace).ok_or(CommandError::Usage(USAGE))?;
        let id = parse_id(id, USAGE)?;
        let amount = parse_number(amount)?;

        if is_damage {
            self.session.damage(id, amount)?;
        } else {
            self.session.heal(id, amount)?;
        }

        let agent = self
            .session
            .agent(id)
            .ok_or(SessionError::UnknownAgent(id))?;
        let killed = if agent.is_killed() { " [KILLED]" } else { "" };
        Ok(format!("#{} {} HP {}{}", id, agent.name, agent.hp, killed))
    }

    fn effect(&mut self, args: &str) -> Result<String, CommandError> {
        const USAGE: &str = "effect <id> add|remove <text>";
        let mut parts = args.splitn(3, char::is_whitespace);
        let id = parse_id(parts.next().unwrap_or(""), USAGE)?;
        let action = parts.next().ok_or(CommandError::Usage(USAGE))?;
        let effect = parts.next().map(str::trim).unwrap_or("");
        if effect.is_empty() {
            return Err(CommandError::Usage(USAGE));
        }

        match action {
            "add" | "+" => self.session.add_effect(id, effect)?,
            "remove" | "rm" | "-" => {
                if !self.session.remove_effect(id, effect)? {
                    return Ok(format!("#{id} has no effect {effect:?}"));
                }
            }
            _ => return Err(CommandError::Usage(USAGE)),
        }
        Ok(format!("#{id} Status = {}", self.field_text(id, Field::Status)))
    }

    fn field_text(&self, id: AgentId, field: Field) -> String {
        self.session
            .agent(id)
            .map(|a| a.field_value(field))
            .unwrap_or_default()
    }
}

fn parse_number(text: &str) -> Result<i32, CommandError> {
    text.trim()
        .parse()
        .map_err(|_| CommandError::BadNumber(text.trim().to_string()))
}

fn parse_id(text: &str, usage: &'static str) -> Result<AgentId, CommandError> {
    let text = text.trim().trim_start_matches('#');
    if text.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    text.parse()
        .map(AgentId)
        .map_err(|_| CommandError::BadNumber(text.to_string()))
}

/// The initiative table as plain text.
pub fn render_table(session: &Session) -> String {
    let agents = session.tracker().index();
    if agents.is_empty() {
        return "No agents. Use `add` to start an encounter.".to_string();
    }

    let mut lines = vec![format!(
        "{:>4}  {:<20} {:>4} {:>3} {:>4}  {}",
        "ID", "Name", "Init", "AC", "HP", "Status"
    )];
    for agent in agents {
        let mut status = agent.status.join(", ");
        if agent.is_killed() {
            status = if status.is_empty() {
                "KILLED".to_string()
            } else {
                format!("KILLED; {status}")
            };
        }
        lines.push(format!(
            "{:>4}  {:<20} {:>4} {:>3} {:>4}  {}",
            format!("#{}", agent.id()),
            agent.name,
            agent.initiative,
            agent.ac,
            agent.hp,
            status
        ));
    }
    lines.join("\n")
}

/// The info panel as plain text.
pub fn render_info(info: &AgentInfo<'_>) -> String {
    let agent = info.agent;
    let state = if agent.is_killed() { "killed" } else { "alive" };
    let mut lines = vec![format!("{} ({state})", agent.name)];

    let Some(creature) = info.creature else {
        return lines.join("\n");
    };

    lines.push(creature.header());
    lines.push(format!(
        "AC {}  HP {} ({})  Speed {}",
        creature.armor_class, creature.hit_points, creature.hit_dice, creature.speed
    ));
    lines.push(
        Ability::all()
            .iter()
            .map(|a| {
                let score = creature.abilities.get(*a);
                format!("{} {score} ({})", a.abbreviation(), signed(creature.abilities.modifier(*a)))
            })
            .collect::<Vec<_>>()
            .join("  "),
    );

    let saves: Vec<String> = Ability::all()
        .iter()
        .filter_map(|a| creature.saving_throw(*a).map(|b| format!("{} {}", a.abbreviation(), signed(b))))
        .collect();
    if !saves.is_empty() {
        lines.push(format!("Saving Throws {}", saves.join(", ")));
    }

    if !creature.skills.is_empty() {
        let skills: Vec<String> = creature
            .skills
            .iter()
            .map(|(name, bonus)| format!("{name} {}", signed(*bonus)))
            .collect();
        lines.push(format!("Skills {}", skills.join(", ")));
    }

    if !creature.actions.is_empty() {
        lines.push("Actions".to_string());
        for action in &creature.actions {
            lines.push(format!("  {} ({})", action.name, action.summary()));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless() -> Headless {
        Headless::new(SessionConfig::in_memory())
    }

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Text(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_add_and_list() {
        let mut h = headless();
        assert!(text(h.execute("add Mira").unwrap()).contains("#1 Mira"));
        h.execute("set 1 init 3").unwrap();
        h.execute("add Bram").unwrap();
        h.execute("set 2 init 19").unwrap();

        let table = text(h.execute("list").unwrap());
        let bram = table.find("Bram").unwrap();
        let mira = table.find("Mira").unwrap();
        assert!(bram < mira);
    }

    #[test]
    fn test_add_without_name_uses_placeholder() {
        let mut h = headless();
        assert!(text(h.execute("add").unwrap()).contains("Unnamed"));
    }

    #[test]
    fn test_damage_marks_killed() {
        let mut h = headless();
        h.execute("add Wolf").unwrap();
        h.execute("set 1 hp 5").unwrap();
        let out = text(h.execute("damage 1 10").unwrap());
        assert!(out.contains("HP -5"));
        assert!(out.contains("KILLED"));
        assert!(text(h.execute("list").unwrap()).contains("KILLED"));

        let out = text(h.execute("heal 1 5").unwrap());
        assert!(!out.contains("KILLED"));
    }

    #[test]
    fn test_creature_and_info() {
        let mut h = headless();
        h.execute("add").unwrap();
        let out = text(h.execute("creature 1 Knight").unwrap());
        assert!(out.contains("AC 18"));

        let info = text(h.execute("info 1").unwrap());
        assert!(info.contains("Knight (alive)"));
        assert!(info.contains("Saving Throws CON +4, WIS +2"));
        assert!(info.contains("Greatsword (+5 to hit, 2d6+3)"));
    }

    #[test]
    fn test_info_without_template() {
        let mut h = headless();
        h.execute("add Nobody").unwrap();
        assert_eq!(text(h.execute("info 1").unwrap()), "Nobody (alive)");
    }

    #[test]
    fn test_effects() {
        let mut h = headless();
        h.execute("add").unwrap();
        h.execute("effect 1 add Poisoned").unwrap();
        let out = text(h.execute("effect 1 add Prone").unwrap());
        assert!(out.ends_with("Poisoned, Prone"));
        let out = text(h.execute("effect 1 remove Poisoned").unwrap());
        assert!(out.ends_with("Prone"));
        let out = text(h.execute("effect #1 remove Stunned").unwrap());
        assert!(out.contains("no effect"));
    }

    #[test]
    fn test_save_and_load() {
        let mut h = headless();
        h.execute("add Mira").unwrap();
        assert_eq!(text(h.execute("save").unwrap()), "Saved 1 agents");
        h.execute("add Extra").unwrap();
        assert_eq!(text(h.execute("load").unwrap()), "Loaded 1 agents");
        assert_eq!(h.session().tracker().len(), 1);
    }

    #[test]
    fn test_errors() {
        let mut h = headless();
        assert!(matches!(h.execute("dance"), Err(CommandError::Unknown(_))));
        assert!(matches!(h.execute("damage"), Err(CommandError::Usage(_))));
        assert!(matches!(h.execute("damage x 3"), Err(CommandError::BadNumber(_))));
        assert!(matches!(
            h.execute("damage 4 3"),
            Err(CommandError::Session(SessionError::UnknownAgent(AgentId(4))))
        ));
        h.execute("add").unwrap();
        assert!(matches!(
            h.execute("set 1 ac plate"),
            Err(CommandError::Session(SessionError::Edit(_)))
        ));
        assert!(matches!(h.execute("roll 2x"), Err(CommandError::Dice(_))));
    }

    #[test]
    fn test_extreme_numbers() {
        let mut h = headless();
        h.execute("add").unwrap();
        h.execute("heal 1 2147483647").unwrap();
        let out = text(h.execute("heal 1 1").unwrap());
        assert!(out.contains("HP 2147483647"));
        assert!(!out.contains("KILLED"));

        assert!(matches!(
            h.execute("roll 4000000000d6"),
            Err(CommandError::Dice(DiceError::TooManyDice(_)))
        ));
        assert!(matches!(
            h.execute("roll 3d4294967295"),
            Err(CommandError::Dice(DiceError::InvalidDieSize(_)))
        ));
    }

    #[test]
    fn test_roll_and_quit() {
        let mut h = headless();
        assert!(text(h.execute("roll 1d1+1").unwrap()).ends_with("= 2"));
        assert_eq!(h.execute("quit").unwrap(), Outcome::Quit);
    }
}
