//! Combatants and the initiative order.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::abilities::Ability;
use crate::creature::Creature;
use crate::dice;

/// Name given to agents that have not been named yet.
pub const DEFAULT_NAME: &str = "Unnamed";

/// Armor class of a fresh agent.
pub const DEFAULT_AC: i32 = 10;

/// Hit points of a fresh agent.
pub const DEFAULT_HP: i32 = 0;

/// Identifier of an agent, unique within one tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejected inline edit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{field} must be a whole number, got {input:?}")]
    NotANumber { field: Field, input: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// The editable columns of an agent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Initiative,
    ArmorClass,
    HitPoints,
    Status,
}

impl Field {
    pub fn all() -> [Field; 5] {
        [
            Field::Name,
            Field::Initiative,
            Field::ArmorClass,
            Field::HitPoints,
            Field::Status,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Initiative => "Init",
            Field::ArmorClass => "AC",
            Field::HitPoints => "HP",
            Field::Status => "Status",
        }
    }

    /// Parse a field name as typed in commands (`init`, `ac`, `hp`, ...).
    pub fn parse(name: &str) -> Result<Field, EditError> {
        match name.trim().to_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "init" | "initiative" => Ok(Field::Initiative),
            "ac" | "armor" | "armor_class" => Ok(Field::ArmorClass),
            "hp" | "hit_points" => Ok(Field::HitPoints),
            "status" | "effects" => Ok(Field::Status),
            other => Err(EditError::UnknownField(other.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single tracked combatant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    id: AgentId,
    pub name: String,
    pub initiative: i32,
    pub ac: i32,
    pub hp: i32,
    pub status: Vec<String>,
    /// Dexterity modifier applied by the last creature template.
    pub initiative_bonus: i32,
}

impl Agent {
    /// A fresh agent with default values and a rolled initiative.
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            name: DEFAULT_NAME.to_string(),
            initiative: dice::d20(),
            ac: DEFAULT_AC,
            hp: DEFAULT_HP,
            status: Vec::new(),
            initiative_bonus: 0,
        }
    }

    /// Rebuild an agent from a stored record under a new id.
    pub fn from_record(id: AgentId, record: AgentRecord) -> Self {
        let name = record
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        Self {
            id,
            name,
            initiative: record.initiative.unwrap_or_else(dice::d20),
            ac: record.ac.unwrap_or(DEFAULT_AC),
            hp: record.hp.unwrap_or(DEFAULT_HP),
            status: record.status,
            initiative_bonus: 0,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Killed means strictly negative hit points; zero is still standing.
    pub fn is_killed(&self) -> bool {
        self.hp < 0
    }

    /// Hit point arithmetic saturates at the `i32` bounds.
    pub fn damage(&mut self, amount: i32) {
        self.hp = self.hp.saturating_sub(amount);
        debug!(agent = %self.id, amount, hp = self.hp, "damage applied");
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = self.hp.saturating_add(amount);
        debug!(agent = %self.id, amount, hp = self.hp, "healing applied");
    }

    /// Add a status effect; duplicates are ignored.
    pub fn add_effect(&mut self, effect: impl Into<String>) {
        let effect = effect.into();
        let effect = effect.trim();
        if !effect.is_empty() && !self.status.iter().any(|e| e == effect) {
            self.status.push(effect.to_string());
        }
    }

    /// Remove a status effect by exact name. Returns whether it was present.
    pub fn remove_effect(&mut self, effect: &str) -> bool {
        let before = self.status.len();
        self.status.retain(|e| e != effect.trim());
        self.status.len() != before
    }

    /// Copy a creature template's combat stats onto this agent.
    ///
    /// The dexterity modifier replaces whatever bonus a previous template
    /// added to initiative.
    pub fn apply_creature(&mut self, creature: &Creature) {
        let dex = creature.abilities.modifier(Ability::Dexterity);
        self.name = creature.name.clone();
        self.initiative = self
            .initiative
            .saturating_sub(self.initiative_bonus)
            .saturating_add(dex);
        self.initiative_bonus = dex;
        self.ac = creature.armor_class;
        self.hp = creature.hit_points;
        debug!(agent = %self.id, creature = %creature.name, "creature applied");
    }

    pub fn clear_effects(&mut self) {
        self.status.clear();
    }

    /// Current value of a field as displayed text.
    pub fn field_value(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Initiative => self.initiative.to_string(),
            Field::ArmorClass => self.ac.to_string(),
            Field::HitPoints => self.hp.to_string(),
            Field::Status => self.status.join(", "),
        }
    }

    /// Commit edited text into a field.
    ///
    /// Blank input leaves the field untouched. Numeric fields reject text
    /// that is not a whole number.
    pub fn set_field(&mut self, field: Field, input: &str) -> Result<(), EditError> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(());
        }

        let parse_number = |text: &str| {
            text.parse::<i32>().map_err(|_| EditError::NotANumber {
                field,
                input: text.to_string(),
            })
        };

        match field {
            Field::Name => self.name = text.to_string(),
            Field::Initiative => self.initiative = parse_number(text)?,
            Field::ArmorClass => self.ac = parse_number(text)?,
            Field::HitPoints => self.hp = parse_number(text)?,
            Field::Status => self.status = split_effects(text),
        }
        debug!(agent = %self.id, %field, value = text, "field edited");
        Ok(())
    }

    /// The persisted shape of this agent.
    pub fn to_record(&self) -> AgentRecord {
        AgentRecord {
            id: Some(self.id.0),
            name: Some(self.name.clone()),
            initiative: Some(self.initiative),
            ac: Some(self.ac),
            hp: Some(self.hp),
            status: self.status.clone(),
        }
    }
}

fn split_effects(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A stored agent. Numbers may arrive as JSON numbers or numeric strings;
/// anything unparseable is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    #[serde(default, deserialize_with = "lenient_number")]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub initiative: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ac: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hp: Option<i32>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Vec<String>,
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    };
    Ok(number.and_then(|n| T::try_from(n).ok()))
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => split_effects(&s),
        _ => Vec::new(),
    })
}

/// Ordered collection of agents plus the id counter.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    agents: Vec<Agent>,
    serial: u32,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last id handed out.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    fn next_id(&mut self) -> AgentId {
        self.serial += 1;
        AgentId(self.serial)
    }

    /// Create a detached agent with the next id. It is not tracked until
    /// passed to [`Tracker::upsert`].
    pub fn new_agent(&mut self) -> Agent {
        Agent::new(self.next_id())
    }

    /// Create a fresh agent and start tracking it.
    pub fn add(&mut self) -> &mut Agent {
        let agent = self.new_agent();
        self.upsert(agent)
    }

    /// Track `agent` unless an agent with the same id is already present.
    ///
    /// Never overwrites an existing entry; edits happen in place through
    /// [`Tracker::get_mut`]. Returns the tracked agent either way.
    pub fn upsert(&mut self, agent: Agent) -> &mut Agent {
        let index = match self.agents.iter().position(|a| a.id == agent.id) {
            Some(index) => index,
            None => {
                self.serial = self.serial.max(agent.id.0);
                debug!(agent = %agent.id, name = %agent.name, "agent added");
                self.agents.push(agent);
                self.agents.len() - 1
            }
        };
        &mut self.agents[index]
    }

    /// Agents ordered by initiative, highest first. Ties keep insertion
    /// order. The stored order is not changed.
    pub fn index(&self) -> Vec<&Agent> {
        let mut ordered: Vec<&Agent> = self.agents.iter().collect();
        ordered.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        ordered
    }

    /// Replace all agents with ones rebuilt from stored records.
    pub fn load(&mut self, records: impl IntoIterator<Item = AgentRecord>) {
        self.agents.clear();
        for record in records {
            let id = self.next_id();
            self.agents.push(Agent::from_record(id, record));
        }
        debug!(count = self.agents.len(), "tracker loaded");
    }

    /// Stored shape of every agent, in insertion order.
    pub fn records(&self) -> Vec<AgentRecord> {
        self.agents.iter().map(Agent::to_record).collect()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
