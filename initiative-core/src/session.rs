//! Session - the owned state a tracker UI works against.
//!
//! A session bundles the tracker, the creature catalog and the storage they
//! persist to. It is built once at startup and handed to whatever front end
//! is driving it.

use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use tracing::info;

use crate::creature::{CatalogError, Creature, Creatures};
use crate::persist::{self, FileStorage, MemoryStorage, PersistError, Storage, AGENTS_KEY, CREATURES_KEY};
use crate::tracker::{Agent, AgentId, AgentRecord, EditError, Field, Tracker};

/// Errors from Session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Persist(#[from] PersistError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Edit(#[from] EditError),

    #[error("No agent with id {0}")]
    UnknownAgent(AgentId),
}

/// Where a session keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// One JSON file per entry inside this directory.
    Directory(PathBuf),
    /// Nothing survives the process.
    Memory,
}

/// Configuration for creating a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backing storage.
    pub location: StorageLocation,

    /// Key the agent list is saved under.
    pub tracker_key: String,

    /// Key the creature catalog is saved under.
    pub creatures_key: String,
}

impl SessionConfig {
    /// Store data as files in `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            location: StorageLocation::Directory(data_dir.into()),
            tracker_key: AGENTS_KEY.to_string(),
            creatures_key: CREATURES_KEY.to_string(),
        }
    }

    /// Keep everything in memory.
    pub fn in_memory() -> Self {
        Self {
            location: StorageLocation::Memory,
            ..Self::new(PathBuf::new())
        }
    }

    /// Set the key the tracker is saved under.
    pub fn with_tracker_key(mut self, key: impl Into<String>) -> Self {
        self.tracker_key = key.into();
        self
    }

    /// Set the key the creature catalog is saved under.
    pub fn with_creatures_key(mut self, key: impl Into<String>) -> Self {
        self.creatures_key = key.into();
        self
    }

    fn open_storage(&self) -> Rc<dyn Storage> {
        match &self.location {
            StorageLocation::Directory(dir) => Rc::new(FileStorage::new(dir.clone())),
            StorageLocation::Memory => Rc::new(MemoryStorage::new()),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(FileStorage::default_dir())
    }
}

/// What the info panel shows for one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentInfo<'a> {
    pub agent: &'a Agent,
    /// The catalog entry whose name matches the agent's, if any.
    pub creature: Option<&'a Creature>,
}

/// Tracker, catalog and storage for one running tracker.
pub struct Session {
    config: SessionConfig,
    storage: Rc<dyn Storage>,
    tracker: Tracker,
    creatures: Creatures,
}

impl Session {
    /// Open storage and the catalog. The tracker starts empty; call
    /// [`Session::load_tracker`] to restore a saved one.
    pub fn new(config: SessionConfig) -> Self {
        let storage = config.open_storage();
        Self::with_storage(config, storage)
    }

    /// Build a session over an existing storage backend.
    pub fn with_storage(config: SessionConfig, storage: Rc<dyn Storage>) -> Self {
        let creatures = Creatures::open(storage.clone(), config.creatures_key.clone());
        info!(location = ?config.location, "session opened");
        Self {
            config,
            storage,
            tracker: Tracker::new(),
            creatures,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    pub fn creatures(&self) -> &Creatures {
        &self.creatures
    }

    /// Persist the current agents. Returns how many were written.
    pub fn save_tracker(&self) -> Result<usize, SessionError> {
        let records = self.tracker.records();
        persist::save(self.storage.as_ref(), &self.config.tracker_key, &records)?;
        info!(count = records.len(), "tracker saved");
        Ok(records.len())
    }

    /// Replace the in-memory agents with the saved ones. Nothing saved
    /// means an empty tracker. Returns how many were loaded.
    pub fn load_tracker(&mut self) -> Result<usize, SessionError> {
        let records: Vec<AgentRecord> =
            persist::load_or_default(self.storage.as_ref(), &self.config.tracker_key)?;
        let count = records.len();
        self.tracker.load(records);
        info!(count, "tracker loaded");
        Ok(count)
    }

    /// Start tracking a fresh agent.
    pub fn add_agent(&mut self) -> AgentId {
        self.tracker.add().id()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.tracker.get(id)
    }

    fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent, SessionError> {
        self.tracker.get_mut(id).ok_or(SessionError::UnknownAgent(id))
    }

    /// Commit an inline edit of one field.
    pub fn edit(&mut self, id: AgentId, field: Field, input: &str) -> Result<(), SessionError> {
        self.agent_mut(id)?.set_field(field, input)?;
        Ok(())
    }

    /// Look up (or create) the named creature and copy its stats onto the
    /// agent. A blank name does nothing and returns `Ok(false)`.
    pub fn assign_creature(&mut self, id: AgentId, name: &str) -> Result<bool, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        if self.tracker.get(id).is_none() {
            return Err(SessionError::UnknownAgent(id));
        }

        let creature = self.creatures.find_or_create_by(name)?;
        if let Some(agent) = self.tracker.get_mut(id) {
            agent.apply_creature(creature);
        }
        Ok(true)
    }

    pub fn damage(&mut self, id: AgentId, amount: i32) -> Result<(), SessionError> {
        self.agent_mut(id)?.damage(amount);
        Ok(())
    }

    pub fn heal(&mut self, id: AgentId, amount: i32) -> Result<(), SessionError> {
        self.agent_mut(id)?.heal(amount);
        Ok(())
    }

    pub fn add_effect(&mut self, id: AgentId, effect: &str) -> Result<(), SessionError> {
        self.agent_mut(id)?.add_effect(effect);
        Ok(())
    }

    /// Returns whether the effect was present.
    pub fn remove_effect(&mut self, id: AgentId, effect: &str) -> Result<bool, SessionError> {
        Ok(self.agent_mut(id)?.remove_effect(effect))
    }

    /// The agent plus its matching creature template, for the info panel.
    pub fn info(&self, id: AgentId) -> Option<AgentInfo<'_>> {
        let agent = self.tracker.get(id)?;
        Some(AgentInfo {
            agent,
            creature: self.creatures.find_by(&agent.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionConfig::in_memory())
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut session = session();
        let id = session.add_agent();
        session.edit(id, Field::Name, "Mira").unwrap();
        session.edit(id, Field::HitPoints, "17").unwrap();
        assert_eq!(session.save_tracker().unwrap(), 1);

        session.add_agent();
        assert_eq!(session.tracker().len(), 2);

        assert_eq!(session.load_tracker().unwrap(), 1);
        let mira = session.tracker().iter().next().unwrap();
        assert_eq!(mira.name, "Mira");
        assert_eq!(mira.hp, 17);
        assert_ne!(mira.id(), id);
    }

    #[test]
    fn test_load_with_nothing_saved_empties_tracker() {
        let mut session = session();
        session.add_agent();
        assert_eq!(session.load_tracker().unwrap(), 0);
        assert!(session.tracker().is_empty());
    }

    #[test]
    fn test_assign_known_creature() {
        let mut session = session();
        let id = session.add_agent();
        session.tracker_mut().get_mut(id).unwrap().initiative = 10;

        assert!(session.assign_creature(id, "Goblin").unwrap());
        let goblin = session.agent(id).unwrap();
        assert_eq!(goblin.name, "Goblin");
        assert_eq!(goblin.ac, 15);
        assert_eq!(goblin.hp, 7);
        assert_eq!(goblin.initiative, 12);

        let info = session.info(id).unwrap();
        assert_eq!(info.creature.map(|c| c.name.as_str()), Some("Goblin"));
    }

    #[test]
    fn test_assign_unknown_creature_creates_it() {
        let mut session = session();
        let id = session.add_agent();
        let before = session.creatures().len();

        session.assign_creature(id, "Cave Troll").unwrap();
        assert_eq!(session.creatures().len(), before + 1);
        assert_eq!(session.agent(id).unwrap().ac, 10);
    }

    #[test]
    fn test_assign_blank_is_noop() {
        let mut session = session();
        let id = session.add_agent();
        let before = session.agent(id).unwrap().clone();
        assert!(!session.assign_creature(id, "   ").unwrap());
        assert_eq!(session.agent(id).unwrap(), &before);
    }

    #[test]
    fn test_info_without_creature() {
        let mut session = session();
        let id = session.add_agent();
        session.edit(id, Field::Name, "Sir Nobody").unwrap();
        let info = session.info(id).unwrap();
        assert!(info.creature.is_none());
        assert_eq!(info.agent.name, "Sir Nobody");
    }

    #[test]
    fn test_unknown_agent() {
        let mut session = session();
        assert!(matches!(
            session.damage(AgentId(9), 3),
            Err(SessionError::UnknownAgent(AgentId(9)))
        ));
        assert!(session.info(AgentId(9)).is_none());
    }

    #[test]
    fn test_custom_keys() {
        let storage: Rc<MemoryStorage> = Rc::new(MemoryStorage::new());
        let config = SessionConfig::in_memory().with_tracker_key("table_two");
        let mut session = Session::with_storage(config, storage.clone());
        session.add_agent();
        session.save_tracker().unwrap();
        assert!(storage.contains("table_two"));
        assert!(!storage.contains(AGENTS_KEY));
    }
}
