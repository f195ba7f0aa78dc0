//! Initiative and combat tracking engine for D&D 5e tables.
//!
//! This crate provides:
//! - Dice notation parsing and rolling
//! - Ability scores and the modifier rule
//! - A creature catalog of stat block templates
//! - The initiative tracker and its combatants
//! - JSON persistence for both
//!
//! # Quick Start
//!
//! ```
//! use initiative_core::{Field, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::in_memory());
//!
//! let id = session.add_agent();
//! session.assign_creature(id, "Goblin").unwrap();
//! session.edit(id, Field::Initiative, "18").unwrap();
//!
//! for agent in session.tracker().index() {
//!     println!("{} {} ({} HP)", agent.initiative, agent.name, agent.hp);
//! }
//!
//! session.save_tracker().unwrap();
//! ```

pub mod abilities;
pub mod creature;
pub mod dice;
pub mod headless;
pub mod persist;
pub mod session;
pub mod testing;
pub mod tracker;

// Primary public API
pub use abilities::{modifier, Ability, AbilityScores};
pub use creature::{ActionEntry, CatalogError, Creature, Creatures};
pub use dice::{roll, DiceError};
pub use headless::{CommandError, Headless, Outcome};
pub use persist::{FileStorage, MemoryStorage, PersistError, Storage};
pub use session::{AgentInfo, Session, SessionConfig, SessionError, StorageLocation};
pub use testing::TestHarness;
pub use tracker::{Agent, AgentId, AgentRecord, EditError, Field, Tracker};
