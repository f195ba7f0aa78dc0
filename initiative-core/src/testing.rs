//! Testing utilities for the tracker.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for building encounters in an in-memory session
//! - Assertion helpers for verifying tracker state

use crate::session::{Session, SessionConfig};
use crate::tracker::{Agent, AgentId};

/// An in-memory session with shortcuts for setting up encounters.
pub struct TestHarness {
    pub session: Session,
}

impl TestHarness {
    /// Create a harness with an empty tracker and the built-in catalog.
    pub fn new() -> Self {
        Self {
            session: Session::new(SessionConfig::in_memory()),
        }
    }

    /// Add an agent with fixed name, initiative and hit points.
    pub fn agent(&mut self, name: &str, initiative: i32, hp: i32) -> AgentId {
        let id = self.session.add_agent();
        let agent = self
            .session
            .tracker_mut()
            .get_mut(id)
            .expect("agent was just added");
        agent.name = name.to_string();
        agent.initiative = initiative;
        agent.hp = hp;
        id
    }

    /// Add several `(name, initiative, hp)` agents at once.
    pub fn encounter(&mut self, agents: &[(&str, i32, i32)]) -> Vec<AgentId> {
        agents
            .iter()
            .map(|(name, init, hp)| self.agent(name, *init, *hp))
            .collect()
    }

    /// Find an agent by display name.
    pub fn named(&self, name: &str) -> Option<&Agent> {
        self.session.tracker().iter().find(|a| a.name == name)
    }

    /// Names in initiative order.
    pub fn order(&self) -> Vec<String> {
        self.session
            .tracker()
            .index()
            .into_iter()
            .map(|a| a.name.clone())
            .collect()
    }

    /// Initiative values in initiative order.
    pub fn initiatives(&self) -> Vec<i32> {
        self.session
            .tracker()
            .index()
            .into_iter()
            .map(|a| a.initiative)
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert the initiative order by name.
pub fn assert_order(harness: &TestHarness, expected: &[&str]) {
    let order = harness.order();
    assert_eq!(order, expected, "unexpected initiative order");
}

/// Assert that the named agent is killed.
pub fn assert_killed(harness: &TestHarness, name: &str) {
    let agent = harness
        .named(name)
        .unwrap_or_else(|| panic!("no agent named {name}"));
    assert!(agent.is_killed(), "{name} has {} HP and is not killed", agent.hp);
}

/// Assert that the named agent is still standing.
pub fn assert_alive(harness: &TestHarness, name: &str) {
    let agent = harness
        .named(name)
        .unwrap_or_else(|| panic!("no agent named {name}"));
    assert!(!agent.is_killed(), "{name} has {} HP and is killed", agent.hp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_encounter() {
        let mut harness = TestHarness::new();
        harness.encounter(&[("Mira", 4, 10), ("Orc", 17, 15), ("Wolf", 9, 11)]);
        assert_order(&harness, &["Orc", "Wolf", "Mira"]);
        assert_eq!(harness.initiatives(), vec![17, 9, 4]);
        assert_alive(&harness, "Wolf");
    }

    #[test]
    fn test_harness_killed() {
        let mut harness = TestHarness::new();
        let id = harness.agent("Zombie", 3, 2);
        harness.session.damage(id, 3).unwrap();
        assert_killed(&harness, "Zombie");
    }
}
