//! QA tests for the tracker's combat flow.
//!
//! Run with: `cargo test -p initiative-core --test qa_combat`

use initiative_core::testing::{assert_alive, assert_killed, assert_order, TestHarness};
use initiative_core::{AgentId, AgentRecord, Field, Tracker};

// =============================================================================
// TEST 1: Loading stored agents
// =============================================================================

#[test]
fn test_loaded_agents_sorted_with_fresh_ids() {
    let records: Vec<AgentRecord> = serde_json::from_str(
        r#"[
            {"id": 90, "name": "Bandit", "initiative": 5, "ac": 12, "hp": 11, "status": []},
            {"id": 91, "name": "Mira", "initiative": 20, "ac": 15, "hp": 24, "status": []},
            {"id": 92, "name": "Wolf", "initiative": 12, "ac": 13, "hp": 11, "status": ["Prone"]}
        ]"#,
    )
    .expect("records parse");

    let mut tracker = Tracker::new();
    tracker.load(records);

    let order: Vec<(i32, AgentId)> = tracker
        .index()
        .iter()
        .map(|a| (a.initiative, a.id()))
        .collect();
    assert_eq!(
        order,
        vec![(20, AgentId(2)), (12, AgentId(3)), (5, AgentId(1))]
    );
}

// =============================================================================
// TEST 2: Damage through zero
// =============================================================================

#[test]
fn test_damage_kills_below_zero() {
    let mut tracker = Tracker::new();
    let agent = tracker.add();
    agent.hp = 5;
    agent.damage(10);

    assert_eq!(agent.hp, -5);
    assert!(agent.is_killed());
}

#[test]
fn test_zero_hp_is_not_killed() {
    let mut harness = TestHarness::new();
    let id = harness.agent("Grunt", 10, 4);
    harness.session.damage(id, 4).unwrap();
    assert_alive(&harness, "Grunt");

    harness.session.damage(id, 1).unwrap();
    assert_killed(&harness, "Grunt");
}

// =============================================================================
// TEST 3: A full round of edits
// =============================================================================

#[test]
fn test_encounter_edits_reorder_table() {
    let mut harness = TestHarness::new();
    let ids = harness.encounter(&[("Mira", 14, 24), ("Bram", 9, 30), ("Imp", 11, 10)]);
    assert_order(&harness, &["Mira", "Imp", "Bram"]);

    // Bram rolled badly and the DM lets him reroll
    harness.session.edit(ids[1], Field::Initiative, "19").unwrap();
    assert_order(&harness, &["Bram", "Mira", "Imp"]);

    // Upserting an already-tracked agent changes nothing
    let bram = harness.session.agent(ids[1]).unwrap().clone();
    harness.session.tracker_mut().upsert(bram);
    assert_eq!(harness.session.tracker().len(), 3);
}

#[test]
fn test_creature_template_drives_info_panel() {
    let mut harness = TestHarness::new();
    let id = harness.agent("placeholder", 10, 0);
    harness.session.assign_creature(id, "Wolf").unwrap();

    let info = harness.session.info(id).unwrap();
    assert_eq!(info.agent.name, "Wolf");
    assert_eq!(info.agent.initiative, 12);
    let wolf = info.creature.expect("wolf is in the catalog");
    assert_eq!(wolf.skills.get("stealth"), Some(&4));

    // Renaming away from the template detaches the stat block
    harness.session.edit(id, Field::Name, "Alpha").unwrap();
    assert!(harness.session.info(id).unwrap().creature.is_none());
}

#[test]
fn test_find_or_create_twice_is_stable() {
    let mut harness = TestHarness::new();
    let a = harness.agent("a", 1, 0);
    let b = harness.agent("b", 2, 0);
    let before = harness.session.creatures().len();

    harness.session.assign_creature(a, "Goblin").unwrap();
    harness.session.assign_creature(b, "Goblin").unwrap();
    assert_eq!(harness.session.creatures().len(), before);

    harness.session.assign_creature(a, "Marsh Hag").unwrap();
    harness.session.assign_creature(b, "Marsh Hag").unwrap();
    assert_eq!(harness.session.creatures().len(), before + 1);
    assert_eq!(
        harness.session.agent(a).unwrap().hp,
        harness.session.agent(b).unwrap().hp
    );
}
