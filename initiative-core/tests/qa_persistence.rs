//! QA tests for save/load against real files.
//!
//! Run with: `cargo test -p initiative-core --test qa_persistence`

use initiative_core::persist::{AGENTS_KEY, CREATURES_KEY};
use initiative_core::{Field, FileStorage, Headless, Outcome, Session, SessionConfig};
use std::fs;
use tempfile::TempDir;

fn temp_session() -> (TempDir, Session) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let session = Session::new(SessionConfig::new(temp_dir.path()));
    (temp_dir, session)
}

// =============================================================================
// TEST 1: Basic save and load
// =============================================================================

#[test]
fn test_save_and_load_basic() {
    let (temp_dir, mut session) = temp_session();

    let id = session.add_agent();
    session.edit(id, Field::Name, "Thorin").unwrap();
    session.edit(id, Field::Initiative, "13").unwrap();
    session.edit(id, Field::HitPoints, "28").unwrap();
    session.add_effect(id, "Blessed").unwrap();
    session.save_tracker().expect("Failed to save");

    let path = FileStorage::new(temp_dir.path()).path_for(AGENTS_KEY).unwrap();
    assert!(path.exists(), "Save file should exist after saving");

    // A second session over the same directory sees the same agents
    let mut reopened = Session::new(SessionConfig::new(temp_dir.path()));
    assert!(reopened.tracker().is_empty());
    assert_eq!(reopened.load_tracker().unwrap(), 1);

    let thorin = reopened.tracker().iter().next().unwrap();
    assert_eq!(thorin.name, "Thorin");
    assert_eq!(thorin.initiative, 13);
    assert_eq!(thorin.hp, 28);
    assert_eq!(thorin.status, vec!["Blessed"]);
}

// =============================================================================
// TEST 2: Stored shape is human-readable
// =============================================================================

#[test]
fn test_saved_file_has_named_fields() {
    let (temp_dir, mut session) = temp_session();
    session.add_agent();
    session.save_tracker().unwrap();

    let text = fs::read_to_string(temp_dir.path().join("agents.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let record = &value[0];
    for field in ["id", "name", "initiative", "ac", "hp", "status"] {
        assert!(record.get(field).is_some(), "missing {field} in {text}");
    }
}

// =============================================================================
// TEST 3: Legacy and hand-edited files
// =============================================================================

#[test]
fn test_loads_hand_edited_file() {
    let (temp_dir, mut session) = temp_session();
    fs::write(
        temp_dir.path().join("agents.json"),
        r#"[
            {"name": "Old Save", "initiative": "7", "status": "Charmed"},
            {"initiative": 15, "hp": "oops"}
        ]"#,
    )
    .unwrap();

    assert_eq!(session.load_tracker().unwrap(), 2);
    let order: Vec<_> = session.tracker().index().into_iter().cloned().collect();
    assert_eq!(order[0].name, "Unnamed");
    assert_eq!(order[0].hp, 0);
    assert_eq!(order[1].name, "Old Save");
    assert_eq!(order[1].status, vec!["Charmed"]);
    assert_eq!(order[1].ac, 10);
}

#[test]
fn test_corrupt_tracker_file_is_an_error() {
    let (temp_dir, mut session) = temp_session();
    fs::write(temp_dir.path().join("agents.json"), "not json").unwrap();
    assert!(session.load_tracker().is_err());
}

// =============================================================================
// TEST 4: Catalog persistence
// =============================================================================

#[test]
fn test_new_creatures_survive_restart() {
    let (temp_dir, mut session) = temp_session();
    let catalog_path = temp_dir.path().join(format!("{CREATURES_KEY}.json"));
    assert!(!catalog_path.exists());

    let id = session.add_agent();
    session.assign_creature(id, "Dust Mephit").unwrap();
    assert!(catalog_path.exists(), "catalog is written on add");
    let hp = session.agent(id).unwrap().hp;

    let reopened = Session::new(SessionConfig::new(temp_dir.path()));
    let mephit = reopened
        .creatures()
        .find_by("Dust Mephit")
        .expect("creature persisted");
    assert_eq!(mephit.hit_points, hp);
    assert!(reopened.creatures().find_by("Goblin").is_some());
}

// =============================================================================
// TEST 5: Headless script against files
// =============================================================================

#[test]
fn test_headless_script() {
    let temp_dir = TempDir::new().unwrap();
    let mut headless = Headless::new(SessionConfig::new(temp_dir.path()));

    let script = [
        "add Mira",
        "set 1 init 20",
        "add",
        "creature 2 Orc",
        "set 2 init 5",
        "damage 2 20",
        "save",
    ];
    for line in script {
        headless.execute(line).expect(line);
    }

    let mut fresh = Headless::new(SessionConfig::new(temp_dir.path()));
    fresh.execute("load").unwrap();
    match fresh.execute("list").unwrap() {
        Outcome::Text(table) => {
            let mira = table.find("Mira").unwrap();
            let orc = table.find("Orc").unwrap();
            assert!(mira < orc);
            assert!(table.contains("KILLED"));
        }
        Outcome::Quit => panic!("list should not quit"),
    }
}
