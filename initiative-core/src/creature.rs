//! Creature templates and the catalog they live in.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::abilities::{signed, Ability, AbilityScores};
use crate::dice::Dice;
use crate::persist::{self, PersistError, Storage};

/// Hit dice used for creatures made up on the spot.
pub const DEFAULT_HIT_DICE: &str = "1d8";

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("A creature named {0:?} already exists")]
    Duplicate(String),

    #[error("Creature name cannot be empty")]
    EmptyName,

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// One entry of a stat block's action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_dice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_bonus: Option<i32>,
}

impl ActionEntry {
    /// Short `+4 to hit, 1d6+2` line for compact display.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(bonus) = self.attack_bonus {
            parts.push(format!("{} to hit", signed(bonus)));
        }
        if let Some(ref dice) = self.damage_dice {
            match self.damage_bonus {
                Some(b) if b != 0 => parts.push(format!("{dice}{}", signed(b))),
                _ => parts.push(dice.clone()),
            }
        }
        parts.join(", ")
    }
}

/// A template stat block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "type", default)]
    pub creature_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub alignment: String,
    #[serde(default)]
    pub armor_class: i32,
    #[serde(default)]
    pub hit_points: i32,
    #[serde(default)]
    pub hit_dice: String,
    #[serde(default)]
    pub speed: String,
    #[serde(flatten)]
    pub abilities: AbilityScores,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub saving_throws: BTreeMap<Ability, i32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skills: BTreeMap<String, i32>,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
}

impl Creature {
    /// A plain Medium humanoid with average scores and a longsword.
    /// Hit points are rolled from the hit dice.
    pub fn default_template(name: impl Into<String>) -> Self {
        Self::default_template_with_rng(name, &mut rand::thread_rng())
    }

    pub fn default_template_with_rng<R: Rng>(name: impl Into<String>, rng: &mut R) -> Self {
        let hit_dice = Dice::new(1, 8);
        let hit_points = hit_dice.roll_each(rng).iter().sum::<u32>() as i32;

        Self {
            name: name.into(),
            size: "Medium".to_string(),
            creature_type: "humanoid".to_string(),
            subtype: String::new(),
            alignment: "any alignment".to_string(),
            armor_class: 10,
            hit_points,
            hit_dice: DEFAULT_HIT_DICE.to_string(),
            speed: "30 ft.".to_string(),
            abilities: AbilityScores::default(),
            saving_throws: BTreeMap::new(),
            skills: BTreeMap::new(),
            actions: vec![ActionEntry {
                name: "Longsword".to_string(),
                desc: "Melee Weapon Attack: +2 to hit, reach 5 ft., one target. \
                       Hit: 4 (1d8) slashing damage."
                    .to_string(),
                attack_bonus: Some(2),
                damage_dice: Some("1d8".to_string()),
                damage_bonus: None,
            }],
        }
    }

    /// `Medium humanoid (goblinoid), neutral evil`
    pub fn header(&self) -> String {
        let mut header = format!("{} {}", self.size, self.creature_type)
            .trim()
            .to_string();
        if !self.subtype.is_empty() {
            header.push_str(&format!(" ({})", self.subtype));
        }
        if !self.alignment.is_empty() {
            header.push_str(&format!(", {}", self.alignment));
        }
        header
    }

    /// Saving throw bonus for an ability, if the stat block lists one.
    pub fn saving_throw(&self, ability: Ability) -> Option<i32> {
        self.saving_throws.get(&ability).copied()
    }
}

/// The creature catalog, backed by storage.
pub struct Creatures {
    entries: Vec<Creature>,
    storage: Rc<dyn Storage>,
    key: String,
}

impl Creatures {
    /// Load the catalog stored under `key`, or start from the built-in
    /// monsters when nothing usable is stored.
    pub fn open(storage: Rc<dyn Storage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = match persist::load::<Vec<Creature>>(storage.as_ref(), &key) {
            Ok(Some(entries)) => entries,
            Ok(None) => builtin(),
            Err(e) => {
                warn!(error = %e, key = %key, "stored creature catalog unreadable, using built-in list");
                builtin()
            }
        };
        info!(count = entries.len(), "creature catalog ready");

        Self {
            entries,
            storage,
            key,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|c| c.name == name)
    }

    /// Exact-name lookup.
    pub fn find_by(&self, name: &str) -> Option<&Creature> {
        self.position(name).map(|i| &self.entries[i])
    }

    /// Return the creature called `name`, creating and persisting a default
    /// template for it if the catalog has none.
    pub fn find_or_create_by(&mut self, name: &str) -> Result<&Creature, CatalogError> {
        if let Some(i) = self.position(name) {
            return Ok(&self.entries[i]);
        }
        self.add(Creature::default_template(name))
    }

    /// Append a creature and persist the catalog.
    pub fn add(&mut self, creature: Creature) -> Result<&Creature, CatalogError> {
        if creature.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.position(&creature.name).is_some() {
            return Err(CatalogError::Duplicate(creature.name));
        }

        debug!(name = %creature.name, "creature added");
        self.entries.push(creature);
        self.save()?;
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Write the whole catalog to storage.
    pub fn save(&self) -> Result<(), PersistError> {
        persist::save(self.storage.as_ref(), &self.key, &self.entries)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn attack(name: &str, desc: &str, bonus: i32, dice: &str, damage_bonus: i32) -> ActionEntry {
    ActionEntry {
        name: name.to_string(),
        desc: desc.to_string(),
        attack_bonus: Some(bonus),
        damage_dice: Some(dice.to_string()),
        damage_bonus: (damage_bonus != 0).then_some(damage_bonus),
    }
}

#[allow(clippy::too_many_arguments)]
fn stat_block(
    name: &str,
    size: &str,
    creature_type: &str,
    subtype: &str,
    alignment: &str,
    armor_class: i32,
    hit_points: i32,
    hit_dice: &str,
    speed: &str,
    abilities: AbilityScores,
) -> Creature {
    Creature {
        name: name.to_string(),
        size: size.to_string(),
        creature_type: creature_type.to_string(),
        subtype: subtype.to_string(),
        alignment: alignment.to_string(),
        armor_class,
        hit_points,
        hit_dice: hit_dice.to_string(),
        speed: speed.to_string(),
        abilities,
        saving_throws: BTreeMap::new(),
        skills: BTreeMap::new(),
        actions: Vec::new(),
    }
}

/// Monsters available before anything has been saved.
pub fn builtin() -> Vec<Creature> {
    let mut goblin = stat_block(
        "Goblin", "Small", "humanoid", "goblinoid", "neutral evil",
        15, 7, "2d6", "30 ft.",
        AbilityScores::new(8, 14, 10, 10, 8, 8),
    );
    goblin.skills.insert("stealth".to_string(), 6);
    goblin.actions = vec![
        attack(
            "Scimitar",
            "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 5 (1d6 + 2) slashing damage.",
            4, "1d6", 2,
        ),
        attack(
            "Shortbow",
            "Ranged Weapon Attack: +4 to hit, range 80/320 ft., one target. Hit: 5 (1d6 + 2) piercing damage.",
            4, "1d6", 2,
        ),
    ];

    let mut orc = stat_block(
        "Orc", "Medium", "humanoid", "orc", "chaotic evil",
        13, 15, "2d8+6", "30 ft.",
        AbilityScores::new(16, 12, 16, 7, 11, 10),
    );
    orc.skills.insert("intimidation".to_string(), 2);
    orc.actions = vec![
        attack(
            "Greataxe",
            "Melee Weapon Attack: +5 to hit, reach 5 ft., one target. Hit: 9 (1d12 + 3) slashing damage.",
            5, "1d12", 3,
        ),
        attack(
            "Javelin",
            "Melee or Ranged Weapon Attack: +5 to hit, reach 5 ft. or range 30/120 ft., one target. Hit: 6 (1d6 + 3) piercing damage.",
            5, "1d6", 3,
        ),
    ];

    let mut skeleton = stat_block(
        "Skeleton", "Medium", "undead", "", "lawful evil",
        13, 13, "2d8+4", "30 ft.",
        AbilityScores::new(10, 14, 15, 6, 8, 5),
    );
    skeleton.actions = vec![
        attack(
            "Shortsword",
            "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 5 (1d6 + 2) piercing damage.",
            4, "1d6", 2,
        ),
        attack(
            "Shortbow",
            "Ranged Weapon Attack: +4 to hit, range 80/320 ft., one target. Hit: 5 (1d6 + 2) piercing damage.",
            4, "1d6", 2,
        ),
    ];

    let mut wolf = stat_block(
        "Wolf", "Medium", "beast", "", "unaligned",
        13, 11, "2d8+2", "40 ft.",
        AbilityScores::new(12, 15, 12, 3, 12, 6),
    );
    wolf.skills.insert("perception".to_string(), 3);
    wolf.skills.insert("stealth".to_string(), 4);
    wolf.actions = vec![attack(
        "Bite",
        "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 7 (2d4 + 2) piercing damage. \
         If the target is a creature, it must succeed on a DC 11 Strength saving throw or be knocked prone.",
        4, "2d4", 2,
    )];

    let mut bandit = stat_block(
        "Bandit", "Medium", "humanoid", "any race", "any non-lawful alignment",
        12, 11, "2d8+2", "30 ft.",
        AbilityScores::new(11, 12, 12, 10, 10, 10),
    );
    bandit.actions = vec![
        attack(
            "Scimitar",
            "Melee Weapon Attack: +3 to hit, reach 5 ft., one target. Hit: 4 (1d6 + 1) slashing damage.",
            3, "1d6", 1,
        ),
        attack(
            "Light Crossbow",
            "Ranged Weapon Attack: +3 to hit, range 80 ft./320 ft., one target. Hit: 5 (1d8 + 1) piercing damage.",
            3, "1d8", 1,
        ),
    ];

    let mut ogre = stat_block(
        "Ogre", "Large", "giant", "", "chaotic evil",
        11, 59, "7d10+21", "40 ft.",
        AbilityScores::new(19, 8, 16, 5, 7, 7),
    );
    ogre.actions = vec![attack(
        "Greatclub",
        "Melee Weapon Attack: +6 to hit, reach 5 ft., one target. Hit: 13 (2d8 + 4) bludgeoning damage.",
        6, "2d8", 4,
    )];

    let mut knight = stat_block(
        "Knight", "Medium", "humanoid", "any race", "any alignment",
        18, 52, "8d8+16", "30 ft.",
        AbilityScores::new(16, 11, 14, 11, 11, 15),
    );
    knight.saving_throws.insert(Ability::Constitution, 4);
    knight.saving_throws.insert(Ability::Wisdom, 2);
    knight.actions = vec![
        attack(
            "Greatsword",
            "Melee Weapon Attack: +5 to hit, reach 5 ft., one target. Hit: 10 (2d6 + 3) slashing damage.",
            5, "2d6", 3,
        ),
        attack(
            "Heavy Crossbow",
            "Ranged Weapon Attack: +2 to hit, range 100/400 ft., one target. Hit: 5 (1d10) piercing damage.",
            2, "1d10", 0,
        ),
    ];

    vec![goblin, orc, skeleton, wolf, bandit, ogre, knight]
}
