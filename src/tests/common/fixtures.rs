//! Test Fixtures
//!
//! Temp-dir databases and sample records.

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::database::Database;
use crate::import::ImportFile;
use crate::statblock::{parse_monster_value, CanonicalStatblock};

// =============================================================================
// Database Fixtures
// =============================================================================

/// Create a test database in a temporary directory.
/// Returns both the database and the TempDir (which must be kept alive).
pub async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db = Database::new(temp_dir.path())
        .await
        .expect("Failed to create test database");
    (db, temp_dir)
}

// =============================================================================
// Record Fixtures
// =============================================================================

/// A Tetra Cube goblin with the fields a real export carries.
pub fn goblin_monster() -> Value {
    json!({
        "name": "Goblin",
        "shortName": "the goblin",
        "size": "small",
        "type": "humanoid (goblinoid)",
        "alignment": "neutral evil",
        "natArmorBonus": 5,
        "armorName": "leather armor, shield",
        "hpText": "7 (2d6)",
        "speed": "30",
        "strPoints": 8,
        "dexPoints": 14,
        "conPoints": 10,
        "intPoints": 10,
        "wisPoints": 8,
        "chaPoints": 8,
        "darkvision": 60,
        "cr": "1/4",
        "customCr": "1/4 (50 XP)",
        "skills": [{"name": "Stealth", "stat": "dex"}],
        "languages": [{"name": "Common", "speaks": true}, {"name": "Goblin", "speaks": true}],
        "abilities": [
            {"name": "Nimble Escape", "desc": "[MON] can take the Disengage or Hide action as a bonus action on each of its turns."}
        ],
        "actions": [
            {"name": "Scimitar", "desc": "_Melee Weapon Attack:_ [DEX ATK] to hit, reach 5 ft., one target. _Hit:_ 5 ([DEX 1d6]) slashing damage."}
        ]
    })
}

/// A monster record with the given name and hit point text.
pub fn monster_with_hp(name: &str, hp_text: &str) -> Value {
    json!({
        "name": name,
        "hpText": hp_text,
        "natArmorBonus": 1,
        "cr": "1"
    })
}

pub fn monster_file(name: &str, record: &Value) -> ImportFile {
    ImportFile::new(name, record.to_string())
}

/// Canonical statblock parsed from a minimal monster record.
pub fn sample_statblock(name: &str, creature_type: &str, cr: i32) -> CanonicalStatblock {
    parse_monster_value(&json!({
        "name": name,
        "type": creature_type,
        "cr": cr,
        "hpText": "10 (3d6)",
        "natArmorBonus": 2
    }))
    .expect("sample monster should parse")
}
