//! Bundled 5e SRD Monsters
//!
//! A small set of System Reference Document creatures compiled into the
//! binary for seeding an empty library. The records are canonical statblock
//! JSON and go through the same reader as `.json` imports, then get stamped
//! with the `5e SRD` source.

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{info, warn};

use super::{ImportReport, ImportedRecord, SkippedRecord};
use crate::database::{StatblockOps, StoreResult, UpsertOutcome};
use crate::statblock::{defaults, parse_canonical_value, CanonicalStatblock, ChallengeRating};

/// File name reported for SRD records in an [`ImportReport`].
pub const SRD_FILE_NAME: &str = "srd_monsters.json";

const SRD_JSON: &str = include_str!("../../assets/srd_monsters.json");

static SRD_MONSTERS: Lazy<Vec<CanonicalStatblock>> = Lazy::new(load_monsters);

fn load_monsters() -> Vec<CanonicalStatblock> {
    let records: Vec<Value> = match serde_json::from_str(SRD_JSON) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "Bundled SRD library is not valid JSON");
            return Vec::new();
        }
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match parse_canonical_value(raw) {
            Ok(mut statblock) => {
                statblock.source = defaults::SRD_SOURCE.to_string();
                statblock.is_local = true;
                Some(statblock)
            }
            Err(err) => {
                warn!(index, error = %err, "Skipping unreadable SRD record");
                None
            }
        })
        .collect()
}

// ============================================================================
// Catalog
// ============================================================================

/// Every bundled monster, in library order.
pub fn monsters() -> &'static [CanonicalStatblock] {
    &SRD_MONSTERS
}

pub fn monster_count() -> usize {
    SRD_MONSTERS.len()
}

/// Monster names sorted alphabetically.
pub fn available_monsters() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = names(SRD_MONSTERS.iter());
    names.sort_unstable();
    names
}

/// Case-insensitive exact name lookup.
pub fn find_monster(name: &str) -> Option<&'static CanonicalStatblock> {
    let name = name.trim();
    SRD_MONSTERS
        .iter()
        .find(|monster| monster.name.eq_ignore_ascii_case(name))
}

/// Names containing `query`, ignoring case.
pub fn search_monsters(query: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    names(
        SRD_MONSTERS
            .iter()
            .filter(|monster| monster.name.to_lowercase().contains(&query)),
    )
}

pub fn monsters_by_cr(cr: ChallengeRating) -> Vec<&'static str> {
    names(
        SRD_MONSTERS
            .iter()
            .filter(|monster| monster.challenge_rating == cr),
    )
}

/// Names whose creature type matches, ignoring case.
pub fn monsters_by_type(creature_type: &str) -> Vec<&'static str> {
    let creature_type = creature_type.trim();
    names(
        SRD_MONSTERS
            .iter()
            .filter(|monster| monster.creature_type.eq_ignore_ascii_case(creature_type)),
    )
}

fn names(monsters: impl Iterator<Item = &'static CanonicalStatblock>) -> Vec<&'static str> {
    monsters.map(|monster| monster.name.as_str()).collect()
}

// ============================================================================
// Import
// ============================================================================

/// Upsert one SRD monster by name. Returns `None` when no monster matches.
pub async fn import_one<S: StatblockOps>(
    name: &str,
    store: &S,
) -> StoreResult<Option<UpsertOutcome>> {
    let Some(monster) = find_monster(name) else {
        warn!(name, "SRD monster not found");
        return Ok(None);
    };
    let outcome = store.upsert_statblock(monster).await?;
    info!(name = %outcome.record.name, action = ?outcome.action, "Imported SRD monster");
    Ok(Some(outcome))
}

/// Upsert every SRD monster. A monster that fails to store is skipped.
pub async fn import_all<S: StatblockOps>(store: &S) -> ImportReport {
    let mut report = ImportReport::default();

    for (index, monster) in SRD_MONSTERS.iter().enumerate() {
        match store.upsert_statblock(monster).await {
            Ok(outcome) => report.imported.push(ImportedRecord {
                file: SRD_FILE_NAME.to_string(),
                index,
                id: outcome.record.id,
                name: outcome.record.name,
                action: outcome.action,
            }),
            Err(err) => {
                warn!(name = %monster.name, error = %err, "Failed to store SRD monster");
                report.skipped.push(SkippedRecord {
                    file: SRD_FILE_NAME.to_string(),
                    index,
                    name: monster.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(imported = report.imported.len(), "SRD import finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statblock::{Ability, SavingThrow};

    #[test]
    fn test_every_bundled_record_loads() {
        let records: Vec<Value> = serde_json::from_str(SRD_JSON).unwrap();
        assert_eq!(monster_count(), records.len());
        assert_eq!(monster_count(), 10);
        assert!(monsters().iter().all(|m| m.source == "5e SRD" && m.is_local));
    }

    #[test]
    fn test_available_monsters_sorted() {
        assert_eq!(
            available_monsters(),
            vec![
                "Bandit Captain",
                "Cultist",
                "Goblin",
                "Guard",
                "Ogre",
                "Orc",
                "Priest",
                "Skeleton",
                "Wolf",
                "Young Red Dragon",
            ]
        );
    }

    #[test]
    fn test_find_monster_ignores_case() {
        let goblin = find_monster(" GOBLIN ").unwrap();
        assert_eq!(goblin.name, "Goblin");
        assert_eq!(goblin.ac, 15);
        assert_eq!(goblin.hp, 7);
        assert_eq!(goblin.scores.dexterity, 14);
        assert_eq!(goblin.challenge_rating, ChallengeRating::new(0.25));
        assert_eq!(goblin.xp, 50);
        assert_eq!(goblin.passive_perception, 9);
        assert_eq!(goblin.skills[0].skill, "stealth");
        assert_eq!(goblin.skills[0].modifier, 6);
        assert_eq!(goblin.abilities[0].name, "Nimble Escape");
        assert_eq!(goblin.actions.len(), 2);
        assert!(goblin.legendary_actions.is_none());

        assert!(find_monster("Tarrasque").is_none());
    }

    #[test]
    fn test_keyed_fields_are_read() {
        let skeleton = find_monster("skeleton").unwrap();
        assert_eq!(skeleton.damage_resistances, vec!["piercing"]);
        assert_eq!(skeleton.damage_vulnerabilities, vec!["bludgeoning"]);
        assert_eq!(skeleton.damage_immunities, vec!["poison"]);
        assert_eq!(skeleton.condition_immunities, vec!["poisoned"]);

        let captain = find_monster("Bandit Captain").unwrap();
        assert_eq!(
            captain.saving_throws,
            vec![
                SavingThrow {
                    ability: Ability::Dexterity,
                    modifier: 6
                },
                SavingThrow {
                    ability: Ability::Wisdom,
                    modifier: 3
                },
            ]
        );
        assert_eq!(captain.reactions[0].name, "Parry");

        let wolf = find_monster("wolf").unwrap();
        assert_eq!(wolf.passive_perception, 13);
        assert_eq!(wolf.speed.walk, 40);

        let dragon = find_monster("young red dragon").unwrap();
        assert_eq!(dragon.speed.fly, 80);
        assert_eq!(dragon.senses.blindsight, Some(30));
        assert_eq!(dragon.prof_bonus, 3);
    }

    #[test]
    fn test_search_and_filters() {
        assert_eq!(search_monsters("OG"), vec!["Ogre"]);
        assert_eq!(search_monsters("g").len(), 4);
        assert!(search_monsters("lich").is_empty());

        assert_eq!(
            monsters_by_cr("1/8".parse().unwrap()),
            vec!["Guard", "Cultist"]
        );
        assert_eq!(
            monsters_by_cr(ChallengeRating::from(2)),
            vec!["Ogre", "Bandit Captain", "Priest"]
        );
        assert_eq!(
            monsters_by_type("npc"),
            vec!["Bandit Captain", "Guard", "Priest", "Cultist"]
        );
        assert_eq!(monsters_by_type("Monster").len(), 6);
    }
}
