//! Canonical Record Reading
//!
//! Records that are already in statblock shape (`.json` exports, the bundled
//! SRD library) are read field by field. A malformed optional field falls
//! back to its default instead of rejecting the record; only `name` is
//! required.
//!
//! Collections accept both the array form this crate writes and the keyed
//! object form the dashboard writes:
//!
//! ```json
//! { "skills": {"stealth": 6}, "savingThrows": {"dex": 4}, "resistances": {"fire": true} }
//! ```

use serde_json::Value;
use tracing::debug;

use super::ability::{self, Ability, AbilityScores};
use super::defaults;
use super::error::StatblockResult;
use super::model::{
    BookendedText, CanonicalStatblock, ChallengeRating, LegendaryActions, MythicTrait,
    SavingThrow, Senses, SkillBonus, Speed,
};
use super::normalizer::{extract_features, require_name};
use super::source::{is_truthy, value_as_int, MonsterSource};

/// Read a record that is already in canonical statblock shape.
pub fn parse_canonical_value(value: &Value) -> StatblockResult<CanonicalStatblock> {
    let source = MonsterSource::new(value);
    let name = require_name(&source)?;

    let challenge_rating = read_challenge_rating(&source);
    let scores = read_scores(&source);
    let string = |key: &str| source.str_field(key).unwrap_or_default().to_string();

    Ok(CanonicalStatblock {
        name: name.to_string(),
        short_name: source.str_field("shortName").unwrap_or(name).to_string(),
        creature_type: source
            .text("type")
            .unwrap_or(defaults::CREATURE_TYPE)
            .to_string(),
        size: source.text("size").unwrap_or(defaults::SIZE).to_string(),
        alignment: source
            .text("alignment")
            .unwrap_or(defaults::ALIGNMENT)
            .to_string(),
        prof_bonus: source
            .int_field("profBonus")
            .unwrap_or_else(|| ability::proficiency_bonus(challenge_rating.value())),

        ac: source.int_field("ac").unwrap_or(defaults::ARMOR_CLASS),
        ac_notes: string("acNotes"),
        hp: source.int_field("hp").unwrap_or(defaults::HIT_POINTS),
        hp_formula: string("hpFormula"),
        speed: read_speed(&source),
        speed_notes: string("speedNotes"),

        saving_throws: read_saving_throws(&source),
        skills: read_skills(&source),

        damage_immunities: read_name_list(&source, &["damageImmunities", "immunities"]),
        damage_resistances: read_name_list(&source, &["damageResistances", "resistances"]),
        damage_vulnerabilities: read_name_list(
            &source,
            &["damageVulnerabilities", "vulnerabilities"],
        ),
        condition_immunities: read_name_list(&source, &["conditionImmunities"]),

        senses: read_senses(&source),
        passive_perception: read_passive_perception(&source, &scores),
        languages: read_name_list(&source, &["languages"]),
        xp: source
            .int_field("xp")
            .or_else(|| source.int_field("experiencePoints"))
            .unwrap_or(defaults::XP),
        challenge_rating,
        scores,

        abilities: extract_features(&source, "abilities"),
        actions: extract_features(&source, "actions"),
        reactions: extract_features(&source, "reactions"),
        legendary_actions: read_legendary_actions(&source),
        lair_actions: read_bookended(&source, "lairActions"),
        mythic_trait: source.object("mythicTrait").map(|mythic| MythicTrait {
            description: mythic.str_field("description").unwrap_or_default().to_string(),
        }),
        mythic_actions: extract_features(&source, "mythicActions"),
        regional_effects: read_bookended(&source, "regionalEffects"),

        save_dc: source.int_field("saveDc"),
        source: source
            .text("source")
            .unwrap_or(defaults::CUSTOM_SOURCE)
            .to_string(),
        tags: read_name_list(&source, &["tags"]),
        notes: string("notes"),
        is_local: source
            .get("isLocal")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        monster_file: source
            .get("monsterFile")
            .and_then(|extras| serde_json::from_value(extras.clone()).ok()),
    })
}

// ============================================================================
// Field Readers
// ============================================================================

fn read_challenge_rating(source: &MonsterSource<'_>) -> ChallengeRating {
    let value = source
        .get("challengeRating")
        .or_else(|| source.get("cr"));
    match value {
        Some(Value::Number(number)) => number
            .as_f64()
            .map(|rating| ChallengeRating::new(rating as f32))
            .unwrap_or_default(),
        Some(Value::String(text)) => text.parse().unwrap_or_else(|err: String| {
            debug!(error = %err, "Ignoring unreadable challenge rating");
            ChallengeRating::default()
        }),
        _ => ChallengeRating::default(),
    }
}

/// Scores live under `scores`, or under `abilities` when that is an object.
fn read_scores(source: &MonsterSource<'_>) -> AbilityScores {
    let Some(table) = source.object("scores").or_else(|| source.object("abilities")) else {
        return AbilityScores::default();
    };
    let score = |ability: Ability| {
        table
            .int_field(ability.abbreviated_name())
            .or_else(|| table.int_field(&ability.long_name().to_lowercase()))
            .unwrap_or(defaults::ABILITY_SCORE)
    };
    AbilityScores::new(
        score(Ability::Strength),
        score(Ability::Dexterity),
        score(Ability::Constitution),
        score(Ability::Intelligence),
        score(Ability::Wisdom),
        score(Ability::Charisma),
    )
}

/// An object of speeds, or a bare number or string meaning walking speed.
fn read_speed(source: &MonsterSource<'_>) -> Speed {
    let mut speed = Speed::default();
    if let Some(table) = source.object("speed") {
        let read = |key: &str, fallback: i32| table.int_field(key).unwrap_or(fallback);
        speed.walk = read("walk", speed.walk);
        speed.climb = read("climb", speed.climb);
        speed.burrow = read("burrow", speed.burrow);
        speed.fly = read("fly", speed.fly);
        speed.swim = read("swim", speed.swim);
        speed.hover = table.truthy("hover");
    } else if let Some(walk) = source.int_field("speed") {
        speed.walk = walk;
    }
    speed
}

fn read_saving_throws(source: &MonsterSource<'_>) -> Vec<SavingThrow> {
    let mut saves: Vec<SavingThrow> = match source.get("savingThrows") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let entry = MonsterSource::new(entry);
                Some(SavingThrow {
                    ability: Ability::from_name(entry.str_field("ability")?)?,
                    modifier: entry.int_field("modifier")?,
                })
            })
            .collect(),
        Some(Value::Object(table)) => table
            .iter()
            .filter_map(|(name, modifier)| {
                Some(SavingThrow {
                    ability: Ability::from_name(name)?,
                    modifier: value_as_int(modifier)?,
                })
            })
            .collect(),
        _ => Vec::new(),
    };
    saves.sort_by_key(|save| save.ability);
    saves
}

fn read_skills(source: &MonsterSource<'_>) -> Vec<SkillBonus> {
    match source.get("skills") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let entry = MonsterSource::new(entry);
                let skill = entry.text("skill").or_else(|| entry.text("name"))?;
                Some(SkillBonus {
                    skill: skill.to_string(),
                    modifier: entry.int_field("modifier")?,
                })
            })
            .collect(),
        Some(Value::Object(table)) => table
            .iter()
            .filter_map(|(skill, modifier)| {
                Some(SkillBonus {
                    skill: skill.clone(),
                    modifier: value_as_int(modifier)?,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// First present key wins. Accepts arrays of strings or `{name}` objects,
/// objects of flags (`{"fire": true}`) and comma-separated text.
fn read_name_list(source: &MonsterSource<'_>, keys: &[&str]) -> Vec<String> {
    let Some(value) = keys.iter().find_map(|key| source.get(key)) else {
        return Vec::new();
    };
    let names: Vec<&str> = match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.as_str()),
                Value::Object(_) => MonsterSource::new(entry).str_field("name"),
                _ => None,
            })
            .collect(),
        Value::Object(flags) => flags
            .iter()
            .filter(|(_, flag)| is_truthy(flag))
            .map(|(name, _)| name.as_str())
            .collect(),
        Value::String(text) => text.split(',').collect(),
        _ => Vec::new(),
    };
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_senses(source: &MonsterSource<'_>) -> Senses {
    let Some(table) = source.object("senses") else {
        return Senses::default();
    };
    let sense = |key: &str| table.int_field(key).filter(|range| *range != 0);
    Senses {
        blindsight: sense("blindsight"),
        darkvision: sense("darkvision"),
        tremorsense: sense("tremorsense"),
        truesight: sense("truesight"),
    }
}

fn read_passive_perception(source: &MonsterSource<'_>, scores: &AbilityScores) -> i32 {
    source
        .int_field("passivePerception")
        .or_else(|| {
            source
                .object("senses")
                .and_then(|senses| senses.int_field("passivePerception"))
        })
        .unwrap_or_else(|| {
            defaults::PASSIVE_PERCEPTION_BASE.saturating_add(scores.modifier(Ability::Wisdom))
        })
}

/// `{description, actions}`, or a bare non-empty list of actions.
fn read_legendary_actions(source: &MonsterSource<'_>) -> Option<LegendaryActions> {
    match source.get("legendaryActions")? {
        Value::Object(_) => {
            let table = source.object("legendaryActions")?;
            Some(LegendaryActions {
                description: table.str_field("description").unwrap_or_default().to_string(),
                actions: extract_features(&table, "actions"),
            })
        }
        Value::Array(entries) if !entries.is_empty() => Some(LegendaryActions {
            description: String::new(),
            actions: extract_features(source, "legendaryActions"),
        }),
        _ => None,
    }
}

fn read_bookended(source: &MonsterSource<'_>, key: &str) -> Option<BookendedText> {
    source.object(key).map(|table| BookendedText {
        description: table.str_field("description").unwrap_or_default().to_string(),
        end_description: table
            .str_field("endDescription")
            .unwrap_or_default()
            .to_string(),
    })
}
