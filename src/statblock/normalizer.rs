//! Monster Record Normalizer
//!
//! Turns a Tetra Cube `.monster` record into a [`CanonicalStatblock`] in two
//! pure stages:
//!
//! 1. Each `extract_*` function reads one concern from the raw JSON and the
//!    results are collected into an immutable [`ExtractedFields`].
//! 2. [`ExtractedFields::into_statblock`] derives the combat numbers, builds a
//!    [`ResolveContext`] and resolves every narrative text field.
//!
//! Missing or malformed fields fall back to [`super::defaults`]; only a
//! missing `name` rejects the record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::ability::{self, Ability, AbilityScores};
use super::defaults;
use super::error::{StatblockError, StatblockResult};
use super::model::{
    BookendedText, CanonicalStatblock, ChallengeRating, Feature, LegendaryActions,
    MonsterFileExtras, MythicTrait, SavingThrow, Senses, SkillBonus, Speed,
};
use super::source::MonsterSource;
use super::template::{ResolveContext, Resolver};

static HIT_POINTS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(.*)").expect("Failed to compile hit points regex"));

static XP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([\d,]+)\s*XP\)").expect("Failed to compile XP regex"));

static FIRST_INT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("Failed to compile integer regex"));

// ============================================================================
// Entry Points
// ============================================================================

/// Parse monster file text into a canonical statblock.
pub fn parse_monster_file(text: &str) -> StatblockResult<CanonicalStatblock> {
    let value: Value = serde_json::from_str(text)?;
    parse_monster_value(&value)
}

/// Normalize one already-parsed monster record.
pub fn parse_monster_value(value: &Value) -> StatblockResult<CanonicalStatblock> {
    Ok(ExtractedFields::extract(value)?.into_statblock())
}

/// The record's `name`, which must be a non-blank string.
pub(crate) fn require_name<'a>(source: &MonsterSource<'a>) -> StatblockResult<&'a str> {
    source
        .str_field("name")
        .filter(|name| !name.trim().is_empty())
        .ok_or(StatblockError::MissingName)
}

// ============================================================================
// Stage 1: Extraction
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub name: String,
    pub short_name: String,
    pub creature_type: String,
    pub size: String,
    pub alignment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmorClass {
    pub value: i32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HitPoints {
    pub value: i32,
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub speed: Speed,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perception {
    pub senses: Senses,
    pub passive: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    pub rating: ChallengeRating,
    pub xp: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageProperties {
    pub immunities: Vec<String>,
    pub resistances: Vec<String>,
    pub vulnerabilities: Vec<String>,
}

/// Narrative blocks with template text still unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    pub abilities: Vec<Feature>,
    pub actions: Vec<Feature>,
    pub reactions: Vec<Feature>,
    pub legendary: Option<LegendaryActions>,
    pub lair: Option<BookendedText>,
    pub mythic_trait: Option<MythicTrait>,
    pub mythic_actions: Vec<Feature>,
    pub regional: Option<BookendedText>,
}

/// Everything read from a monster record, before template resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub identity: Identity,
    pub scores: AbilityScores,
    pub armor: ArmorClass,
    pub hit_points: HitPoints,
    pub movement: Movement,
    pub perception: Perception,
    pub challenge: Challenge,
    pub prof_bonus: i32,
    pub damage: DamageProperties,
    pub condition_immunities: Vec<String>,
    pub languages: Vec<String>,
    pub saving_throws: Vec<SavingThrow>,
    pub skills: Vec<SkillBonus>,
    pub narrative: Narrative,
    pub extras: MonsterFileExtras,
}

impl ExtractedFields {
    /// Run every extractor over a raw record.
    pub fn extract(value: &Value) -> StatblockResult<Self> {
        let source = MonsterSource::new(value);
        let identity = extract_identity(&source)?;
        let scores = extract_scores(&source);
        let challenge = extract_challenge(&source);
        let prof_bonus = ability::proficiency_bonus(challenge.rating.value());

        Ok(Self {
            armor: extract_armor_class(&source),
            hit_points: extract_hit_points(&source),
            movement: extract_speed(&source),
            perception: extract_senses(&source, &scores),
            damage: extract_damage_properties(&source),
            condition_immunities: extract_named_list(&source, "conditions"),
            languages: extract_named_list(&source, "languages"),
            saving_throws: extract_saving_throws(&source, &scores, prof_bonus),
            skills: extract_skills(&source, &scores, prof_bonus),
            narrative: extract_narrative(&source),
            extras: extract_extras(&source),
            identity,
            scores,
            challenge,
            prof_bonus,
        })
    }
}

pub fn extract_identity(source: &MonsterSource<'_>) -> StatblockResult<Identity> {
    let name = require_name(source)?.to_string();
    let short_name = match source.get("shortName") {
        Some(Value::String(short)) => short.clone(),
        _ => name.clone(),
    };
    let creature_type = source
        .text("type")
        .map(str::to_lowercase)
        .unwrap_or_else(|| defaults::CREATURE_TYPE.to_string());
    let size = source
        .str_field("size")
        .and_then(map_size)
        .unwrap_or(defaults::SIZE)
        .to_string();
    let alignment = source
        .str_field("alignment")
        .and_then(map_alignment)
        .unwrap_or(defaults::ALIGNMENT)
        .to_string();

    Ok(Identity {
        name,
        short_name,
        creature_type,
        size,
        alignment,
    })
}

fn map_size(size: &str) -> Option<&'static str> {
    match size.trim().to_lowercase().as_str() {
        "tiny" => Some("tiny"),
        "small" => Some("small"),
        "medium" => Some("medium"),
        "large" => Some("large"),
        "huge" => Some("huge"),
        "gargantuan" => Some("gargantuan"),
        _ => None,
    }
}

fn map_alignment(alignment: &str) -> Option<&'static str> {
    match alignment.trim().to_lowercase().as_str() {
        "unaligned" => Some("unaligned"),
        "any alignment" => Some("any"),
        "any non-good alignment" => Some("any non-good"),
        "any non-lawful alignment" => Some("any non-lawful"),
        "lawful good" => Some("lawful good"),
        "lawful neutral" => Some("lawful neutral"),
        "lawful evil" => Some("lawful evil"),
        "neutral good" => Some("neutral good"),
        "true neutral" => Some("neutral"),
        "neutral evil" => Some("neutral evil"),
        "chaotic good" => Some("chaotic good"),
        "chaotic neutral" => Some("chaotic neutral"),
        "chaotic evil" => Some("chaotic evil"),
        _ => None,
    }
}

pub fn extract_scores(source: &MonsterSource<'_>) -> AbilityScores {
    let score = |key: &str| source.int_or(key, defaults::ABILITY_SCORE);
    AbilityScores::new(
        score("strPoints"),
        score("dexPoints"),
        score("conPoints"),
        score("intPoints"),
        score("wisPoints"),
        score("chaPoints"),
    )
}

/// `natArmorBonus + 10` when the bonus parses, else the first number in
/// `otherArmorDesc`, else 10.
pub fn extract_armor_class(source: &MonsterSource<'_>) -> ArmorClass {
    let other_desc = source.text("otherArmorDesc");
    let value = match source.int_field("natArmorBonus") {
        Some(bonus) => bonus.saturating_add(defaults::ARMOR_CLASS_BASE),
        None => other_desc
            .and_then(|desc| FIRST_INT_PATTERN.find(desc))
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .filter(|ac| *ac != 0)
            .unwrap_or(defaults::ARMOR_CLASS),
    };
    let notes = other_desc
        .or_else(|| source.text("armorName"))
        .unwrap_or_default()
        .to_string();

    ArmorClass { value, notes }
}

pub fn extract_hit_points(source: &MonsterSource<'_>) -> HitPoints {
    let captures = source
        .raw_text("hpText")
        .and_then(|text| {
            HIT_POINTS_PATTERN.captures(&text).map(|caps| {
                (
                    caps[1].parse::<i32>().ok(),
                    caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                )
            })
        });

    match captures {
        Some((Some(value), formula)) => HitPoints { value, formula },
        _ => HitPoints {
            value: defaults::HIT_POINTS,
            formula: String::new(),
        },
    }
}

pub fn extract_speed(source: &MonsterSource<'_>) -> Movement {
    let speed = Speed {
        walk: source.int_or("speed", defaults::WALK_SPEED),
        climb: source.int_or("climbSpeed", defaults::SPECIAL_SPEED),
        burrow: source.int_or("burrowSpeed", defaults::SPECIAL_SPEED),
        fly: source.int_or("flySpeed", defaults::SPECIAL_SPEED),
        hover: source.truthy("hover"),
        swim: source.int_or("swimSpeed", defaults::SPECIAL_SPEED),
    };

    let notes = match source.text("speedDesc") {
        Some(desc) => desc.to_string(),
        None => {
            let mut parts = Vec::new();
            if let Some(walk) = source.raw_text("speed").filter(|s| !s.is_empty() && s != "0") {
                parts.push(format!("{} ft.", walk));
            }
            if speed.climb != 0 {
                parts.push(format!("climb {} ft.", speed.climb));
            }
            if speed.burrow != 0 {
                parts.push(format!("burrow {} ft.", speed.burrow));
            }
            if speed.fly != 0 {
                let hover = if speed.hover { " (hover)" } else { "" };
                parts.push(format!("fly {} ft.{}", speed.fly, hover));
            }
            if speed.swim != 0 {
                parts.push(format!("swim {} ft.", speed.swim));
            }
            parts.join(", ")
        }
    };

    Movement { speed, notes }
}

pub fn extract_senses(source: &MonsterSource<'_>, scores: &AbilityScores) -> Perception {
    let sense = |key: &str| source.int_field(key).filter(|range| *range != 0);
    Perception {
        senses: Senses {
            blindsight: sense("blindsight"),
            darkvision: sense("darkvision"),
            tremorsense: sense("tremorsense"),
            truesight: sense("truesight"),
        },
        passive: defaults::PASSIVE_PERCEPTION_BASE
            .saturating_add(scores.modifier(Ability::Wisdom)),
    }
}

/// Challenge rating from `cr` and XP from the `(1,800 XP)` part of `customCr`.
pub fn extract_challenge(source: &MonsterSource<'_>) -> Challenge {
    let rating = source.int_field("cr").unwrap_or(defaults::CHALLENGE_RATING);
    let xp = source
        .raw_text("customCr")
        .and_then(|text| {
            XP_PATTERN
                .captures(&text)
                .and_then(|caps| caps[1].replace(',', "").parse::<i32>().ok())
        })
        .unwrap_or(defaults::XP);

    Challenge {
        rating: ChallengeRating::from(rating),
        xp,
    }
}

pub fn extract_damage_properties(source: &MonsterSource<'_>) -> DamageProperties {
    let mut damage = DamageProperties::default();

    for property in source.array("properties") {
        let property = MonsterSource::new(property);
        let name = property.str_field("name").unwrap_or_default();
        let kind = property.str_field("type").unwrap_or_default().to_lowercase();
        let lowered = name.to_lowercase();
        let damage_type = property.text("damageType").unwrap_or(name).trim();

        if damage_type.is_empty() {
            debug!("Skipping damage property without a damage type");
            continue;
        }

        let bucket = if kind == "immunity" || lowered.contains("immune") {
            &mut damage.immunities
        } else if kind == "resistance" || lowered.contains("resistant") {
            &mut damage.resistances
        } else if kind == "vulnerability" || lowered.contains("vulnerable") {
            &mut damage.vulnerabilities
        } else {
            debug!(property = %damage_type, "Damage property has no recognizable kind");
            continue;
        };
        bucket.push(damage_type.to_string());
    }

    damage
}

/// Entries of a list that may hold plain strings or `{ "name": ... }` objects.
fn extract_named_list(source: &MonsterSource<'_>, key: &str) -> Vec<String> {
    source
        .array(key)
        .iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(name.trim()),
            Value::Object(_) => MonsterSource::new(entry).str_field("name").map(str::trim),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extract_saving_throws(
    source: &MonsterSource<'_>,
    scores: &AbilityScores,
    prof_bonus: i32,
) -> Vec<SavingThrow> {
    source
        .array("sthrows")
        .iter()
        .filter_map(|entry| {
            let name = MonsterSource::new(entry).str_field("name")?;
            match Ability::from_name(name) {
                Some(ability) => Some(SavingThrow {
                    ability,
                    modifier: scores.modifier(ability).saturating_add(prof_bonus),
                }),
                None => {
                    debug!(ability = name, "Skipping saving throw for unknown ability");
                    None
                }
            }
        })
        .collect()
}

pub fn extract_skills(
    source: &MonsterSource<'_>,
    scores: &AbilityScores,
    prof_bonus: i32,
) -> Vec<SkillBonus> {
    source
        .array("skills")
        .iter()
        .filter_map(|entry| {
            let entry = MonsterSource::new(entry);
            let skill = entry.text("name")?;
            let stat = entry.str_field("stat").unwrap_or_default();
            match Ability::from_name(stat) {
                Some(ability) => Some(SkillBonus {
                    skill: skill.to_string(),
                    modifier: scores.modifier(ability).saturating_add(prof_bonus),
                }),
                None => {
                    debug!(skill, stat, "Skipping skill for unknown ability");
                    None
                }
            }
        })
        .collect()
}

/// `{name, desc}` entries of an array field.
pub fn extract_features(source: &MonsterSource<'_>, key: &str) -> Vec<Feature> {
    source
        .array(key)
        .iter()
        .filter_map(|entry| {
            if !entry.is_object() {
                debug!(field = key, "Skipping non-object feature entry");
                return None;
            }
            let entry = MonsterSource::new(entry);
            let description = entry
                .str_field("desc")
                .or_else(|| entry.str_field("description"))
                .unwrap_or_default();
            Some(Feature::new(
                entry.str_field("name").unwrap_or_default(),
                description,
            ))
        })
        .collect()
}

fn extract_bookended(
    source: &MonsterSource<'_>,
    flag: &str,
    start: &str,
    end: &str,
) -> Option<BookendedText> {
    source.truthy(flag).then(|| BookendedText {
        description: source.str_field(start).unwrap_or_default().to_string(),
        end_description: source.str_field(end).unwrap_or_default().to_string(),
    })
}

pub fn extract_narrative(source: &MonsterSource<'_>) -> Narrative {
    let legendary = source.truthy("isLegendary").then(|| LegendaryActions {
        description: source
            .str_field("legendariesDescription")
            .unwrap_or_default()
            .to_string(),
        actions: extract_features(source, "legendaries"),
    });

    let is_mythic = source.truthy("isMythic");
    let mythic_trait = is_mythic.then(|| MythicTrait {
        description: source
            .str_field("mythicDescription")
            .unwrap_or_default()
            .to_string(),
    });
    let mythic_actions = if is_mythic {
        extract_features(source, "mythics")
    } else {
        Vec::new()
    };

    Narrative {
        abilities: extract_features(source, "abilities"),
        actions: extract_features(source, "actions"),
        reactions: extract_features(source, "reactions"),
        legendary,
        lair: extract_bookended(source, "isLair", "lairDescription", "lairDescriptionEnd"),
        mythic_trait,
        mythic_actions,
        regional: extract_bookended(
            source,
            "isRegional",
            "regionalDescription",
            "regionalDescriptionEnd",
        ),
    }
}

pub fn extract_extras(source: &MonsterSource<'_>) -> MonsterFileExtras {
    MonsterFileExtras {
        custom_prof: source.int_field("customProf").filter(|prof| *prof != 0),
        hit_dice: source.raw_text("hitDice").filter(|dice| !dice.is_empty()),
        armor_name: source.text("armorName").map(str::to_string),
        shield_bonus: source.int_or("shieldBonus", 0),
        nat_armor_bonus: source.int_or("natArmorBonus", 0),
        telepathy: source.int_or("telepathy", 0),
        blind: source.truthy("blind"),
    }
}

// ============================================================================
// Stage 2: Canonical Statblock
// ============================================================================

impl ExtractedFields {
    /// Context the narrative text of this record resolves against.
    pub fn resolve_context(&self) -> ResolveContext {
        ResolveContext {
            short_name: Some(self.identity.short_name.clone()),
            scores: self.scores,
            prof_bonus: self.prof_bonus,
            save_overrides: self
                .saving_throws
                .iter()
                .map(|save| (save.ability, save.modifier))
                .collect(),
            dc_override: None,
            hp: Some(self.hit_points.value),
            ac: Some(self.armor.value),
            challenge_rating: Some(self.challenge.rating),
        }
    }

    /// Build the canonical statblock, resolving all narrative text.
    pub fn into_statblock(self) -> CanonicalStatblock {
        let ctx = self.resolve_context();
        let resolver = Resolver::new(&ctx);
        let narrative = resolve_narrative(&resolver, &self.narrative);

        CanonicalStatblock {
            name: self.identity.name,
            short_name: self.identity.short_name,
            creature_type: self.identity.creature_type,
            size: self.identity.size,
            alignment: self.identity.alignment,
            prof_bonus: self.prof_bonus,
            ac: self.armor.value,
            ac_notes: self.armor.notes,
            hp: self.hit_points.value,
            hp_formula: self.hit_points.formula,
            speed: self.movement.speed,
            speed_notes: self.movement.notes,
            scores: self.scores,
            saving_throws: self.saving_throws,
            skills: self.skills,
            damage_immunities: self.damage.immunities,
            damage_resistances: self.damage.resistances,
            damage_vulnerabilities: self.damage.vulnerabilities,
            condition_immunities: self.condition_immunities,
            senses: self.perception.senses,
            passive_perception: self.perception.passive,
            languages: self.languages,
            challenge_rating: self.challenge.rating,
            xp: self.challenge.xp,
            abilities: narrative.abilities,
            actions: narrative.actions,
            reactions: narrative.reactions,
            legendary_actions: narrative.legendary,
            lair_actions: narrative.lair,
            mythic_trait: narrative.mythic_trait,
            mythic_actions: narrative.mythic_actions,
            regional_effects: narrative.regional,
            save_dc: None,
            source: defaults::MONSTER_FILE_SOURCE.to_string(),
            tags: defaults::MONSTER_FILE_TAGS.iter().map(|t| t.to_string()).collect(),
            notes: String::new(),
            is_local: true,
            monster_file: Some(self.extras),
        }
    }
}

fn resolve_features(resolver: &Resolver<'_>, features: &[Feature]) -> Vec<Feature> {
    features
        .iter()
        .map(|feature| Feature::new(feature.name.clone(), resolver.resolve(&feature.description)))
        .collect()
}

fn resolve_bookended(resolver: &Resolver<'_>, text: &BookendedText) -> BookendedText {
    BookendedText {
        description: resolver.resolve(&text.description),
        end_description: resolver.resolve(&text.end_description),
    }
}

fn resolve_narrative(resolver: &Resolver<'_>, narrative: &Narrative) -> Narrative {
    Narrative {
        abilities: resolve_features(resolver, &narrative.abilities),
        actions: resolve_features(resolver, &narrative.actions),
        reactions: resolve_features(resolver, &narrative.reactions),
        legendary: narrative.legendary.as_ref().map(|legendary| LegendaryActions {
            description: resolver.resolve(&legendary.description),
            actions: resolve_features(resolver, &legendary.actions),
        }),
        lair: narrative.lair.as_ref().map(|lair| resolve_bookended(resolver, lair)),
        mythic_trait: narrative.mythic_trait.as_ref().map(|mythic| MythicTrait {
            description: resolver.resolve(&mythic.description),
        }),
        mythic_actions: resolve_features(resolver, &narrative.mythic_actions),
        regional: narrative
            .regional
            .as_ref()
            .map(|regional| resolve_bookended(resolver, regional)),
    }
}
