//! Canonical Statblock Types
//!
//! The normalized statblock produced by the parser and stored in the library.
//! Field names serialize in camelCase to match the dashboard's JSON format.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ability::{Ability, AbilityScores};
use super::defaults;

// ============================================================================
// Challenge Rating
// ============================================================================

/// Challenge rating, whole or fractional (1/8, 1/4, 1/2).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ChallengeRating(f32);

impl ChallengeRating {
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Falsy in the monster-file sense: zero or NaN.
    pub fn is_zero(self) -> bool {
        self.0 == 0.0 || self.0.is_nan()
    }
}

impl From<i32> for ChallengeRating {
    fn from(value: i32) -> Self {
        Self(value as f32)
    }
}

impl FromStr for ChallengeRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((num, denom)) = s.split_once('/') {
            let invalid = |_| format!("Invalid challenge rating: {s}");
            let num: f32 = num.trim().parse().map_err(invalid)?;
            let denom: f32 = denom.trim().parse().map_err(invalid)?;
            if denom.abs() < f32::EPSILON {
                return Err(format!("Invalid challenge rating: {s}"));
            }
            return Ok(Self(num / denom));
        }
        s.parse::<f32>()
            .map(Self)
            .map_err(|_| format!("Invalid challenge rating: {s}"))
    }
}

impl fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FRACTIONS: [(f32, &str); 3] = [(0.125, "1/8"), (0.25, "1/4"), (0.5, "1/2")];
        for (value, label) in FRACTIONS {
            if (self.0 - value).abs() < f32::EPSILON {
                return f.write_str(label);
            }
        }
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for ChallengeRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.0)
    }
}

impl<'de> Deserialize<'de> for ChallengeRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(Self(value)),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// Component Types
// ============================================================================

/// Movement speeds in feet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speed {
    pub walk: i32,
    pub climb: i32,
    pub burrow: i32,
    pub fly: i32,
    pub hover: bool,
    pub swim: i32,
}

impl Default for Speed {
    fn default() -> Self {
        Self {
            walk: defaults::WALK_SPEED,
            climb: defaults::SPECIAL_SPEED,
            burrow: defaults::SPECIAL_SPEED,
            fly: defaults::SPECIAL_SPEED,
            hover: false,
            swim: defaults::SPECIAL_SPEED,
        }
    }
}

/// Special senses; only senses the creature has are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Senses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blindsight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub darkvision: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tremorsense: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truesight: Option<i32>,
}

impl Senses {
    pub fn is_empty(&self) -> bool {
        self.blindsight.is_none()
            && self.darkvision.is_none()
            && self.tremorsense.is_none()
            && self.truesight.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrow {
    pub ability: Ability,
    pub modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBonus {
    pub skill: String,
    pub modifier: i32,
}

/// A named trait, action, reaction or legendary/mythic action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub name: String,
    pub description: String,
}

impl Feature {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendaryActions {
    pub description: String,
    pub actions: Vec<Feature>,
}

/// Text block with an opening and a closing paragraph (lair actions, regional effects).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookendedText {
    pub description: String,
    pub end_description: String,
}

pub type LairActions = BookendedText;
pub type RegionalEffects = BookendedText;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MythicTrait {
    pub description: String,
}

/// Monster-file fields kept verbatim for round-tripping back to the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonsterFileExtras {
    pub custom_prof: Option<i32>,
    pub hit_dice: Option<String>,
    pub armor_name: Option<String>,
    pub shield_bonus: i32,
    pub nat_armor_bonus: i32,
    pub telepathy: i32,
    pub blind: bool,
}

// ============================================================================
// Canonical Statblock
// ============================================================================

/// A normalized creature statblock with all template text already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanonicalStatblock {
    pub name: String,
    pub short_name: String,
    #[serde(rename = "type")]
    pub creature_type: String,
    pub size: String,
    pub alignment: String,
    pub prof_bonus: i32,

    pub ac: i32,
    pub ac_notes: String,
    pub hp: i32,
    pub hp_formula: String,
    pub speed: Speed,
    pub speed_notes: String,

    pub scores: AbilityScores,
    pub saving_throws: Vec<SavingThrow>,
    pub skills: Vec<SkillBonus>,

    pub damage_immunities: Vec<String>,
    pub damage_resistances: Vec<String>,
    pub damage_vulnerabilities: Vec<String>,
    pub condition_immunities: Vec<String>,

    pub senses: Senses,
    pub passive_perception: i32,
    pub languages: Vec<String>,
    pub challenge_rating: ChallengeRating,
    pub xp: i32,

    pub abilities: Vec<Feature>,
    pub actions: Vec<Feature>,
    pub reactions: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legendary_actions: Option<LegendaryActions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lair_actions: Option<LairActions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mythic_trait: Option<MythicTrait>,
    pub mythic_actions: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional_effects: Option<RegionalEffects>,

    /// Explicit save DC overriding the computed one for `[DC]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dc: Option<i32>,

    pub source: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub is_local: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monster_file: Option<MonsterFileExtras>,
}

impl Default for CanonicalStatblock {
    fn default() -> Self {
        Self {
            name: String::new(),
            short_name: String::new(),
            creature_type: defaults::CREATURE_TYPE.to_string(),
            size: defaults::SIZE.to_string(),
            alignment: defaults::ALIGNMENT.to_string(),
            prof_bonus: defaults::PROFICIENCY_BONUS,
            ac: defaults::ARMOR_CLASS,
            ac_notes: String::new(),
            hp: defaults::HIT_POINTS,
            hp_formula: String::new(),
            speed: Speed::default(),
            speed_notes: String::new(),
            scores: AbilityScores::default(),
            saving_throws: Vec::new(),
            skills: Vec::new(),
            damage_immunities: Vec::new(),
            damage_resistances: Vec::new(),
            damage_vulnerabilities: Vec::new(),
            condition_immunities: Vec::new(),
            senses: Senses::default(),
            passive_perception: defaults::PASSIVE_PERCEPTION_BASE,
            languages: Vec::new(),
            challenge_rating: ChallengeRating::default(),
            xp: defaults::XP,
            abilities: Vec::new(),
            actions: Vec::new(),
            reactions: Vec::new(),
            legendary_actions: None,
            lair_actions: None,
            mythic_trait: None,
            mythic_actions: Vec::new(),
            regional_effects: None,
            save_dc: None,
            source: defaults::CUSTOM_SOURCE.to_string(),
            tags: Vec::new(),
            notes: String::new(),
            is_local: true,
            monster_file: None,
        }
    }
}

impl CanonicalStatblock {
    /// Explicit saving throw bonus for an ability, if the statblock lists one.
    pub fn saving_throw(&self, ability: Ability) -> Option<i32> {
        self.saving_throws
            .iter()
            .find(|save| save.ability == ability)
            .map(|save| save.modifier)
    }
}
