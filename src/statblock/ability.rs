//! Ability Score Derivation
//!
//! Pure functions turning ability scores and challenge rating into the
//! numbers every template token is built from: modifiers, proficiency bonus,
//! save DC and the generic attack bonus.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::defaults;

// ============================================================================
// Ability
// ============================================================================

/// One of the six D&D 5e abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "str", alias = "strength")]
    Strength,
    #[serde(rename = "dex", alias = "dexterity")]
    Dexterity,
    #[serde(rename = "con", alias = "constitution")]
    Constitution,
    #[serde(rename = "int", alias = "intelligence")]
    Intelligence,
    #[serde(rename = "wis", alias = "wisdom")]
    Wisdom,
    #[serde(rename = "cha", alias = "charisma")]
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// Lowercase three-letter key used by monster files (`str`, `dex`, ...).
    pub fn abbreviated_name(&self) -> &'static str {
        match self {
            Self::Strength => "str",
            Self::Dexterity => "dex",
            Self::Constitution => "con",
            Self::Intelligence => "int",
            Self::Wisdom => "wis",
            Self::Charisma => "cha",
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Dexterity => "Dexterity",
            Self::Constitution => "Constitution",
            Self::Intelligence => "Intelligence",
            Self::Wisdom => "Wisdom",
            Self::Charisma => "Charisma",
        }
    }

    /// Look up an ability by short or long name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|ability| {
            name.eq_ignore_ascii_case(ability.abbreviated_name())
                || name.eq_ignore_ascii_case(ability.long_name())
        })
    }

    /// Base added to modifier and proficiency when computing the save DC.
    ///
    /// Strength and Dexterity use 8, the other four use 10. Published
    /// monster files were authored against these numbers.
    pub fn save_dc_base(&self) -> i32 {
        match self {
            Self::Strength | Self::Dexterity => defaults::PHYSICAL_SAVE_DC_BASE,
            _ => defaults::MENTAL_SAVE_DC_BASE,
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviated_name())
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six raw ability scores of a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores {
    #[serde(rename = "str", alias = "strength")]
    pub strength: i32,
    #[serde(rename = "dex", alias = "dexterity")]
    pub dexterity: i32,
    #[serde(rename = "con", alias = "constitution")]
    pub constitution: i32,
    #[serde(rename = "int", alias = "intelligence")]
    pub intelligence: i32,
    #[serde(rename = "wis", alias = "wisdom")]
    pub wisdom: i32,
    #[serde(rename = "cha", alias = "charisma")]
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(defaults::ABILITY_SCORE)
    }
}

impl AbilityScores {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn uniform(score: i32) -> Self {
        Self::new(score, score, score, score, score, score)
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        modifier(self.get(ability))
    }
}

// ============================================================================
// Derived Numbers
// ============================================================================

/// Ability modifier: `floor((score - 10) / 2)` for any integer score.
pub fn modifier(score: i32) -> i32 {
    // Widened so `i32::MIN` does not overflow; the halved result always fits.
    (i64::from(score) - 10).div_euclid(2) as i32
}

/// Proficiency bonus from challenge rating: `ceil(cr / 4) + 1`.
///
/// A zero or NaN rating yields the default of 2. This is a simplified curve,
/// not the exact 5e CR table.
pub fn proficiency_bonus(cr: f32) -> i32 {
    if cr == 0.0 || cr.is_nan() {
        return defaults::PROFICIENCY_BONUS;
    }
    ((cr / 4.0).ceil() as i32).saturating_add(1)
}

/// Highest save DC across all six abilities.
pub fn save_dc(scores: &AbilityScores, prof_bonus: i32) -> i32 {
    Ability::ALL
        .iter()
        .map(|ability| {
            ability
                .save_dc_base()
                .saturating_add(scores.modifier(*ability))
                .saturating_add(prof_bonus)
        })
        .fold(i32::MIN, i32::max)
}

/// Generic attack bonus used by the bare `[ATK]` token.
pub fn generic_attack_bonus(scores: &AbilityScores, prof_bonus: i32) -> i32 {
    let best = scores
        .modifier(Ability::Strength)
        .max(scores.modifier(Ability::Dexterity));
    best.saturating_add(prof_bonus).saturating_add(defaults::ATTACK_BONUS_OFFSET)
}

/// Signed display form of a modifier: `+3`, `+0`, `-1`.
pub fn format_modifier(value: i32) -> String {
    if value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_boundaries() {
        assert_eq!(modifier(10), 0);
        assert_eq!(modifier(11), 0);
        assert_eq!(modifier(8), -1);
        assert_eq!(modifier(9), -1);
        assert_eq!(modifier(20), 5);
        assert_eq!(modifier(1), -5);
        assert_eq!(modifier(30), 10);
        assert_eq!(modifier(0), -5);
        assert_eq!(modifier(-1), -6);
    }

    #[test]
    fn test_extreme_scores_do_not_overflow() {
        assert_eq!(modifier(i32::MIN), -1_073_741_829);
        assert_eq!(modifier(i32::MAX), 1_073_741_818);
        assert_eq!(proficiency_bonus(f32::MAX), i32::MAX);
        assert_eq!(proficiency_bonus(f32::INFINITY), i32::MAX);

        let scores = AbilityScores::uniform(i32::MAX);
        assert_eq!(save_dc(&scores, i32::MAX), i32::MAX);
        assert_eq!(generic_attack_bonus(&scores, i32::MAX), i32::MAX);

        let scores = AbilityScores::uniform(i32::MIN);
        assert_eq!(save_dc(&scores, i32::MIN), i32::MIN);
        assert_eq!(generic_attack_bonus(&scores, i32::MIN), i32::MIN + 5);
    }

    #[test]
    fn test_proficiency_bonus() {
        assert_eq!(proficiency_bonus(0.0), 2);
        assert_eq!(proficiency_bonus(f32::NAN), 2);
        assert_eq!(proficiency_bonus(0.25), 2);
        assert_eq!(proficiency_bonus(1.0), 2);
        assert_eq!(proficiency_bonus(4.0), 2);
        assert_eq!(proficiency_bonus(5.0), 3);
        assert_eq!(proficiency_bonus(8.0), 3);
        assert_eq!(proficiency_bonus(9.0), 4);
        assert_eq!(proficiency_bonus(30.0), 9);
    }

    #[test]
    fn test_save_dc_uses_mental_base_of_ten() {
        // STR gives 8 + 3 + 3 = 14, but CON 14 gives 10 + 2 + 3 = 15.
        let scores = AbilityScores::new(16, 14, 14, 10, 10, 10);
        assert_eq!(save_dc(&scores, 3), 15);

        // A caster with CHA 18 gets 10 + 4 + 2 = 16, not the canonical 14.
        let caster = AbilityScores::new(8, 12, 10, 10, 10, 18);
        assert_eq!(save_dc(&caster, 2), 16);

        // All-default scores: CON/INT/WIS/CHA win with 10 + 0 + 2.
        assert_eq!(save_dc(&AbilityScores::default(), 2), 12);
    }

    #[test]
    fn test_generic_attack_bonus() {
        let scores = AbilityScores::new(16, 14, 14, 10, 10, 10);
        assert_eq!(generic_attack_bonus(&scores, 3), 3 + 3 + 5);

        let nimble = AbilityScores::new(8, 18, 10, 10, 10, 10);
        assert_eq!(generic_attack_bonus(&nimble, 2), 4 + 2 + 5);
    }

    #[test]
    fn test_format_modifier() {
        assert_eq!(format_modifier(5), "+5");
        assert_eq!(format_modifier(0), "+0");
        assert_eq!(format_modifier(-1), "-1");
    }

    #[test]
    fn test_ability_from_name() {
        assert_eq!(Ability::from_name("str"), Some(Ability::Strength));
        assert_eq!(Ability::from_name("WIS"), Some(Ability::Wisdom));
        assert_eq!(Ability::from_name("Charisma"), Some(Ability::Charisma));
        assert_eq!(Ability::from_name(" dex "), Some(Ability::Dexterity));
        assert_eq!(Ability::from_name("luck"), None);
    }

    #[test]
    fn test_scores_serde_accepts_long_names() {
        let scores: AbilityScores =
            serde_json::from_str(r#"{"strength": 18, "dex": 12}"#).unwrap();
        assert_eq!(scores.strength, 18);
        assert_eq!(scores.dexterity, 12);
        assert_eq!(scores.charisma, 10);

        let json = serde_json::to_value(scores).unwrap();
        assert_eq!(json["str"], 18);
    }
}
