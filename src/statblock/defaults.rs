//! Default Values
//!
//! Every fallback the normalizer and template resolver apply when a monster
//! file omits or garbles a field. One constant per field.

/// Ability score used for any missing, zero or non-numeric score.
pub const ABILITY_SCORE: i32 = 10;

/// Added to `natArmorBonus` to get the armor class.
pub const ARMOR_CLASS_BASE: i32 = 10;

/// Armor class when neither a natural armor bonus nor an armor description is usable.
pub const ARMOR_CLASS: i32 = 10;

/// Hit points when `hpText` is absent or has no leading number.
pub const HIT_POINTS: i32 = 0;

pub const WALK_SPEED: i32 = 30;
pub const SPECIAL_SPEED: i32 = 0;

pub const PASSIVE_PERCEPTION_BASE: i32 = 10;

pub const CHALLENGE_RATING: i32 = 0;
pub const XP: i32 = 0;

/// Proficiency bonus for a falsy (zero or unparseable) challenge rating.
pub const PROFICIENCY_BONUS: i32 = 2;

/// Flat bonus baked into the `[ATK]` token by the Tetra Cube template format.
pub const ATTACK_BONUS_OFFSET: i32 = 5;

/// Save DC base for Strength and Dexterity.
pub const PHYSICAL_SAVE_DC_BASE: i32 = 8;

/// Save DC base for Constitution, Intelligence, Wisdom and Charisma.
pub const MENTAL_SAVE_DC_BASE: i32 = 10;

/// Replacement for `[MON]` when the statblock has no short name.
pub const CREATURE_NAME: &str = "the creature";

/// Rendered `[HP]` when no hit points are known.
pub const HIT_POINTS_TEXT: &str = "0";

/// Rendered `[AC]` when no armor class is known.
pub const ARMOR_CLASS_TEXT: &str = "10";

/// Rendered `[CR]` when no challenge rating is known.
pub const CHALLENGE_RATING_TEXT: &str = "0";

pub const CREATURE_TYPE: &str = "unknown";
pub const SIZE: &str = "medium";
pub const ALIGNMENT: &str = "unaligned";

/// `source` stamped on statblocks produced from `.monster` files.
pub const MONSTER_FILE_SOURCE: &str = "monster-file";

/// `source` for statblocks that did not come from a monster file.
pub const CUSTOM_SOURCE: &str = "custom";

/// Tags stamped on statblocks produced from `.monster` files.
pub const MONSTER_FILE_TAGS: &[&str] = &["imported", "monster"];

/// `source` stamped on statblocks from the bundled SRD library.
pub const SRD_SOURCE: &str = "5e SRD";
