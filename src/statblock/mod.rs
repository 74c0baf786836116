//! Statblock Parsing
//!
//! Everything needed to turn a monster file into a canonical statblock:
//! - [`ability`]: modifiers, proficiency bonus, save DC, attack bonus
//! - [`template`]: `[STR ATK]`-style placeholder resolution
//! - [`normalizer`]: monster-file JSON to [`CanonicalStatblock`]
//! - [`canonical`]: lenient reading of records already in statblock shape
//! - [`rich_text`]: `_emphasis_` splitting for display
//!
//! All of it is pure and synchronous.

pub mod ability;
pub mod canonical;
pub mod defaults;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod rich_text;
pub mod source;
pub mod template;

pub use ability::{
    format_modifier, generic_attack_bonus, modifier, proficiency_bonus, save_dc, Ability,
    AbilityScores,
};
pub use error::{StatblockError, StatblockResult};
pub use model::{
    BookendedText, CanonicalStatblock, ChallengeRating, Feature, LairActions, LegendaryActions,
    MonsterFileExtras, MythicTrait, RegionalEffects, SavingThrow, Senses, SkillBonus, Speed,
};
pub use canonical::parse_canonical_value;
pub use normalizer::{parse_monster_file, parse_monster_value, ExtractedFields};
pub use rich_text::{render_elements, split, Segment};
pub use source::MonsterSource;
pub use template::{resolve_text, scan, Lexeme, ResolveContext, Resolver, Token};
