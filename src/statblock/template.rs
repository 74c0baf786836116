//! Placeholder Token Resolution
//!
//! Rewrites Tetra Cube template text such as `"[MON] makes a [STR ATK] attack
//! dealing [STR 2d6] damage (DC [DC])"` into rendered prose.
//!
//! Resolution is two steps:
//!
//! 1. [`scan`] walks the text once and emits [`Lexeme`]s: literal runs,
//!    `[bracket]` bodies and `{brace}` bodies.
//! 2. [`Resolver`] classifies each bracket body into a [`Token`] and maps it
//!    to a value computed from a [`ResolveContext`]. Brace bodies resolve
//!    their own bracket tokens, then lose their braces when the result is
//!    plain words.
//!
//! Resolved values are never rescanned, and a body that is not a known token
//! is emitted verbatim.
//!
//! # Example
//!
//! ```
//! use gm_statblocks::statblock::{AbilityScores, ResolveContext, resolve_text};
//!
//! let ctx = ResolveContext {
//!     scores: AbilityScores::new(16, 14, 14, 10, 10, 10),
//!     prof_bonus: 3,
//!     ..Default::default()
//! };
//! assert_eq!(
//!     resolve_text("[STR ATK] to hit, [STR 1d8] damage", &ctx),
//!     "+6 to hit, 1d8 +3 damage"
//! );
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::ability::{self, format_modifier, Ability, AbilityScores};
use super::defaults;
use super::model::{CanonicalStatblock, ChallengeRating};

// ============================================================================
// Context
// ============================================================================

/// Values a template can refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveContext {
    /// Replacement for `[MON]`; empty or absent falls back to "the creature".
    pub short_name: Option<String>,
    pub scores: AbilityScores,
    pub prof_bonus: i32,
    /// Explicit saving throw bonuses overriding `modifier + prof`.
    pub save_overrides: HashMap<Ability, i32>,
    /// Explicit save DC overriding the computed one.
    pub dc_override: Option<i32>,
    pub hp: Option<i32>,
    pub ac: Option<i32>,
    pub challenge_rating: Option<ChallengeRating>,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self {
            short_name: None,
            scores: AbilityScores::default(),
            prof_bonus: defaults::PROFICIENCY_BONUS,
            save_overrides: HashMap::new(),
            dc_override: None,
            hp: None,
            ac: None,
            challenge_rating: None,
        }
    }
}

impl ResolveContext {
    /// Context for re-rendering text against a stored statblock.
    pub fn from_statblock(statblock: &CanonicalStatblock) -> Self {
        Self {
            short_name: Some(statblock.short_name.clone()),
            scores: statblock.scores,
            prof_bonus: statblock.prof_bonus,
            save_overrides: statblock
                .saving_throws
                .iter()
                .map(|save| (save.ability, save.modifier))
                .collect(),
            dc_override: statblock.save_dc,
            hp: Some(statblock.hp),
            ac: Some(statblock.ac),
            challenge_rating: Some(statblock.challenge_rating),
        }
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// A piece of template text produced by [`scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme<'t> {
    Literal(&'t str),
    /// `[body]`; `raw` includes the brackets.
    Bracket { raw: &'t str, body: &'t str },
    /// `{body}`; `raw` includes the braces.
    Brace { raw: &'t str, body: &'t str },
}

/// Split text into literal runs and bracket/brace groups in one pass.
///
/// An opener without a matching closer is literal and scanning continues
/// right after it, so later groups of either kind are still found. If a
/// second opener of the same kind appears before the closer, the first one
/// is literal and the group starts at the second.
pub fn scan(text: &str) -> Vec<Lexeme<'_>> {
    let bytes = text.as_bytes();
    let mut lexemes = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let (open, close) = match bytes[i] {
            b'[' => (b'[', b']'),
            b'{' => (b'{', b'}'),
            _ => {
                i += 1;
                continue;
            }
        };

        let mut j = i + 1;
        let mut end = None;
        while j < bytes.len() {
            if bytes[j] == close {
                end = Some(j);
                break;
            }
            if bytes[j] == open {
                break;
            }
            j += 1;
        }

        let Some(end) = end else {
            i += 1;
            continue;
        };

        if literal_start < i {
            lexemes.push(Lexeme::Literal(&text[literal_start..i]));
        }
        let raw = &text[i..=end];
        let body = &text[i + 1..end];
        lexemes.push(if open == b'[' {
            Lexeme::Bracket { raw, body }
        } else {
            Lexeme::Brace { raw, body }
        });
        i = end + 1;
        literal_start = i;
    }

    if literal_start < text.len() {
        lexemes.push(Lexeme::Literal(&text[literal_start..]));
    }

    lexemes
}

// ============================================================================
// Tokens
// ============================================================================

/// Dice expression allowed after an ability code: `2d6`, `1d8+2`, `3d6 - 1`.
static DICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d+d\d+(?:\s*[+-]?\s*\d+)?$").expect("Failed to compile dice pattern regex")
});

/// Brace escape body: words separated by optional whitespace.
static BRACE_WORDS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+(?:\s*\w+)*$").expect("Failed to compile brace pattern regex"));

/// A recognized bracket placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[MON]`
    CreatureName,
    /// `[STR ATK]`
    AbilityAttack(Ability),
    /// `[ATK]`
    Attack,
    /// `[STR 2d6]`, dice kept as written.
    AbilityDamage(Ability, String),
    /// `[STR SAVE]`
    AbilitySave(Ability),
    /// `[DC]`
    SaveDc,
    /// `[PROF]` or `[PROF BONUS]`
    Proficiency,
    /// `[STR MOD]`
    AbilityModifier(Ability),
    /// `[STR]`
    AbilityScore(Ability),
    /// `[HP]`
    HitPoints,
    /// `[AC]`
    ArmorClass,
    /// `[CR]`
    ChallengeRating,
}

impl Token {
    /// Classify a bracket body. Case-insensitive; whitespace around and
    /// between words is optional (`[STR ATK]`, `[ str  atk ]`, `[STRATK]`).
    pub fn parse(body: &str) -> Option<Self> {
        let body = body.trim();
        if let Some(token) = Self::parse_ability_token(body) {
            return Some(token);
        }

        let compact: String = body
            .split_whitespace()
            .collect::<String>()
            .to_ascii_uppercase();
        match compact.as_str() {
            "MON" => Some(Self::CreatureName),
            "ATK" => Some(Self::Attack),
            "DC" => Some(Self::SaveDc),
            "PROF" | "PROFBONUS" => Some(Self::Proficiency),
            "HP" => Some(Self::HitPoints),
            "AC" => Some(Self::ArmorClass),
            "CR" => Some(Self::ChallengeRating),
            _ => None,
        }
    }

    fn parse_ability_token(body: &str) -> Option<Self> {
        let code = body.get(..3)?;
        let ability = Ability::ALL
            .into_iter()
            .find(|ability| code.eq_ignore_ascii_case(ability.abbreviated_name()))?;
        let rest = body[3..].trim();

        if rest.is_empty() {
            Some(Self::AbilityScore(ability))
        } else if rest.eq_ignore_ascii_case("ATK") {
            Some(Self::AbilityAttack(ability))
        } else if rest.eq_ignore_ascii_case("SAVE") {
            Some(Self::AbilitySave(ability))
        } else if rest.eq_ignore_ascii_case("MOD") {
            Some(Self::AbilityModifier(ability))
        } else if DICE_PATTERN.is_match(rest) {
            Some(Self::AbilityDamage(ability, rest.to_string()))
        } else {
            None
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves template text against one context.
///
/// The save DC and generic attack bonus are computed once on construction,
/// so one resolver can be reused for every text field of a statblock.
#[derive(Debug, Clone)]
pub struct Resolver<'c> {
    ctx: &'c ResolveContext,
    save_dc: i32,
    attack_bonus: i32,
}

impl<'c> Resolver<'c> {
    pub fn new(ctx: &'c ResolveContext) -> Self {
        let save_dc = ctx
            .dc_override
            .unwrap_or_else(|| ability::save_dc(&ctx.scores, ctx.prof_bonus));
        let attack_bonus = ability::generic_attack_bonus(&ctx.scores, ctx.prof_bonus);
        Self {
            ctx,
            save_dc,
            attack_bonus,
        }
    }

    /// Replace every recognized token in `text`.
    pub fn resolve(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for lexeme in scan(text) {
            match lexeme {
                Lexeme::Literal(literal) => out.push_str(literal),
                Lexeme::Bracket { raw, body } => match Token::parse(body) {
                    Some(token) => out.push_str(&self.value(&token)),
                    None => out.push_str(raw),
                },
                Lexeme::Brace { body, .. } => {
                    // Bracket tokens inside the braces resolve first: `{[DC]}` is `15`.
                    let inner = self.resolve(body);
                    if BRACE_WORDS_PATTERN.is_match(&inner) {
                        out.push_str(&inner);
                    } else {
                        out.push('{');
                        out.push_str(&inner);
                        out.push('}');
                    }
                }
            }
        }
        out
    }

    /// Rendered value of a single token.
    pub fn value(&self, token: &Token) -> String {
        let ctx = self.ctx;
        let prof = ctx.prof_bonus;
        match token {
            Token::CreatureName => ctx
                .short_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults::CREATURE_NAME)
                .to_string(),
            Token::AbilityAttack(ability) => {
                format_modifier(ctx.scores.modifier(*ability).saturating_add(prof))
            }
            Token::Attack => format_modifier(self.attack_bonus),
            Token::AbilityDamage(ability, dice) => {
                let modifier = ctx.scores.modifier(*ability);
                if modifier == 0 {
                    dice.clone()
                } else {
                    format!("{} {}", dice, format_modifier(modifier))
                }
            }
            Token::AbilitySave(ability) => {
                let bonus = ctx
                    .save_overrides
                    .get(ability)
                    .copied()
                    .unwrap_or_else(|| ctx.scores.modifier(*ability).saturating_add(prof));
                format_modifier(bonus)
            }
            Token::SaveDc => self.save_dc.to_string(),
            Token::Proficiency => format_modifier(prof),
            Token::AbilityModifier(ability) => format_modifier(ctx.scores.modifier(*ability)),
            Token::AbilityScore(ability) => ctx.scores.get(*ability).to_string(),
            Token::HitPoints => ctx
                .hp
                .map(|hp| hp.to_string())
                .unwrap_or_else(|| defaults::HIT_POINTS_TEXT.to_string()),
            Token::ArmorClass => ctx
                .ac
                .map(|ac| ac.to_string())
                .unwrap_or_else(|| defaults::ARMOR_CLASS_TEXT.to_string()),
            Token::ChallengeRating => ctx
                .challenge_rating
                .map(|cr| cr.to_string())
                .unwrap_or_else(|| defaults::CHALLENGE_RATING_TEXT.to_string()),
        }
    }
}

/// Resolve every token in `text` against `ctx`.
pub fn resolve_text(text: &str, ctx: &ResolveContext) -> String {
    Resolver::new(ctx).resolve(text)
}
