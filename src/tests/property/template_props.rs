//! Property-based tests for Template Resolution
//!
//! Tests invariants:
//! - Text with no brackets or braces passes through unchanged
//! - Ability modifier and attack tokens follow the modifier formula
//! - Bracket bodies that are not tokens stay as written
//! - A stray opener never hides the tokens after it

use proptest::prelude::*;

use crate::statblock::{format_modifier, resolve_text, Ability, AbilityScores, ResolveContext};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_ability() -> impl Strategy<Value = Ability> {
    prop::sample::select(Ability::ALL.to_vec())
}

fn context_with(ability: Ability, score: i32, prof_bonus: i32) -> ResolveContext {
    let mut scores = AbilityScores::uniform(10);
    match ability {
        Ability::Strength => scores.strength = score,
        Ability::Dexterity => scores.dexterity = score,
        Ability::Constitution => scores.constitution = score,
        Ability::Intelligence => scores.intelligence = score,
        Ability::Wisdom => scores.wisdom = score,
        Ability::Charisma => scores.charisma = score,
    }
    ResolveContext {
        scores,
        prof_bonus,
        ..Default::default()
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: resolution is the identity on text without groups
    #[test]
    fn prop_plain_text_unchanged(text in "[^\\[\\]{}]{0,200}") {
        let ctx = ResolveContext::default();
        prop_assert_eq!(resolve_text(&text, &ctx), text);
    }

    /// Property: `[XXX MOD]` renders the signed modifier and `[XXX ATK]`
    /// adds the proficiency bonus
    #[test]
    fn prop_modifier_tokens_follow_formula(
        ability in arb_ability(),
        score in 1i32..=30,
        prof in 2i32..=9
    ) {
        let ctx = context_with(ability, score, prof);
        let code = ability.abbreviated_name();
        let expected = ((score - 10) as f64 / 2.0).floor() as i32;

        prop_assert_eq!(
            resolve_text(&format!("[{} MOD]", code), &ctx),
            format_modifier(expected)
        );
        prop_assert_eq!(
            resolve_text(&format!("[{} ATK]", code.to_lowercase()), &ctx),
            format_modifier(expected + prof)
        );
        prop_assert_eq!(resolve_text(&format!("[{}]", code), &ctx), score.to_string());
    }

    /// Property: unknown bracket bodies are emitted verbatim
    #[test]
    fn prop_unknown_bracket_kept(
        body in "q[a-z]{3,8}",
        before in "[a-z ]{0,20}",
        after in "[a-z ]{0,20}"
    ) {
        let ctx = ResolveContext::default();
        let text = format!("{}[{}]{}", before, body, after);
        prop_assert_eq!(resolve_text(&text, &ctx), text);
    }

    /// Property: an unmatched `{` or `[` stays literal and the token after it
    /// still resolves
    #[test]
    fn prop_stray_opener_keeps_later_tokens(
        opener in prop::sample::select(vec!['{', '[']),
        filler in "[a-z ]{0,20}",
        ability in arb_ability(),
        score in 1i32..=30
    ) {
        let ctx = context_with(ability, score, 2);
        let code = ability.abbreviated_name();
        let text = format!("{}{}[{} MOD]", opener, filler, code);
        let expected = format!(
            "{}{}{}",
            opener,
            filler,
            format_modifier(ctx.scores.modifier(ability))
        );
        prop_assert_eq!(resolve_text(&text, &ctx), expected);
    }
}
