//! Property-based tests for Ability Arithmetic
//!
//! Tests invariants:
//! - Modifier matches the floored formula for negative and oversized scores
//! - Modifier is monotonic in the score
//! - Proficiency bonus is at least 2 and follows the CR curve
//! - Save DC picks the strongest ability

use proptest::prelude::*;

use crate::statblock::{
    format_modifier, modifier, proficiency_bonus, save_dc, Ability, AbilityScores,
};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_scores() -> impl Strategy<Value = AbilityScores> {
    proptest::array::uniform6(1i32..=30).prop_map(|[str, dex, con, int, wis, cha]| {
        AbilityScores::new(str, dex, con, int, wis, cha)
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: modifier is `floor((score - 10) / 2)`
    #[test]
    fn prop_modifier_matches_floor_formula(score in -100i32..=100) {
        let expected = ((score - 10) as f64 / 2.0).floor() as i32;
        prop_assert_eq!(modifier(score), expected);
    }

    /// Property: a higher score never has a lower modifier
    #[test]
    fn prop_modifier_is_monotonic(score in -100i32..=100, step in 0i32..20) {
        prop_assert!(modifier(score + step) >= modifier(score));
    }

    /// Property: proficiency bonus follows `ceil(cr / 4) + 1`
    #[test]
    fn prop_proficiency_bonus_curve(cr in 1u8..=30) {
        let cr = f32::from(cr);
        let bonus = proficiency_bonus(cr);
        prop_assert_eq!(bonus, (cr / 4.0).ceil() as i32 + 1);
        prop_assert!(bonus >= 2);
    }

    /// Property: save DC is the maximum of base + modifier + proficiency
    #[test]
    fn prop_save_dc_is_best_ability(scores in arb_scores(), prof in 2i32..=9) {
        let dc = save_dc(&scores, prof);
        for ability in Ability::ALL {
            prop_assert!(dc >= ability.save_dc_base() + scores.modifier(ability) + prof);
        }
        prop_assert!(Ability::ALL
            .iter()
            .any(|ability| dc == ability.save_dc_base() + scores.modifier(*ability) + prof));
    }

    /// Property: formatted modifiers are signed and parse back
    #[test]
    fn prop_format_modifier_parses_back(value in -50i32..=50) {
        let text = format_modifier(value);
        prop_assert!(text.starts_with('+') || text.starts_with('-'));
        prop_assert_eq!(text.parse::<i32>().ok(), Some(value));
    }
}
