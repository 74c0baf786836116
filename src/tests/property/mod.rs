//! Property-based tests for statblock parsing
//!
//! This module contains property-based tests using the proptest framework.
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! Run all property tests:
//! ```sh
//! cargo test property --release
//! ```
//!
//! Run a specific property test module:
//! ```sh
//! cargo test property::template_props --release
//! ```
//!
//! ## Test Modules
//!
//! - `ability_props`: Tests for ability score arithmetic
//!   - Modifier is `floor((score - 10) / 2)` for any score
//!   - Modifier never decreases as the score grows
//!   - Proficiency bonus follows `ceil(cr / 4) + 1` and is at least 2
//!   - Save DC is the best ability's base + modifier + proficiency
//!   - Formatted modifiers parse back to the same number
//!
//! - `template_props`: Tests for placeholder resolution
//!   - Text without brackets or braces is unchanged
//!   - `[XXX MOD]` and `[XXX ATK]` follow the modifier formula
//!   - Unrecognized bracket bodies are kept verbatim
//!   - A stray `{` or `[` does not swallow the tokens after it
//!
//! - `rich_text_props`: Tests for emphasis splitting
//!   - Text without underscores is a single plain segment
//!   - Only the paired underscores are dropped
//!   - Plain segments are never adjacent
//!   - Emphasis never spans a line break

mod ability_props;
mod rich_text_props;
mod template_props;
