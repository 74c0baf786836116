//! Property-based tests for Emphasis Splitting
//!
//! Tests invariants:
//! - Text without underscores is one plain segment
//! - Splitting only removes the two underscores around each emphasis
//! - Plain segments are merged, never adjacent
//! - Emphasis segments hold no underscore or line break

use proptest::prelude::*;

use crate::statblock::{split, Segment};

proptest! {
    /// Property: no underscores means one plain segment (or none)
    #[test]
    fn prop_plain_text_single_segment(text in "[^_]{0,200}") {
        let segments = split(&text);
        if text.is_empty() {
            prop_assert!(segments.is_empty());
        } else {
            prop_assert_eq!(segments, vec![Segment::Plain(text)]);
        }
    }

    /// Property: segment text plus two markers per emphasis covers the input
    #[test]
    fn prop_only_pair_markers_dropped(text in "[a-c_ \n]{0,80}") {
        let segments = split(&text);
        let kept: usize = segments.iter().map(|s| s.text().len()).sum();
        let emphasized = segments.iter().filter(|s| s.is_emphasis()).count();
        prop_assert_eq!(kept + 2 * emphasized, text.len());

        let joined: String = segments.iter().map(Segment::text).collect();
        let without_markers: String = text.chars().filter(|c| *c != '_').collect();
        let joined_without: String = joined.chars().filter(|c| *c != '_').collect();
        prop_assert_eq!(joined_without, without_markers);
    }

    /// Property: no two plain segments are adjacent
    #[test]
    fn prop_plain_segments_merged(text in "[a-c_ \n]{0,80}") {
        let segments = split(&text);
        for pair in segments.windows(2) {
            let both_plain =
                matches!(pair[0], Segment::Plain(_)) && matches!(pair[1], Segment::Plain(_));
            prop_assert!(!both_plain);
        }
    }

    /// Property: emphasis is non-empty and stays on one line
    #[test]
    fn prop_emphasis_single_line(text in "[a-c_ \n]{0,80}") {
        for segment in split(&text) {
            if let Segment::Emphasis(inner) = segment {
                prop_assert!(!inner.is_empty());
                prop_assert!(!inner.contains('\n'));
                prop_assert!(!inner.contains('_'));
            }
        }
    }
}
