//! Emphasis Splitting
//!
//! Statblock prose marks italics with underscores (`_Melee Weapon Attack:_`).
//! [`split`] turns resolved text into plain and emphasis segments a front end
//! can render directly.

use serde::{Deserialize, Serialize};

use super::template::{resolve_text, ResolveContext};

/// One run of rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Segment {
    Plain(String),
    Emphasis(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Emphasis(text) => text,
        }
    }

    pub fn is_emphasis(&self) -> bool {
        matches!(self, Self::Emphasis(_))
    }
}

/// Split text on `_emphasis_` pairs.
///
/// A pair never spans a line break. `__` has no inner text and stays plain,
/// as does an underscore without a partner. Adjacent plain runs are merged.
pub fn split(text: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('_') {
        let after = &rest[open + 1..];
        let close = after
            .find(['_', '\n'])
            .filter(|&idx| after.as_bytes()[idx] == b'_');

        match close {
            Some(0) => {
                plain.push_str(&rest[..open + 2]);
                rest = &after[1..];
            }
            Some(idx) => {
                plain.push_str(&rest[..open]);
                if !plain.is_empty() {
                    segments.push(Segment::Plain(std::mem::take(&mut plain)));
                }
                segments.push(Segment::Emphasis(after[..idx].to_string()));
                rest = &after[idx + 1..];
            }
            None => {
                plain.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        segments.push(Segment::Plain(plain));
    }
    segments
}

/// Resolve template tokens in `text`, then split it into segments.
///
/// Absent text renders as no segments.
pub fn render_elements(text: Option<&str>, ctx: &ResolveContext) -> Vec<Segment> {
    match text {
        Some(text) if !text.is_empty() => split(&resolve_text(text, ctx)),
        _ => Vec::new(),
    }
}
