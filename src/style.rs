//! Inline style completion.
//!
//! Re-reads the style string literal up to the cursor to decide whether a
//! property name or a property value is being typed.

use crate::kb::css;
use crate::text::{floor_char_boundary, TextRange};
use crate::types::{CandidateItem, CandidateKind};
use serde::Serialize;

/// What the cursor is positioned on inside a declaration list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StyleMode {
    Property,
    /// Value position of the (lowercased) property
    Value { property: String },
}

/// Cursor position within a style literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StylePosition {
    pub mode: StyleMode,
    /// Text typed so far, leading whitespace removed
    pub typed: String,
    /// Document range covering `typed`
    pub range: TextRange,
}

/// Locate the cursor inside a style literal.
///
/// `cursor` and `literal_start` are document offsets; the cursor is clamped to
/// the literal. The current declaration starts after the last `;` or line
/// break before the cursor.
pub fn resolve_style_position(literal: &str, cursor: usize, literal_start: usize) -> StylePosition {
    let relative = cursor.saturating_sub(literal_start).min(literal.len());
    let relative = floor_char_boundary(literal, relative);
    let before = &literal[..relative];

    let split = before.rfind(&[';', '\n'][..]).map_or(0, |i| i + 1);
    let segment = &before[split..];

    let (mode, typed) = match segment.find(':') {
        None => (StyleMode::Property, segment.trim_start()),
        Some(colon) => (
            StyleMode::Value {
                property: segment[..colon].trim().to_lowercase(),
            },
            segment[colon + 1..].trim_start(),
        ),
    };

    let end = literal_start + relative;
    StylePosition {
        mode,
        typed: typed.to_string(),
        range: TextRange::new(end - typed.len(), end),
    }
}

/// CSS candidates for a style position.
///
/// Filtering is a case-insensitive substring match, so `lex` still finds
/// `flex` when correcting the middle of a token.
pub fn style_candidates(position: &StylePosition) -> Vec<CandidateItem> {
    let needle = position.typed.to_lowercase();
    let matches = |candidate: &str| needle.is_empty() || candidate.to_lowercase().contains(&needle);

    match &position.mode {
        StyleMode::Property => css::PROPERTIES
            .iter()
            .filter(|candidate| matches(candidate))
            .enumerate()
            .map(|(i, property)| {
                CandidateItem::new(*property)
                    .with_kind(CandidateKind::Property)
                    .with_insert_text(format!("{}: ", property))
                    .with_range(position.range)
                    .with_priority(i as u32)
            })
            .collect(),
        StyleMode::Value { property } => css::values_for(property)
            .iter()
            .filter(|candidate| matches(candidate))
            .enumerate()
            .map(|(i, value)| {
                CandidateItem::new(*value)
                    .with_kind(CandidateKind::Value)
                    .with_range(position.range)
                    .with_priority(i as u32)
            })
            .collect(),
    }
}
