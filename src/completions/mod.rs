//! Completion assembly
//!
//! Turns a classified cursor context, plus the resolved component class when
//! one is known, into an ordered candidate list.

mod attributes;
pub mod docs;
pub mod snippet;

pub use attributes::{build_item, candidate_kind};

use crate::kb::KnowledgeBase;
use crate::style::{resolve_style_position, style_candidates};
use crate::text::TextRange;
use crate::types::{CandidateItem, CandidateKind, ContextKind, DocumentContext, UiFunctionContext};

/// Assemble candidates for a context.
///
/// `class_name` is only consulted for props, slots, events and methods; an
/// unknown or missing class falls back to the generic lists.
pub fn assemble(
    kb: &KnowledgeBase,
    ctx: &DocumentContext,
    class_name: Option<&str>,
) -> Vec<CandidateItem> {
    match ctx.kind {
        ContextKind::Icons => kb.icons.iter().map(CandidateItem::new).collect(),
        ContextKind::Classes => {
            if ctx.surround.is_none() {
                return Vec::new();
            }
            filter_list(&kb.utility_classes, &ctx.word, word_range(ctx)).collect()
        }
        ContextKind::Style => match (&ctx.surround, ctx.surround_range) {
            (Some(literal), Some(range)) => {
                style_candidates(&resolve_style_position(literal, ctx.offset, range.start))
            }
            _ => Vec::new(),
        },
        ContextKind::Props | ContextKind::Slots | ContextKind::Events | ContextKind::Methods => {
            match ctx.kind.attribute_kind() {
                Some(kind) => attributes::complete_attributes(kb, ctx, kind, class_name),
                None => Vec::new(),
            }
        }
    }
}

/// `ui.` function names matching the partial identifier
pub fn complete_ui_functions(kb: &KnowledgeBase, ui: &UiFunctionContext) -> Vec<CandidateItem> {
    let range = (!ui.word.is_empty()).then_some(ui.word_range);
    filter_list(&kb.ui_functions, &ui.word, range)
        .map(|item| item.with_kind(CandidateKind::Function))
        .collect()
}

/// Replacement range for items, only when something has been typed
fn word_range(ctx: &DocumentContext) -> Option<TextRange> {
    (!ctx.word.is_empty()).then_some(ctx.word_range)
}

/// Substring-filtered plain candidates in list order
fn filter_list<'a>(
    list: &'a [String],
    word: &'a str,
    range: Option<TextRange>,
) -> impl Iterator<Item = CandidateItem> + 'a {
    list.iter()
        .filter(move |entry| word.is_empty() || entry.contains(word))
        .enumerate()
        .map(move |(i, entry)| {
            let item = CandidateItem::new(entry.as_str()).with_priority(i as u32);
            match range {
                Some(range) => item.with_range(range),
                None => item,
            }
        })
}
