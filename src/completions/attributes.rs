//! Props, slots, events and methods completions

use super::docs::attribute_documentation;
use super::snippet::Snippet;
use super::{filter_list, word_range};
use crate::kb::{Attribute, AttributeKind, Component, KnowledgeBase};
use crate::text::TextRange;
use crate::types::{CandidateItem, CandidateKind, DocumentContext};

/// Props whose value is an icon name
const ICON_PROPS: [&str; 2] = ["icon", "icon-right"];

pub fn candidate_kind(kind: AttributeKind) -> CandidateKind {
    match kind {
        AttributeKind::Props => CandidateKind::Property,
        AttributeKind::Slots => CandidateKind::Field,
        AttributeKind::Events => CandidateKind::Event,
        AttributeKind::Methods => CandidateKind::Method,
    }
}

/// Candidates for one attribute collection
pub fn complete_attributes(
    kb: &KnowledgeBase,
    ctx: &DocumentContext,
    kind: AttributeKind,
    class_name: Option<&str>,
) -> Vec<CandidateItem> {
    let component = class_name.and_then(|name| kb.component(name));

    if let Some((key, _)) = ctx.word.split_once('=') {
        return complete_values(kb, ctx, kind, component, key);
    }

    match component {
        Some(component) => component
            .attributes(kind)
            .iter()
            .filter(|(_, attr)| !attr.internal)
            .filter(|(name, _)| ctx.word.is_empty() || name.contains(ctx.word.as_str()))
            .enumerate()
            .map(|(i, (name, attr))| build_item(name, attr, kind, ctx).with_priority(i as u32))
            .collect(),
        None => filter_list(kb.generic.get(kind), &ctx.word, word_range(ctx))
            .map(|item| item.with_kind(candidate_kind(kind)))
            .collect(),
    }
}

/// Values for a `key=value` token
fn complete_values(
    kb: &KnowledgeBase,
    ctx: &DocumentContext,
    kind: AttributeKind,
    component: Option<&Component>,
    key: &str,
) -> Vec<CandidateItem> {
    let value_start = ctx.word_range.start + key.len() + 1;
    let range = (value_start < ctx.word_range.end)
        .then(|| TextRange::new(value_start, ctx.word_range.end));

    let values: Vec<String> = if ICON_PROPS.contains(&key) {
        kb.icons.clone()
    } else {
        match component.and_then(|c| c.attributes(kind).get(key)) {
            Some(attr) => attr.literal_values(),
            None => return Vec::new(),
        }
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let item = CandidateItem::new(value)
                .with_kind(CandidateKind::Value)
                .with_priority(i as u32);
            match range {
                Some(range) => item.with_range(range),
                None => item,
            }
        })
        .collect()
}

/// Full candidate for a documented component attribute
pub fn build_item(
    name: &str,
    attr: &Attribute,
    kind: AttributeKind,
    ctx: &DocumentContext,
) -> CandidateItem {
    let mut item = CandidateItem::new(name)
        .with_kind(candidate_kind(kind))
        .with_documentation(attribute_documentation(attr));

    if let Some(signature) = attr.signature() {
        item = item.with_description(signature);
    }

    match kind {
        AttributeKind::Slots => {
            if let Some((head, tail)) = name.split_once('[') {
                let snippet = Snippet::new().text(head).placeholder(&format!("[{}", tail));
                item = item.with_snippet(snippet.build());
            }
        }
        AttributeKind::Props if !attr.value_type.as_ref().is_some_and(|t| t.is_boolean()) => {
            let snippet = Snippet::new()
                .text(&format!("{}=", name))
                .choice(&attr.literal_values());
            item = item.with_snippet(snippet.build());
        }
        _ => {}
    }

    if let Some(range) = word_range(ctx) {
        item = item.with_range(range);
    }
    item
}
