//! Hover documentation for attributes and icon names

use crate::completions::docs::attribute_documentation;
use crate::kb::KnowledgeBase;
use crate::text::TextRange;
use crate::types::{ContextKind, DocumentContext};
use serde::Serialize;

const ICON_PROPS: [&str; 2] = ["icon", "icon-right"];

/// Markdown hover body and the range it describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverInfo {
    pub contents: String,
    pub range: TextRange,
}

/// Hover for the word under the cursor.
///
/// Attribute hovers need the resolved component class; internal attributes
/// and unknown names produce nothing.
pub fn hover(kb: &KnowledgeBase, ctx: &DocumentContext, class_name: Option<&str>) -> Option<HoverInfo> {
    if ctx.word.is_empty() {
        return None;
    }

    if ctx.kind == ContextKind::Icons {
        return icon_hover(kb, &ctx.word, ctx.word_range);
    }

    let kind = ctx.kind.attribute_kind()?;
    let (name, value) = match ctx.word.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (ctx.word.as_str(), None),
    };

    if let Some(value) = value {
        let value_start = ctx.word_range.start + name.len() + 1;
        if ctx.offset >= value_start && ICON_PROPS.contains(&name) {
            return icon_hover(kb, value, TextRange::new(value_start, ctx.word_range.end));
        }
    }

    let attr = kb.attribute(class_name?, kind, name)?;
    if attr.internal {
        return None;
    }

    let mut contents = format!("**{}**", name);
    if let Some(signature) = attr.signature() {
        contents.push_str(&format!("\n\n`{}`", signature));
    }
    let body = attribute_documentation(attr);
    if !body.is_empty() {
        contents.push_str("\n\n");
        contents.push_str(&body);
    }

    Some(HoverInfo {
        contents,
        range: TextRange::new(ctx.word_range.start, ctx.word_range.start + name.len()),
    })
}

fn icon_hover(kb: &KnowledgeBase, name: &str, range: TextRange) -> Option<HoverInfo> {
    kb.is_icon(name).then(|| HoverInfo {
        contents: format!("**{}**\n\nMaterial icon `{}`", name, name),
        range,
    })
}
