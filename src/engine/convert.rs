//! Conversions from engine types to LSP types

use crate::hover::HoverInfo;
use crate::text::LineIndex;
use crate::types::{CandidateItem, CandidateKind, Insertion};
use tower_lsp::lsp_types::{
    CompletionItem as LspCompletionItem, CompletionItemKind as LspCompletionItemKind,
    CompletionItemLabelDetails, CompletionTextEdit, Documentation, Hover, HoverContents,
    InsertTextFormat, MarkupContent, MarkupKind, TextEdit,
};

/// Convert a candidate to an LSP completion item.
///
/// Candidates with a range become text edits over that range; the rest
/// leave the replaced word to the client.
pub fn to_lsp_completion(item: &CandidateItem, index: &LineIndex) -> LspCompletionItem {
    let (new_text, format) = match &item.insert {
        Some(Insertion::Snippet(snippet)) => (snippet.clone(), InsertTextFormat::SNIPPET),
        Some(Insertion::Text(text)) => (text.clone(), InsertTextFormat::PLAIN_TEXT),
        None => (item.label.clone(), InsertTextFormat::PLAIN_TEXT),
    };

    let text_edit = item
        .range
        .map(|range| CompletionTextEdit::Edit(TextEdit::new(index.range(range), new_text.clone())));
    let insert_text = match (&text_edit, &item.insert) {
        (None, Some(_)) => Some(new_text),
        _ => None,
    };

    LspCompletionItem {
        label: item.label.clone(),
        label_details: item.description.as_ref().map(|description| CompletionItemLabelDetails {
            detail: None,
            description: Some(description.clone()),
        }),
        kind: item.kind.map(to_lsp_completion_kind),
        detail: item.description.clone(),
        documentation: item.documentation.as_ref().map(|doc| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: doc.clone(),
            })
        }),
        insert_text,
        insert_text_format: Some(format),
        sort_text: Some(format!("{:05}", item.sort_priority)),
        text_edit,
        ..Default::default()
    }
}

fn to_lsp_completion_kind(kind: CandidateKind) -> LspCompletionItemKind {
    match kind {
        CandidateKind::Function => LspCompletionItemKind::FUNCTION,
        CandidateKind::Property => LspCompletionItemKind::PROPERTY,
        CandidateKind::Value => LspCompletionItemKind::VALUE,
        CandidateKind::Event => LspCompletionItemKind::EVENT,
        CandidateKind::Method => LspCompletionItemKind::METHOD,
        CandidateKind::Field => LspCompletionItemKind::FIELD,
    }
}

pub fn to_lsp_hover(info: &HoverInfo, index: &LineIndex) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: info.contents.clone(),
        }),
        range: Some(index.range(info.range)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextRange;
    use tower_lsp::lsp_types::{Position, Range};

    #[test]
    fn test_ranged_snippet() {
        let text = "b.props('si')";
        let index = LineIndex::new(text);
        let item = CandidateItem::new("size")
            .with_kind(CandidateKind::Property)
            .with_description("String")
            .with_snippet("size=${1|sm,md|}")
            .with_range(TextRange::new(9, 11))
            .with_priority(3);

        let lsp = to_lsp_completion(&item, &index);
        assert_eq!(lsp.kind, Some(LspCompletionItemKind::PROPERTY));
        assert_eq!(lsp.insert_text_format, Some(InsertTextFormat::SNIPPET));
        assert_eq!(lsp.sort_text.as_deref(), Some("00003"));
        assert!(lsp.insert_text.is_none());
        assert_eq!(
            lsp.label_details.and_then(|d| d.description).as_deref(),
            Some("String")
        );
        let Some(CompletionTextEdit::Edit(edit)) = lsp.text_edit else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.range, Range::new(Position::new(0, 9), Position::new(0, 11)));
        assert_eq!(edit.new_text, "size=${1|sm,md|}");
    }

    #[test]
    fn test_plain_item_without_range() {
        let index = LineIndex::new("");
        let lsp = to_lsp_completion(&CandidateItem::new("home"), &index);
        assert!(lsp.text_edit.is_none());
        assert!(lsp.insert_text.is_none());
        assert!(lsp.kind.is_none());
        assert_eq!(lsp.insert_text_format, Some(InsertTextFormat::PLAIN_TEXT));
    }

    #[test]
    fn test_insert_text_without_range() {
        let index = LineIndex::new("");
        let item = CandidateItem::new("margin").with_insert_text("margin: ");
        assert_eq!(to_lsp_completion(&item, &index).insert_text.as_deref(), Some("margin: "));
    }

    #[test]
    fn test_hover() {
        let text = "line\nb.props('flat')";
        let index = LineIndex::new(text);
        let hover = to_lsp_hover(
            &HoverInfo {
                contents: "**flat**".to_string(),
                range: TextRange::new(14, 18),
            },
            &index,
        );
        assert_eq!(hover.range, Some(Range::new(Position::new(1, 9), Position::new(1, 13))));
    }
}
