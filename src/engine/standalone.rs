//! Synchronous engine without a type-analysis service.
//!
//! Used by the command line tools. Class resolution is unavailable here,
//! so attribute completions always come from the generic lists.

use crate::completions::{assemble, complete_ui_functions};
use crate::context::{capture_ui_function, classify_with_lookback, DEFAULT_LOOKBACK};
use crate::hover::{hover, HoverInfo};
use crate::kb::KnowledgeBase;
use crate::text::LineIndex;
use crate::types::{CandidateItem, DocumentContext};
use std::sync::Arc;
use tower_lsp::lsp_types::Position;

pub struct Engine {
    kb: Arc<KnowledgeBase>,
    lookback: usize,
}

impl Engine {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            kb,
            lookback: DEFAULT_LOOKBACK,
        }
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Byte offset for a 1-based line and column
    pub fn offset_at(text: &str, line: u32, column: u32) -> usize {
        LineIndex::new(text).offset_at(Position::new(
            line.saturating_sub(1),
            column.saturating_sub(1),
        ))
    }

    pub fn context(&self, text: &str, offset: usize) -> Option<DocumentContext> {
        classify_with_lookback(text, offset, self.lookback)
    }

    /// Candidates at `offset`; empty when the cursor is in no known context
    pub fn complete(&self, text: &str, offset: usize) -> Vec<CandidateItem> {
        if let Some(ui) = capture_ui_function(text, offset) {
            return complete_ui_functions(&self.kb, &ui);
        }
        match self.context(text, offset) {
            Some(ctx) => assemble(&self.kb, &ctx, None),
            None => Vec::new(),
        }
    }

    /// Hover at `offset`. Attribute hovers need a class, so only icons answer.
    pub fn hover(&self, text: &str, offset: usize) -> Option<HoverInfo> {
        hover(&self.kb, &self.context(text, offset)?, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let mut kb = KnowledgeBase::default();
        kb.generic.props = vec!["dense".to_string(), "flat".to_string()];
        kb.ui_functions = vec!["button".to_string(), "badge".to_string()];
        kb.icons = vec!["home".to_string()];
        Engine::new(Arc::new(kb))
    }

    #[test]
    fn test_offset_at_is_one_based() {
        let text = "x = 1\nui.button()";
        assert_eq!(Engine::offset_at(text, 2, 4), 9);
        assert_eq!(Engine::offset_at(text, 1, 1), 0);
    }

    #[test]
    fn test_complete_generic_props() {
        let text = "ui.button('Go').props('fl')";
        let items = engine().complete(text, text.len() - 2);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "flat");
    }

    #[test]
    fn test_complete_ui_functions_first() {
        let text = "ui.b";
        let labels: Vec<_> = engine()
            .complete(text, text.len())
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert_eq!(labels, vec!["button", "badge"]);
    }

    #[test]
    fn test_nothing_outside_context() {
        let text = "print('hi')";
        assert!(engine().complete(text, 8).is_empty());
        assert!(engine().context(text, 8).is_none());
    }

    #[test]
    fn test_icon_hover() {
        let text = "ui.icon('x', icon='home')";
        assert!(engine().hover(text, 20).is_some());
    }
}
