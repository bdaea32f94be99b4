//! Core types shared by context capture, completion and hover

use crate::kb::AttributeKind;
use crate::text::TextRange;
use serde::Serialize;
use std::fmt;

/// What kind of value is being typed at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Classes,
    Props,
    Style,
    Events,
    Methods,
    Slots,
    Icons,
}

impl ContextKind {
    /// Map a recognized call-method name to its context kind
    pub fn from_method(method: &str) -> Option<Self> {
        Some(match method {
            "props" | "default_props" => ContextKind::Props,
            "classes" | "default_classes" => ContextKind::Classes,
            "style" | "default_style" | "default_styles" => ContextKind::Style,
            "on" => ContextKind::Events,
            "run_method" => ContextKind::Methods,
            "add_slot" => ContextKind::Slots,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::Classes => "classes",
            ContextKind::Props => "props",
            ContextKind::Style => "style",
            ContextKind::Events => "events",
            ContextKind::Methods => "methods",
            ContextKind::Slots => "slots",
            ContextKind::Icons => "icons",
        }
    }

    /// Component attribute collection backing this kind, if any
    pub fn attribute_kind(&self) -> Option<AttributeKind> {
        match self {
            ContextKind::Props => Some(AttributeKind::Props),
            ContextKind::Slots => Some(AttributeKind::Slots),
            ContextKind::Events => Some(AttributeKind::Events),
            ContextKind::Methods => Some(AttributeKind::Methods),
            _ => None,
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request classification of the cursor position.
///
/// Built fresh for every request and dropped once the response is produced.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentContext {
    /// Cursor byte offset
    pub offset: usize,
    pub kind: ContextKind,
    /// Recognized call-method name (`None` for icon attributes)
    pub method: Option<String>,
    /// Text of the match that produced the classification
    pub matched: String,
    /// Start of that match; the attribute accessor begins one char later
    pub match_start: usize,
    /// Partially typed word (quote-only words normalized to "")
    pub word: String,
    pub word_range: TextRange,
    /// Contents of the enclosing string literal
    pub surround: Option<String>,
    pub surround_range: Option<TextRange>,
}

/// Partial identifier typed after `ui.`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiFunctionContext {
    pub word: String,
    pub word_range: TextRange,
}

/// Visual category of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandidateKind {
    Function,
    Property,
    Value,
    Event,
    Method,
    Field,
}

/// Text inserted when a candidate is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Insertion {
    Text(String),
    /// Snippet syntax with tabstops, placeholders and choices
    Snippet(String),
}

/// A completion candidate
#[derive(Debug, Clone, Serialize)]
pub struct CandidateItem {
    pub label: String,
    /// Short type or signature shown next to the label
    pub description: Option<String>,
    pub kind: Option<CandidateKind>,
    /// Range replaced on acceptance; `None` lets the editor pick its own word
    pub range: Option<TextRange>,
    pub insert: Option<Insertion>,
    /// Markdown documentation
    pub documentation: Option<String>,
    pub sort_priority: u32,
}

impl CandidateItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            kind: None,
            range: None,
            insert: None,
            documentation: None,
            sort_priority: 0,
        }
    }

    pub fn with_kind(mut self, kind: CandidateKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert = Some(Insertion::Text(text.into()));
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.insert = Some(Insertion::Snippet(snippet.into()));
        self
    }

    pub fn with_documentation(mut self, doc: impl Into<String>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    /// Text the editor inserts for this candidate
    pub fn insert_text(&self) -> &str {
        match &self.insert {
            Some(Insertion::Text(text)) | Some(Insertion::Snippet(text)) => text,
            None => &self.label,
        }
    }
}
