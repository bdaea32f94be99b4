//! Type-name extraction from hover bodies.
//!
//! Hover text is free-form, so each stage carries an ordered pattern list,
//! most specific first; the first capture wins.

use regex::Regex;
use std::sync::LazyLock;
use tower_lsp::lsp_types::{HoverContents, MarkedString};

/// `classes`/`props`/`style` accessor: `(property) props: Props[Self@Button]`
static ACCESSOR: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\(property\)\s+(?:classes|props|style):\s+(?:Classes|Props|Style)\[(?:Self@)?(\w+)\]",
        r"(?:classes|props|style):\s+(?:Classes|Props|Style)\[(?:Self@)?(\w+)\]",
        r"(?:classes|props|style):\s+\w*\[(?:Self@)?(\w+)\]",
    ])
});

/// `on` method signature: `(method) def on(...) -> Button`
static EVENT_METHOD: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\(method\)\s+def on\([^)]*\)\s*->\s*(\w+)",
        r"def on\([^)]*\)\s*->\s*(\w+)",
    ])
});

/// Receiver variable: `(variable) button: Button`
static VARIABLE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\(variable\)\s+\w*:\s+(\w+)",
        r"\(variable\)\s+\w*:\s+\w+\[(\w+)\]",
        r":\s+(\w+)$",
    ])
});

/// Declaring class or constructor call: `class Button(`, `-> Button`
static DECLARATION: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"class\s+(\w+)\(", r"->\s+(\w+)"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// First capture of the first matching pattern
pub fn first_match(body: &str, patterns: &[Regex]) -> Option<String> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(body)?.get(1))
        .map(|m| m.as_str().to_string())
}

/// Class owning a `classes`/`props`/`style` accessor
pub fn accessor_owner(body: &str) -> Option<String> {
    first_match(body, &ACCESSOR)
}

/// Class returned by an `on(...)` signature
pub fn event_owner(body: &str) -> Option<String> {
    first_match(body, &EVENT_METHOD)
}

pub fn variable_type(body: &str) -> Option<String> {
    first_match(body, &VARIABLE)
}

pub fn declared_class(body: &str) -> Option<String> {
    first_match(body, &DECLARATION)
}

/// Flatten hover contents to plain text. Empty bodies count as no hover.
pub fn hover_text(contents: &HoverContents) -> Option<String> {
    fn marked(s: &MarkedString) -> &str {
        match s {
            MarkedString::String(text) => text,
            MarkedString::LanguageString(block) => &block.value,
        }
    }

    let text = match contents {
        HoverContents::Scalar(s) => marked(s).to_string(),
        HoverContents::Array(parts) => parts.iter().map(marked).collect::<Vec<_>>().join("\n"),
        HoverContents::Markup(markup) => markup.value.clone(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
