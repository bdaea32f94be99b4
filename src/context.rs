//! Cursor context capture for Python sources.
//!
//! The cursor is classified by matching the text just before it against the
//! builder calls the engine understands. Nothing is parsed: a bounded
//! lookback window is scanned on every request, so the cost stays flat on
//! large files.

use crate::text::{floor_char_boundary, line_bounds, shift_chars, TextRange};
use crate::types::{ContextKind, DocumentContext, UiFunctionContext};
use regex::Regex;
use std::sync::LazyLock;

/// Characters scanned backwards from the cursor
pub const DEFAULT_LOOKBACK: usize = 4096;

/// Innermost recognized call whose argument list is still open at the end of
/// the prefix. The greedy `.*` pushes the match onto the last such call.
static CALL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^.*(\.\s*(props|classes|style|on|run_method|add_slot|default_props|default_classes|default_style|default_styles)\s*\(\s*[^)]+)$",
    )
    .unwrap()
});

/// Icon keyword argument with an open string literal
static ICON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(icon|icon-right)=['"][^'"\n]*$"#).unwrap());

/// Replaceable word: dotted, slashed, hyphenated and `key=value` tokens, or
/// an empty quote pair
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.\w/=-]+|""|''"#).unwrap());

static UI_FUNCTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bui\.(\w*)$").unwrap());

/// Classify the cursor with the default lookback window
pub fn classify(text: &str, offset: usize) -> Option<DocumentContext> {
    classify_with_lookback(text, offset, DEFAULT_LOOKBACK)
}

/// Classify the cursor, scanning at most `lookback` characters before it.
///
/// Returns `None` when the cursor is not inside a recognized call or icon
/// attribute; no completions should be offered then.
pub fn classify_with_lookback(
    text: &str,
    offset: usize,
    lookback: usize,
) -> Option<DocumentContext> {
    let offset = floor_char_boundary(text, offset);
    let start = shift_chars(text, offset, -(lookback as isize));
    let prefix = &text[start..offset];

    let (kind, method, matched) = if let Some(caps) = CALL_PATTERN.captures(prefix) {
        let method = caps.get(2)?.as_str();
        (ContextKind::from_method(method)?, Some(method.to_string()), caps.get(1)?)
    } else {
        (ContextKind::Icons, None, ICON_PATTERN.find(prefix)?)
    };

    let line = line_bounds(text, offset);
    let (word, word_range) = word_at(text, line, offset);
    let surround_range = surround_at(text, line, offset);

    Some(DocumentContext {
        offset,
        kind,
        method,
        matched: matched.as_str().to_string(),
        match_start: start + matched.start(),
        word,
        word_range,
        surround: surround_range.map(|r| r.slice(text).to_string()),
        surround_range,
    })
}

/// Detect `ui.<partial>` directly before the cursor
pub fn capture_ui_function(text: &str, offset: usize) -> Option<UiFunctionContext> {
    let offset = floor_char_boundary(text, offset);
    let line = line_bounds(text, offset);
    let caps = UI_FUNCTION_PATTERN.captures(&text[line.start..offset])?;
    let word = caps.get(1)?;

    Some(UiFunctionContext {
        word: word.as_str().to_string(),
        word_range: TextRange::new(line.start + word.start(), offset),
    })
}

/// Word touching the cursor on its line, or an empty range at the cursor
fn word_at(text: &str, line: TextRange, offset: usize) -> (String, TextRange) {
    let column = offset - line.start;
    for m in WORD_PATTERN.find_iter(line.slice(text)) {
        if m.start() > column {
            break;
        }
        if column <= m.end() {
            let word = match m.as_str() {
                "\"\"" | "''" => String::new(),
                other => other.to_string(),
            };
            return (word, TextRange::new(line.start + m.start(), line.start + m.end()));
        }
    }
    (String::new(), TextRange::empty(offset))
}

/// Contents of the string literal enclosing the cursor on its line.
///
/// A backslash escapes the next character, so `\'` does not end a
/// single-quoted literal. Unterminated literals yield `None`.
fn surround_at(text: &str, line: TextRange, offset: usize) -> Option<TextRange> {
    let column = offset - line.start;
    let mut open: Option<(char, usize)> = None;
    let mut chars = line.slice(text).char_indices();

    while let Some((i, ch)) = chars.next() {
        match open {
            None => {
                if ch == '\'' || ch == '"' {
                    if i >= column {
                        return None;
                    }
                    open = Some((ch, i + 1));
                }
            }
            Some((quote, content_start)) => {
                if ch == '\\' {
                    chars.next();
                } else if ch == quote {
                    if content_start <= column && column <= i {
                        return Some(TextRange::new(line.start + content_start, line.start + i));
                    }
                    open = None;
                }
            }
        }
    }
    None
}
