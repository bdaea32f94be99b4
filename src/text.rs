//! Offset and position conversions
//!
//! The engine works on byte offsets into the document text. LSP positions
//! count UTF-16 code units within a line, so every request and response goes
//! through a [`LineIndex`].

use serde::Serialize;
use tower_lsp::lsp_types::{Position, Range};

/// Byte range in a document (end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty range at an offset
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Text covered by the range, or "" if it does not fit the text
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

/// Line start table for a document
#[derive(Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    /// Byte offset for an LSP position, clamped to the line end
    pub fn offset_at(&self, position: Position) -> usize {
        let line = position.line as usize;
        let Some(&start) = self.line_starts.get(line) else {
            return self.text.len();
        };
        let end = self.line_end(line);

        let mut units = 0u32;
        for (i, ch) in self.text[start..end].char_indices() {
            if units >= position.character {
                return start + i;
            }
            units += ch.len_utf16() as u32;
        }
        end
    }

    /// LSP position for a byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = floor_char_boundary(self.text, offset);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts[line];
        let character = self.text[start..offset].encode_utf16().count() as u32;
        Position::new(line as u32, character)
    }

    pub fn range(&self, range: TextRange) -> Range {
        Range::new(self.position_at(range.start), self.position_at(range.end))
    }

    fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(&next) => next - 1,
            None => self.text.len(),
        }
    }
}

/// Byte range of the line containing `offset`, without the line break
pub fn line_bounds(text: &str, offset: usize) -> TextRange {
    let offset = floor_char_boundary(text, offset);
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    TextRange::new(start, end)
}

/// Largest char boundary not after `offset`
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Move `offset` by `delta` characters, stopping at either end of the text
pub fn shift_chars(text: &str, offset: usize, delta: isize) -> usize {
    let offset = floor_char_boundary(text, offset);
    let steps = delta.unsigned_abs();
    if delta >= 0 {
        text[offset..]
            .char_indices()
            .map(|(i, _)| offset + i)
            .chain(std::iter::once(text.len()))
            .nth(steps)
            .unwrap_or(text.len())
    } else if steps == 0 {
        offset
    } else {
        text[..offset]
            .char_indices()
            .rev()
            .nth(steps - 1)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
