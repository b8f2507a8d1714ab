//! Line/column addressed text storage.
//!
//! [`TextBuffer`] keeps the widget text in a [`ropey::Rope`], which gives O(log N) line access
//! and editing. Every position is expressed as a zero-based `(line, column)` pair where the
//! column counts Unicode scalar values (`char`s) inside the logical line.

use crate::error::BufferError;
use ropey::Rope;
use std::cmp::Ordering;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A `(start_line, start_column)..(end_line, end_column)` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl TextRange {
    /// Create a range from two positions.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from raw line/column pairs.
    pub fn from_coords(
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self::new(
            Position::new(start_line, start_col),
            Position::new(end_line, end_col),
        )
    }

    /// Returns `true` if the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A single splice applied to a [`TextBuffer`], expressed in character offsets.
///
/// Applying `inserted_text` over `start..start + deleted_text.chars().count()` turns the
/// "before" text into the "after" text; [`Splice::inverted`] describes the way back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// Start character offset of the splice.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
}

impl Splice {
    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// The splice that undoes this one.
    pub fn inverted(&self) -> Self {
        Self {
            start: self.start,
            deleted_text: self.inserted_text.clone(),
            inserted_text: self.deleted_text.clone(),
        }
    }

    /// Returns `true` if applying the splice would not change the text.
    pub fn is_noop(&self) -> bool {
        self.deleted_text == self.inserted_text
    }
}

/// Rope-backed text buffer addressed by logical lines.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    /// Build a buffer from text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Full buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of logical lines. An empty buffer has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Character length of `line`, excluding its line break. Returns `None` past the last line.
    pub fn line_len(&self, line: usize) -> Option<usize> {
        if line >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
        Some(len)
    }

    /// Text of `line` without its line break.
    pub fn line_text(&self, line: usize) -> Option<String> {
        let len = self.line_len(line)?;
        let start = self.rope.line_to_char(line);
        Some(self.rope.slice(start..start + len).to_string())
    }

    /// The span from `0:0` through the end of the last line.
    pub fn full_range(&self) -> TextRange {
        let last = self.line_count().saturating_sub(1);
        let end_col = self.line_len(last).unwrap_or(0);
        TextRange::from_coords(0, 0, last, end_col)
    }

    /// Convert a position into a character offset.
    pub fn char_offset(&self, pos: Position) -> Result<usize, BufferError> {
        let len = self.line_len(pos.line).ok_or(BufferError::InvalidPosition {
            line: pos.line,
            column: pos.column,
        })?;
        if pos.column > len {
            return Err(BufferError::InvalidPosition {
                line: pos.line,
                column: pos.column,
            });
        }
        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    /// Convert a character offset into a position. Offsets past the end clamp to the end.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let column = offset - self.rope.line_to_char(line);
        // Offsets between `\r` and `\n` clamp to the line end.
        let column = column.min(self.line_len(line).unwrap_or(column));
        Position::new(line, column)
    }

    /// Replace `range` with `text`, returning the applied splice.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<Splice, BufferError> {
        let start = self.char_offset(range.start)?;
        let end = self.char_offset(range.end)?;
        if end < start {
            return Err(BufferError::InvalidRange { start, end });
        }
        let splice = Splice {
            start,
            deleted_text: self.rope.slice(start..end).to_string(),
            inserted_text: text.to_string(),
        };
        self.apply(&splice)?;
        Ok(splice)
    }

    /// Apply a previously recorded splice (used by undo/redo).
    pub fn apply(&mut self, splice: &Splice) -> Result<(), BufferError> {
        let end = splice.start + splice.deleted_len();
        if end > self.rope.len_chars() {
            return Err(BufferError::InvalidRange {
                start: splice.start,
                end,
            });
        }
        if self.rope.slice(splice.start..end) != splice.deleted_text.as_str() {
            return Err(BufferError::HistoryMismatch {
                offset: splice.start,
            });
        }
        self.rope.remove(splice.start..end);
        self.rope.insert(splice.start, &splice.inserted_text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_len_ignores_line_breaks() {
        let buffer = TextBuffer::new("ab\r\ncd\nef");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_len(0), Some(2));
        assert_eq!(buffer.line_len(1), Some(2));
        assert_eq!(buffer.line_len(2), Some(2));
        assert_eq!(buffer.line_len(3), None);
    }

    #[test]
    fn test_full_range_of_trailing_newline() {
        let buffer = TextBuffer::new("x=1;\n");
        assert_eq!(buffer.full_range(), TextRange::from_coords(0, 0, 1, 0));
        assert_eq!(TextBuffer::new("").full_range(), TextRange::from_coords(0, 0, 0, 0));
    }

    #[test]
    fn test_replace_and_invert() {
        let mut buffer = TextBuffer::new("hello\nworld");
        let splice = buffer
            .replace(TextRange::from_coords(0, 1, 1, 2), "EY\nWO")
            .unwrap();
        assert_eq!(buffer.text(), "hEY\nWOrld");
        assert_eq!(splice.deleted_text, "ello\nwo");

        buffer.apply(&splice.inverted()).unwrap();
        assert_eq!(buffer.text(), "hello\nworld");
    }

    #[test]
    fn test_replace_rejects_columns_past_line_end() {
        let mut buffer = TextBuffer::new("ab\ncd");
        let err = buffer
            .replace(TextRange::from_coords(0, 3, 1, 0), "")
            .unwrap_err();
        assert_eq!(err, BufferError::InvalidPosition { line: 0, column: 3 });
    }

    #[test]
    fn test_position_at_round_trips_offsets() {
        let buffer = TextBuffer::new("a👋b\ncd");
        assert_eq!(buffer.position_at(3), Position::new(0, 3));
        assert_eq!(buffer.position_at(4), Position::new(1, 0));
        assert_eq!(buffer.char_offset(Position::new(1, 1)).unwrap(), 5);
        assert_eq!(buffer.position_at(100), Position::new(1, 2));
    }
}
