//! Text buffer — rope storage behind the reference text view.
//!
//! A `Buffer` wraps a [`ropey::Rope`] and speaks absolute char offsets, the
//! coordinate system of [`TextSurface`](crate::surface::TextSurface).
//!
//! - **Offsets are char indices**, not bytes. Offset 3 of `"café"` is `'é'`.
//! - **Line endings are normalized to `\n` on load.** The detected style is
//!   kept in [`line_ending`](Buffer::line_ending) so that
//!   [`contents_with_line_endings`](Buffer::contents_with_line_endings)
//!   can hand the text back the way it came in. Every line terminator is
//!   therefore exactly one char, which keeps cursor arithmetic simple.
//! - **Edits are checked.** Out-of-range offsets yield
//!   [`SurfaceError::OutOfBounds`] instead of panicking.

use std::fmt;

use ropey::Rope;

use crate::surface::{SurfaceError, TextRange};

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of the loaded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the line ending from its first occurrence. `Lf` when there is
    /// none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => return Self::Lf,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => return Self::CrLf,
                b'\r' => return Self::Cr,
                _ => {}
            }
        }
        Self::Lf
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
            Self::Cr => f.write_str("CR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A rope-backed text buffer addressed by char offsets.
///
/// An empty buffer has one (empty) line. Text ending in `\n` has a trailing
/// empty line, the same way editors display it.
pub struct Buffer {
    rope: Rope,
    line_ending: LineEnding,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            line_ending: LineEnding::Lf,
        }
    }

    /// Create a buffer from a string, normalizing line endings to `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        let rope = if line_ending == LineEnding::Lf && !text.contains('\r') {
            Rope::from_str(text)
        } else {
            Rope::from_str(&normalize_line_endings(text, "\n"))
        };
        Self { rope, line_ending }
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// The line ending style detected on load.
    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The char at `offset`, or `None` at or past the end.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    /// Text in `range`, or `None` if the range leaves the buffer.
    #[must_use]
    pub fn slice(&self, range: TextRange) -> Option<String> {
        (range.end <= self.rope.len_chars())
            .then(|| self.rope.slice(range.start..range.end).to_string())
    }

    /// All text with `\n` line endings.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// All text with the line endings it was loaded with.
    #[must_use]
    pub fn contents_with_line_endings(&self) -> String {
        let text = self.rope.to_string();
        match self.line_ending {
            LineEnding::Lf => text,
            other => text.replace('\n', other.as_str()),
        }
    }

    // -- Lines --------------------------------------------------------------

    /// The line containing `offset`. Offsets past the end map to the last
    /// line.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Offset of the first char of `line`, clamped to the last line.
    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.line_count() - 1))
    }

    /// Number of chars in `line` excluding its `\n`.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> usize {
        let line = line.min(self.line_count() - 1);
        let slice = self.rope.line(line);
        let total = slice.len_chars();
        if total > 0 && slice.char(total - 1) == '\n' {
            total - 1
        } else {
            total
        }
    }

    /// Offset just before the terminator of `line`.
    #[must_use]
    pub fn line_end(&self, line: usize) -> usize {
        self.line_start(line) + self.line_content_len(line)
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at `offset`. Line endings in `text` are normalized.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::OutOfBounds`] if `offset > len_chars()`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), SurfaceError> {
        self.check(offset)?;
        if text.contains('\r') {
            self.rope.insert(offset, &normalize_line_endings(text, "\n"));
        } else {
            self.rope.insert(offset, text);
        }
        Ok(())
    }

    /// Delete `range`, returning the removed text.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::OutOfBounds`] if the range ends past the buffer.
    pub fn delete(&mut self, range: TextRange) -> Result<String, SurfaceError> {
        self.check(range.end)?;
        let removed = self.rope.slice(range.start..range.end).to_string();
        self.rope.remove(range.start..range.end);
        Ok(removed)
    }

    fn check(&self, offset: usize) -> Result<(), SurfaceError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(SurfaceError::OutOfBounds { offset, len });
        }
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Normalize `\r\n`, `\r` and `\n` in any mix to `target`.
fn normalize_line_endings(text: &str, target: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                result.push_str(target);
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' => result.push_str(target),
            _ => result.push(ch),
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- LineEnding ---------------------------------------------------------

    #[test]
    fn detect_line_endings() {
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("none"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
    }

    #[test]
    fn crlf_normalized_and_restored() {
        let buf = Buffer::from_text("one\r\ntwo\r\n");
        assert_eq!(buf.contents(), "one\ntwo\n");
        assert_eq!(buf.line_ending(), LineEnding::CrLf);
        assert_eq!(buf.contents_with_line_endings(), "one\r\ntwo\r\n");
        assert_eq!(buf.len_chars(), 8);
    }

    // -- Lines --------------------------------------------------------------

    #[test]
    fn empty_buffer_has_one_line() {
        let buf = Buffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_start(0), 0);
        assert_eq!(buf.line_end(0), 0);
    }

    #[test]
    fn line_geometry() {
        let buf = Buffer::from_text("hello\nworld\n");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line_of(0), 0);
        assert_eq!(buf.line_of(5), 0); // the '\n' belongs to line 0
        assert_eq!(buf.line_of(6), 1);
        assert_eq!(buf.line_start(1), 6);
        assert_eq!(buf.line_end(1), 11);
        assert_eq!(buf.line_start(2), 12);
        assert_eq!(buf.line_end(2), 12);
    }

    #[test]
    fn line_queries_clamp() {
        let buf = Buffer::from_text("ab\ncd");
        assert_eq!(buf.line_of(99), 1);
        assert_eq!(buf.line_start(99), 3);
        assert_eq!(buf.line_end(99), 5);
    }

    #[test]
    fn char_at_and_slice() {
        let buf = Buffer::from_text("café\n");
        assert_eq!(buf.char_at(3), Some('é'));
        assert_eq!(buf.char_at(5), None);
        assert_eq!(buf.slice(TextRange { start: 1, end: 4 }).as_deref(), Some("afé"));
        assert_eq!(buf.slice(TextRange { start: 1, end: 9 }), None);
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn insert_and_delete() {
        let mut buf = Buffer::from_text("hello world");
        buf.insert(5, ",").unwrap();
        assert_eq!(buf.contents(), "hello, world");
        let removed = buf.delete(TextRange { start: 0, end: 7 }).unwrap();
        assert_eq!(removed, "hello, ");
        assert_eq!(buf.contents(), "world");
    }

    #[test]
    fn insert_normalizes_line_endings() {
        let mut buf = Buffer::new();
        buf.insert(0, "a\r\nb\rc").unwrap();
        assert_eq!(buf.contents(), "a\nb\nc");
    }

    #[test]
    fn out_of_bounds_edits_fail() {
        let mut buf = Buffer::from_text("abc");
        assert_eq!(
            buf.insert(4, "x"),
            Err(SurfaceError::OutOfBounds { offset: 4, len: 3 })
        );
        assert_eq!(
            buf.delete(TextRange { start: 1, end: 5 }),
            Err(SurfaceError::OutOfBounds { offset: 5, len: 3 })
        );
        assert_eq!(buf.contents(), "abc");
    }
}
