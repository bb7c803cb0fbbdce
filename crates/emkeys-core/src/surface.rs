//! Text surface — the editable cursor the command layer drives.
//!
//! The dispatcher never owns text. It drives a [`TextSurface`]: an editable
//! buffer with exactly one cursor, addressed by absolute char offsets. A
//! surface has a *position* (the live cursor, "point") and an *anchor*;
//! when the two differ, the span between them is the native selection.
//!
//! Every cursor-moving operation takes a [`MoveMode`]:
//!
//! - [`MoveMode::Move`] drags the anchor along (plain repositioning)
//! - [`MoveMode::Extend`] leaves the anchor in place (selection grows or
//!   shrinks with the cursor)
//!
//! Mutations happen inside edit blocks. [`EditBlock`] opens one on creation
//! and closes it on drop, so a command that bails out early with `?` still
//! leaves the surface's undo grouping balanced.

use std::ops::{Deref, DerefMut};

use thiserror::Error;

// ---------------------------------------------------------------------------
// TextRange
// ---------------------------------------------------------------------------

/// A half-open span of char offsets, `start..end`, with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Build a range from two offsets in either order.
    #[must_use]
    pub const fn ordered(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Whether a cursor move drags the anchor or extends the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveMode {
    /// Anchor follows the cursor. No selection afterwards.
    #[default]
    Move,
    /// Anchor stays put. The selection spans anchor..cursor.
    Extend,
}

/// A cursor motion understood by every surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOp {
    /// One char back, wrapping to the end of the previous line.
    Left,
    /// One char forward, wrapping to the start of the next line.
    Right,
    /// One line up, keeping the remembered column where possible.
    Up,
    /// One line down, keeping the remembered column where possible.
    Down,
    StartOfLine,
    /// Before the line terminator.
    EndOfLine,
    /// Start of the next word (or end of text).
    NextWord,
    /// Start of the previous word (or start of text).
    PreviousWord,
    StartOfDocument,
    EndOfDocument,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a surface refused an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("the text is read-only")]
    ReadOnly,
    #[error("offset {offset} is outside the text (length {len})")]
    OutOfBounds { offset: usize, len: usize },
}

// ---------------------------------------------------------------------------
// TextSurface
// ---------------------------------------------------------------------------

/// An editable single-cursor text surface.
///
/// Offsets count Unicode scalar values. Lines are 0-indexed and end before
/// their terminator; [`line_end`](Self::line_end) of the last line is the
/// end of the text.
pub trait TextSurface {
    // -- Cursor -------------------------------------------------------------

    /// The live cursor offset (point).
    fn position(&self) -> usize;

    /// The selection anchor. Equal to [`position`](Self::position) when
    /// nothing is selected.
    fn anchor(&self) -> usize;

    /// True when anchor and position differ.
    fn has_selection(&self) -> bool {
        self.anchor() != self.position()
    }

    /// The ordered selection span (empty when nothing is selected).
    fn selection(&self) -> TextRange {
        TextRange::ordered(self.anchor(), self.position())
    }

    /// Text between anchor and position.
    fn selected_text(&self) -> String;

    /// Put the cursor at `offset` (clamped to the text).
    fn set_position(&mut self, offset: usize, mode: MoveMode);

    /// Apply `op` up to `n` times. Returns `true` if every step moved.
    fn move_position(&mut self, op: MoveOp, mode: MoveMode, n: usize) -> bool;

    /// Collapse the anchor onto the position.
    fn clear_selection(&mut self);

    // -- Editing ------------------------------------------------------------

    /// Delete the selection. A no-op when nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the edit.
    fn remove_selected_text(&mut self) -> Result<(), SurfaceError>;

    /// Insert `text` at the cursor, replacing the selection if there is one.
    /// The cursor ends up after the inserted text.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the edit.
    fn insert_text(&mut self, text: &str) -> Result<(), SurfaceError>;

    /// Open an atomic edit transaction. Calls nest.
    fn begin_edit_block(&mut self);

    /// Close the transaction opened by the matching
    /// [`begin_edit_block`](Self::begin_edit_block).
    fn end_edit_block(&mut self);

    // -- Text queries -------------------------------------------------------

    /// Total length in chars.
    fn len_chars(&self) -> usize;

    /// The char at `offset`, or `None` at or past the end.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// The line containing `offset`.
    fn line_of(&self, offset: usize) -> usize;

    /// Offset of the first char of `line`.
    fn line_start(&self, line: usize) -> usize;

    /// Offset just before the terminator of `line`.
    fn line_end(&self, line: usize) -> usize;

    // -- Viewport -----------------------------------------------------------

    /// Number of text lines visible at once.
    fn lines_on_screen(&self) -> usize;

    /// Screen row (0-indexed from the top of the viewport) of the cursor line.
    fn cursor_line_on_screen(&self) -> usize;

    /// Scroll so that `line` is the first visible line.
    fn scroll_to_line(&mut self, line: usize);
}

// ---------------------------------------------------------------------------
// EditBlock
// ---------------------------------------------------------------------------

/// Scoped edit transaction.
///
/// Derefs to the surface, so edits go through the guard. Dropping the guard
/// closes the block on every exit path, including `?` returns and unwinding.
pub struct EditBlock<'a, S: TextSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: TextSurface + ?Sized> EditBlock<'a, S> {
    /// Open an edit block on `surface`.
    pub fn begin(surface: &'a mut S) -> Self {
        surface.begin_edit_block();
        Self { surface }
    }
}

impl<S: TextSurface + ?Sized> Deref for EditBlock<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: TextSurface + ?Sized> DerefMut for EditBlock<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: TextSurface + ?Sized> Drop for EditBlock<'_, S> {
    fn drop(&mut self) {
        self.surface.end_edit_block();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_view::TextView;

    #[test]
    fn range_ordered_swaps() {
        assert_eq!(TextRange::ordered(7, 2), TextRange { start: 2, end: 7 });
        assert_eq!(TextRange::ordered(2, 7).len(), 5);
        assert!(TextRange::ordered(4, 4).is_empty());
    }

    #[test]
    fn edit_block_closes_on_drop() {
        let mut view = TextView::from_text("abc");
        {
            let mut block = EditBlock::begin(&mut view);
            block.insert_text("x").unwrap();
            assert!(block.edit_log().is_open());
        }
        assert!(!view.edit_log().is_open());
        assert_eq!(view.edit_log().transactions().len(), 1);
    }

    #[test]
    fn edit_block_closes_on_early_return() {
        fn failing(surface: &mut dyn TextSurface) -> Result<(), SurfaceError> {
            let mut block = EditBlock::begin(surface);
            block.insert_text("ok")?;
            block.set_position(0, MoveMode::Extend);
            Err(SurfaceError::ReadOnly)
        }

        let mut view = TextView::from_text("abc");
        assert_eq!(failing(&mut view), Err(SurfaceError::ReadOnly));
        assert!(!view.edit_log().is_open());
        assert_eq!(view.edit_log().depth(), 0);
    }

    #[test]
    fn default_selection_helpers() {
        let mut view = TextView::from_text("hello");
        assert!(!view.has_selection());
        view.set_position(1, MoveMode::Move);
        view.set_position(4, MoveMode::Extend);
        assert!(view.has_selection());
        assert_eq!(view.selection(), TextRange { start: 1, end: 4 });
    }
}
