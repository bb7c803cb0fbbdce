//! Text view — in-memory reference implementation of [`TextSurface`].
//!
//! A `TextView` bundles everything a host widget would provide to the key
//! layer:
//!
//! - **Text** in a rope-backed [`Buffer`]
//! - **Cursor** as a position, a selection anchor and a sticky column
//! - **Viewport** as a first visible line and a height in lines
//! - **Edit log** recording edit-block boundaries
//! - **Display flags** (line wrap, read-only, overwrite) via
//!   [`DisplaySettings`]
//!
//! # Sticky column
//!
//! Vertical motion remembers the column it started from. Passing through a
//! short line and reaching a long one again snaps back to the remembered
//! column. Any other motion or edit forgets it.
//!
//! # Viewport
//!
//! Cursor motions and edits scroll just enough to keep the cursor line
//! visible. [`scroll_to_line`](TextSurface::scroll_to_line) sets the first
//! visible line directly and may leave the cursor off screen, the same as
//! scrolling a real widget with the mouse.

use crate::buffer::Buffer;
use crate::edit_log::EditLog;
use crate::host::DisplaySettings;
use crate::surface::{MoveMode, MoveOp, SurfaceError, TextSurface};
use crate::word;

/// Lines visible when no height is given.
pub const DEFAULT_HEIGHT: usize = 24;

#[derive(Debug)]
pub struct TextView {
    buffer: Buffer,
    position: usize,
    anchor: usize,
    sticky_col: Option<usize>,
    top_line: usize,
    height: usize,
    log: EditLog,
    line_wrap: bool,
    read_only: bool,
    overwrite: bool,
}

impl TextView {
    // -- Construction -------------------------------------------------------

    #[must_use]
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// A view over `text` with the cursor at the start.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: Buffer::from_text(text),
            position: 0,
            anchor: 0,
            sticky_col: None,
            top_line: 0,
            height: DEFAULT_HEIGHT,
            log: EditLog::new(),
            line_wrap: true,
            read_only: false,
            overwrite: false,
        }
    }

    /// Set the viewport height (minimum 1).
    #[must_use]
    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height.max(1);
        self
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The full text with `\n` line endings.
    #[must_use]
    pub fn text(&self) -> String {
        self.buffer.contents()
    }

    #[inline]
    #[must_use]
    pub const fn edit_log(&self) -> &EditLog {
        &self.log
    }

    /// First visible line.
    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn overwrite_mode(&self) -> bool {
        self.overwrite
    }

    /// Column of the cursor within its line.
    #[must_use]
    pub fn column(&self) -> usize {
        self.position - self.buffer.line_start(self.buffer.line_of(self.position))
    }

    // -- Internals ----------------------------------------------------------

    /// Where one application of `op` takes the cursor.
    fn step(&self, op: MoveOp, sticky_col: usize) -> usize {
        let buf = &self.buffer;
        let pos = self.position;
        let line = buf.line_of(pos);
        match op {
            MoveOp::Left => pos.saturating_sub(1),
            MoveOp::Right => (pos + 1).min(buf.len_chars()),
            MoveOp::Up if line == 0 => pos,
            MoveOp::Up => buf.line_start(line - 1) + sticky_col.min(buf.line_content_len(line - 1)),
            MoveOp::Down if line + 1 >= buf.line_count() => pos,
            MoveOp::Down => buf.line_start(line + 1) + sticky_col.min(buf.line_content_len(line + 1)),
            MoveOp::StartOfLine => buf.line_start(line),
            MoveOp::EndOfLine => buf.line_end(line),
            MoveOp::NextWord => word::next_word_start(buf, pos),
            MoveOp::PreviousWord => word::previous_word_start(buf, pos),
            MoveOp::StartOfDocument => 0,
            MoveOp::EndOfDocument => buf.len_chars(),
        }
    }

    fn settle(&mut self, mode: MoveMode) {
        if mode == MoveMode::Move {
            self.anchor = self.position;
        }
        self.reveal_cursor();
    }

    /// Scroll so the cursor line is inside the viewport.
    fn reveal_cursor(&mut self) {
        let line = self.buffer.line_of(self.position);
        if line < self.top_line {
            self.top_line = line;
        }
        if line >= self.top_line + self.height {
            self.top_line = line + 1 - self.height;
        }
    }

    fn check_writable(&self) -> Result<(), SurfaceError> {
        if self.read_only {
            return Err(SurfaceError::ReadOnly);
        }
        Ok(())
    }
}

impl Default for TextView {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TextSurface
// ---------------------------------------------------------------------------

impl TextSurface for TextView {
    fn position(&self) -> usize {
        self.position
    }

    fn anchor(&self) -> usize {
        self.anchor
    }

    fn selected_text(&self) -> String {
        self.buffer.slice(self.selection()).unwrap_or_default()
    }

    fn set_position(&mut self, offset: usize, mode: MoveMode) {
        self.position = offset.min(self.buffer.len_chars());
        self.sticky_col = None;
        self.settle(mode);
    }

    fn move_position(&mut self, op: MoveOp, mode: MoveMode, n: usize) -> bool {
        let vertical = matches!(op, MoveOp::Up | MoveOp::Down);
        let sticky_col = if vertical {
            let col = self.sticky_col.unwrap_or_else(|| self.column());
            self.sticky_col = Some(col);
            col
        } else {
            self.sticky_col = None;
            0
        };

        let mut moved_all = true;
        for _ in 0..n {
            let next = self.step(op, sticky_col);
            if next == self.position {
                moved_all = false;
                break;
            }
            self.position = next;
        }

        self.settle(mode);
        moved_all
    }

    fn clear_selection(&mut self) {
        self.anchor = self.position;
    }

    fn remove_selected_text(&mut self) -> Result<(), SurfaceError> {
        self.check_writable()?;
        let range = self.selection();
        if range.is_empty() {
            return Ok(());
        }
        let removed = self.buffer.delete(range)?;
        self.log.record_delete(range.start, &removed);
        self.position = range.start;
        self.sticky_col = None;
        self.settle(MoveMode::Move);
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.check_writable()?;
        self.remove_selected_text()?;
        if text.is_empty() {
            return Ok(());
        }
        let before = self.buffer.len_chars();
        self.buffer.insert(self.position, text)?;
        self.log.record_insert(self.position, text);
        self.position += self.buffer.len_chars() - before;
        self.sticky_col = None;
        self.settle(MoveMode::Move);
        Ok(())
    }

    fn begin_edit_block(&mut self) {
        self.log.begin();
    }

    fn end_edit_block(&mut self) {
        self.log.end();
    }

    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer.char_at(offset)
    }

    fn line_of(&self, offset: usize) -> usize {
        self.buffer.line_of(offset)
    }

    fn line_start(&self, line: usize) -> usize {
        self.buffer.line_start(line)
    }

    fn line_end(&self, line: usize) -> usize {
        self.buffer.line_end(line)
    }

    fn lines_on_screen(&self) -> usize {
        self.height
    }

    fn cursor_line_on_screen(&self) -> usize {
        self.buffer.line_of(self.position).saturating_sub(self.top_line)
    }

    fn scroll_to_line(&mut self, line: usize) {
        self.top_line = line.min(self.buffer.line_count() - 1);
    }
}

// ---------------------------------------------------------------------------
// DisplaySettings
// ---------------------------------------------------------------------------

impl DisplaySettings for TextView {
    fn line_wrap(&self) -> bool {
        self.line_wrap
    }

    fn set_line_wrap(&mut self, wrap: bool) {
        self.line_wrap = wrap;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn set_overwrite_mode(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
