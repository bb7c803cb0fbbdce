//! Command dispatch — key events in, editing commands out.
//!
//! One [`Dispatcher`] serves one view. It owns that view's mark ring and
//! yank bookkeeping, and shares the keymap, kill ring, clipboard and host
//! with every other view through [`Shared`].
//!
//! # Region state machine
//!
//! The region is the span between the most recent mark and the cursor. It
//! is *active* while that mark's active flag is set. For every bound key:
//!
//! 1. Read the most recent mark. If it is active, motions run with
//!    [`MoveMode::Extend`] (the selection follows the cursor); otherwise
//!    with [`MoveMode::Move`].
//! 2. Run the command.
//! 3. If the mark is still active and the command is neither a motion nor
//!    set-mark, deactivate it and clear the surface selection. An active
//!    region is consumed by exactly one non-motion command.
//! 4. Remember the command, so `C-k C-k` can coalesce into one kill.
//!
//! An unbound key is left to the host, which typically edits with it, so it
//! drops an active region too and breaks kill coalescing. Bare modifier
//! presses and releases change nothing.
//!
//! ```text
//!             C-SPC                     C-w / M-w / C-g / ...
//!  Inactive ─────────▶ Active ───────────────────────────────▶ Inactive
//!     ▲                │  ▲ │
//!     └── C-SPC at ────┘  └─┘ motions, C-S-m
//!         same spot
//! ```
//!
//! # Soft failures
//!
//! Commands return `Result<(), CommandError>`. A failure (no mark, nothing
//! to kill, stale yank, read-only text, ...) reaches the host as exactly one
//! [`Host::alert`] and never aborts dispatch: the region rule and last-key
//! memory still run.

use std::fmt;
use std::sync::Arc;

use emkeys_input::{KeyChord, KeyEvent};
use tracing::{debug, trace, warn};

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::config::{Config, DEFAULT_SCROLL_MARGIN};
use crate::error::{CommandError, ConfigError};
use crate::host::{Host, NullHost, ViewId};
use crate::keymap::{Category, Command, Keymap};
use crate::kill_ring::{KillRing, SharedKillRing};
use crate::mark::MarkRing;
use crate::surface::{EditBlock, MoveMode, MoveOp, TextRange, TextSurface};
use crate::word::is_blank;

// ---------------------------------------------------------------------------
// Shared services
// ---------------------------------------------------------------------------

/// Services shared by every dispatcher of a session.
#[derive(Clone)]
pub struct Shared {
    pub keymap: Arc<Keymap>,
    pub kill_ring: Arc<dyn KillRing>,
    pub clipboard: Arc<dyn Clipboard>,
    pub host: Arc<dyn Host>,
}

impl Shared {
    /// `keymap` with an in-memory kill ring and clipboard and a silent host.
    #[must_use]
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap: Arc::new(keymap),
            kill_ring: Arc::new(SharedKillRing::new()),
            clipboard: Arc::new(MemoryClipboard::new()),
            host: Arc::new(NullHost),
        }
    }

    /// Keymap and kill ring built from `config`.
    ///
    /// # Errors
    ///
    /// Whatever [`Config::keymap`] rejects.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            kill_ring: Arc::new(SharedKillRing::with_capacity(config.kill_ring_capacity)),
            ..Self::new(config.keymap()?)
        })
    }

    #[must_use]
    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    #[must_use]
    pub fn with_kill_ring(mut self, kill_ring: Arc<dyn KillRing>) -> Self {
        self.kill_ring = kill_ring;
        self
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new(Keymap::emacs())
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("bindings", &self.keymap.len())
            .field("kill_ring", &self.kill_ring.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher state
// ---------------------------------------------------------------------------

/// Whether a key event was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Handled,
    /// Not ours: the host should process the key normally.
    Unhandled,
}

impl EventResult {
    #[inline]
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Whether the region is highlighted and extended by motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    Inactive,
    Active,
}

/// Where the last successful yank put its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YankState {
    pub start: usize,
    pub end: usize,
    pub view: ViewId,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    view: ViewId,
    shared: Shared,
    marks: MarkRing,
    yank: Option<YankState>,
    last_command: Option<Command>,
    scroll_margin: usize,
    enabled: bool,
}

impl Dispatcher {
    /// A dispatcher for `view` with default ring sizes.
    #[must_use]
    pub fn new(view: ViewId, shared: Shared) -> Self {
        Self {
            view,
            shared,
            marks: MarkRing::new(),
            yank: None,
            last_command: None,
            scroll_margin: DEFAULT_SCROLL_MARGIN,
            enabled: true,
        }
    }

    /// A dispatcher sized by `config`.
    #[must_use]
    pub fn with_config(view: ViewId, shared: Shared, config: &Config) -> Self {
        Self {
            marks: MarkRing::with_capacity(config.mark_ring_capacity),
            scroll_margin: config.scroll_margin,
            ..Self::new(view, shared)
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn view(&self) -> ViewId {
        self.view
    }

    #[inline]
    #[must_use]
    pub const fn marks(&self) -> &MarkRing {
        &self.marks
    }

    #[must_use]
    pub fn region_state(&self) -> RegionState {
        if self.marks.most_recent().active {
            RegionState::Active
        } else {
            RegionState::Inactive
        }
    }

    #[inline]
    #[must_use]
    pub const fn last_yank(&self) -> Option<YankState> {
        self.yank
    }

    #[inline]
    #[must_use]
    pub const fn last_command(&self) -> Option<Command> {
        self.last_command
    }

    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// While disabled every key is [`EventResult::Unhandled`] and nothing
    /// is touched.
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub const fn set_scroll_margin(&mut self, lines: usize) {
        self.scroll_margin = lines;
    }

    #[inline]
    #[must_use]
    pub const fn scroll_margin(&self) -> usize {
        self.scroll_margin
    }

    // -- Entry points -------------------------------------------------------

    /// Whether the host should hand `chord` to this dispatcher before its
    /// own shortcut handling.
    #[must_use]
    pub fn wants_capture(&self, chord: KeyChord) -> bool {
        self.enabled && self.shared.keymap.wants_capture(chord)
    }

    /// Handle one key event against `surface`.
    pub fn handle_key(&mut self, surface: &mut dyn TextSurface, event: KeyEvent) -> EventResult {
        if !self.enabled || !event.is_press() || event.code.is_modifier() {
            return EventResult::Unhandled;
        }

        let chord = event.chord();
        let Some(command) = self.shared.keymap.lookup(chord) else {
            trace!(view = %self.view, %chord, "unbound");
            self.last_command = None;
            // The host edits with this key; an active region ends here.
            if self.deactivate_region(surface) {
                self.shared.host.selection_changed(self.view, &[]);
            }
            return EventResult::Unhandled;
        };
        trace!(view = %self.view, %chord, %command, category = ?command.category(), "matched");

        self.run_command(surface, command);
        // `C-g` only drops the region; the host still gets to act on it.
        if command == Command::CancelMark {
            EventResult::Unhandled
        } else {
            EventResult::Handled
        }
    }

    /// Run `command` as if its key had been pressed.
    pub fn run_command(&mut self, surface: &mut dyn TextSurface, command: Command) {
        let mode = if self.marks.most_recent().active {
            MoveMode::Extend
        } else {
            MoveMode::Move
        };
        let before = surface.selection();
        debug!(view = %self.view, %command, ?mode, position = surface.position(), "run");

        if let Err(err) = self.execute(surface, command, mode) {
            self.report(command, &err);
        }

        let deactivated = self.settle_region(surface, command);
        self.notify_selection(surface, before, deactivated);
        self.last_command = Some(command);
    }

    // -- Region bookkeeping -------------------------------------------------

    /// Drop an active region after a command that consumes it. Returns true
    /// if the region was dropped.
    fn settle_region(&mut self, surface: &mut dyn TextSurface, command: Command) -> bool {
        let keeps_region = matches!(command.category(), Category::Movement | Category::SetMark);
        !keeps_region && self.deactivate_region(surface)
    }

    fn deactivate_region(&mut self, surface: &mut dyn TextSurface) -> bool {
        if !self.marks.most_recent().active {
            return false;
        }
        self.marks.toggle_active();
        surface.clear_selection();
        true
    }

    fn notify_selection(&self, surface: &dyn TextSurface, before: TextRange, deactivated: bool) {
        let after = surface.selection();
        if !deactivated && after == before {
            return;
        }
        let one = [after];
        let ranges = if after.is_empty() { &one[..0] } else { &one[..] };
        self.shared.host.selection_changed(self.view, ranges);
    }

    fn report(&self, command: Command, err: &CommandError) {
        match err {
            CommandError::Surface(source) => {
                warn!(view = %self.view, %command, %source, "edit rejected");
            }
            _ => debug!(view = %self.view, %command, %err, "command failed"),
        }
        self.shared.host.alert(self.view, err);
    }

    // -- Commands -----------------------------------------------------------

    fn execute(
        &mut self,
        surface: &mut dyn TextSurface,
        command: Command,
        mode: MoveMode,
    ) -> Result<(), CommandError> {
        match command {
            Command::MoveDown => step(surface, MoveOp::Down, mode),
            Command::MoveUp => step(surface, MoveOp::Up, mode),
            Command::MoveLineStart => step(surface, MoveOp::StartOfLine, mode),
            Command::MoveLineEnd => step(surface, MoveOp::EndOfLine, mode),
            Command::MoveLeft => step(surface, MoveOp::Left, mode),
            Command::MoveRight => step(surface, MoveOp::Right, mode),
            Command::MoveWordLeft => step(surface, MoveOp::PreviousWord, mode),
            Command::MoveWordRight => step(surface, MoveOp::NextWord, mode),
            Command::MoveDocStart => step(surface, MoveOp::StartOfDocument, mode),
            Command::MoveDocEnd => step(surface, MoveOp::EndOfDocument, mode),
            Command::PageDown => self.page(surface, MoveOp::Down, mode),
            Command::PageUp => self.page(surface, MoveOp::Up, mode),
            Command::Recenter => recenter(surface),
            Command::ExchangeDotAndMark => return self.exchange_dot_and_mark(surface),
            Command::SetMark => self.set_mark(surface),
            Command::PopToMark => return self.pop_to_mark(surface, MoveMode::Move),
            Command::KillLine => {
                let augment = self.last_command == Some(Command::KillLine)
                    && self.shared.kill_ring.last_kill_view() == Some(self.view);
                return self.kill_line(surface, augment);
            }
            Command::KillWord => return self.kill_to(surface, MoveOp::NextWord),
            Command::BackwardKillWord => return self.kill_to(surface, MoveOp::PreviousWord),
            Command::DeleteChar => return delete_char(surface),
            Command::Yank => return self.yank(surface),
            Command::YankPop => return self.yank_pop(surface),
            Command::Cut => return self.cut(surface),
            Command::Copy => return self.copy(surface),
            Command::RemoveWhitespace => return remove_whitespace(surface),
            Command::CancelMark => {}
        }
        Ok(())
    }

    fn page(&self, surface: &mut dyn TextSurface, op: MoveOp, mode: MoveMode) {
        let lines = surface
            .lines_on_screen()
            .saturating_sub(self.scroll_margin)
            .max(1);
        let row = surface.cursor_line_on_screen();
        surface.move_position(op, mode, lines);
        let line = surface.line_of(surface.position());
        surface.scroll_to_line(line.saturating_sub(row));
    }

    // -- Marks --------------------------------------------------------------

    fn set_mark(&mut self, surface: &mut dyn TextSurface) {
        surface.clear_selection();
        self.marks.add_mark(surface.position());
    }

    /// Swap cursor and mark. The old cursor position becomes the new, active
    /// mark and the region spans the two.
    fn exchange_dot_and_mark(&mut self, surface: &mut dyn TextSurface) -> Result<(), CommandError> {
        let mark = self.marks.most_recent();
        if !mark.valid {
            return Err(CommandError::NoMark);
        }
        let point = surface.position();
        self.marks.add_mark(point);
        surface.set_position(point, MoveMode::Move);
        surface.set_position(mark.position, MoveMode::Extend);
        Ok(())
    }

    fn pop_to_mark(&mut self, surface: &mut dyn TextSurface, mode: MoveMode) -> Result<(), CommandError> {
        let mark = self.marks.previous();
        if !mark.valid {
            return Err(CommandError::NoMark);
        }
        surface.set_position(mark.position, mode);
        Ok(())
    }

    // -- Kill ---------------------------------------------------------------

    /// Kill to the end of the line, or the line break itself when already
    /// there. With `augment` the text joins the previous kill.
    fn kill_line(&mut self, surface: &mut dyn TextSurface, augment: bool) -> Result<(), CommandError> {
        let mut block = EditBlock::begin(surface);
        block.clear_selection();
        let start = block.position();

        block.move_position(MoveOp::EndOfLine, MoveMode::Extend, 1);
        if block.position() == start {
            block.move_position(MoveOp::Right, MoveMode::Extend, 1);
        }
        if !block.has_selection() {
            return Err(CommandError::NothingToKill);
        }

        let text = block.selected_text();
        self.store_kill(&text, augment);
        delete_selection(&mut *block, start)
    }

    /// Kill from the cursor to wherever `op` lands.
    fn kill_to(&mut self, surface: &mut dyn TextSurface, op: MoveOp) -> Result<(), CommandError> {
        let mut block = EditBlock::begin(surface);
        block.clear_selection();
        let start = block.position();

        block.move_position(op, MoveMode::Extend, 1);
        if block.position() == start {
            return Err(CommandError::NothingToKill);
        }

        let text = block.selected_text();
        self.store_kill(&text, false);
        delete_selection(&mut *block, start)
    }

    fn cut(&mut self, surface: &mut dyn TextSurface) -> Result<(), CommandError> {
        if !surface.has_selection() {
            return Err(CommandError::NoSelection);
        }
        let mut block = EditBlock::begin(surface);
        let text = block.selected_text();
        self.store_kill(&text, false);
        block.remove_selected_text()?;
        Ok(())
    }

    fn copy(&mut self, surface: &mut dyn TextSurface) -> Result<(), CommandError> {
        if !surface.has_selection() {
            return Err(CommandError::NoSelection);
        }
        let text = surface.selected_text();
        self.store_kill(&text, false);
        surface.clear_selection();
        Ok(())
    }

    /// Publish killed text to the clipboard and the kill ring, and claim the
    /// ring head for this view.
    fn store_kill(&self, text: &str, augment: bool) {
        let Shared {
            kill_ring, clipboard, ..
        } = &self.shared;
        if augment {
            let mut joined = clipboard.text();
            joined.push_str(text);
            clipboard.set_text(&joined);
            kill_ring.append(text);
        } else {
            clipboard.set_text(text);
            kill_ring.push(text);
        }
        kill_ring.set_last_kill_view(self.view);
    }

    // -- Yank ---------------------------------------------------------------

    /// Text placed on the clipboard by other applications enters the ring
    /// before it is yanked.
    fn sync_clipboard(&self) {
        let text = self.shared.clipboard.text();
        if !text.is_empty() && self.shared.kill_ring.head().as_deref() != Some(text.as_str()) {
            self.shared.kill_ring.push(&text);
        }
    }

    fn yank(&mut self, surface: &mut dyn TextSurface) -> Result<(), CommandError> {
        self.sync_clipboard();
        let text = self.shared.kill_ring.yank().ok_or(CommandError::EmptyKillRing)?;

        let mut block = EditBlock::begin(surface);
        block.clear_selection();
        let start = block.position();
        block.insert_text(&text)?;
        let end = block.position();
        drop(block);

        self.yank = Some(YankState {
            start,
            end,
            view: self.view,
        });
        self.shared.kill_ring.set_current_yank_view(self.view);
        Ok(())
    }

    /// Replace the text of the previous yank with the next older kill.
    ///
    /// Only valid right where the previous yank in this view ended, and only
    /// if no other view has yanked since.
    fn yank_pop(&mut self, surface: &mut dyn TextSurface) -> Result<(), CommandError> {
        let Some(state) = self.yank else {
            return Err(CommandError::StaleYank);
        };
        if self.shared.kill_ring.current_yank_view() != Some(self.view)
            || surface.position() != state.end
        {
            return Err(CommandError::StaleYank);
        }
        let text = self.shared.kill_ring.next().ok_or(CommandError::EmptyKillRing)?;

        let mut block = EditBlock::begin(surface);
        block.set_position(state.start, MoveMode::Move);
        block.set_position(state.end, MoveMode::Extend);
        if let Err(err) = block.insert_text(&text) {
            block.set_position(state.end, MoveMode::Move);
            return Err(err.into());
        }
        let end = block.position();
        drop(block);

        self.yank = Some(YankState { end, ..state });
        Ok(())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("view", &self.view)
            .field("marks", &self.marks)
            .field("yank", &self.yank)
            .field("last_command", &self.last_command)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Stateless commands
// ---------------------------------------------------------------------------

fn step(surface: &mut dyn TextSurface, op: MoveOp, mode: MoveMode) {
    surface.move_position(op, mode, 1);
}

fn recenter(surface: &mut dyn TextSurface) {
    let line = surface.line_of(surface.position());
    surface.scroll_to_line(line.saturating_sub(surface.lines_on_screen() / 2));
}

/// Delete the char after the cursor, or the selection if there is one.
fn delete_char(surface: &mut dyn TextSurface) -> Result<(), CommandError> {
    let mut block = EditBlock::begin(surface);
    let start = block.position();
    if !block.has_selection() {
        if start >= block.len_chars() {
            return Ok(());
        }
        block.set_position(start + 1, MoveMode::Extend);
    }
    delete_selection(&mut *block, start)
}

/// Collapse the blanks around the cursor into one space.
///
/// Acts only when the cursor is on a blank or just after one on the same
/// line. The run never extends past the current line.
fn remove_whitespace(surface: &mut dyn TextSurface) -> Result<(), CommandError> {
    let pos = surface.position();
    let line = surface.line_of(pos);
    let (line_start, line_end) = (surface.line_start(line), surface.line_end(line));
    let blank_at = |offset: usize| surface.char_at(offset).is_some_and(is_blank);

    let on_blank = pos < line_end && blank_at(pos);
    let after_blank = pos > line_start && blank_at(pos - 1);
    if !on_blank && !after_blank {
        trace!(pos, "not on whitespace");
        return Ok(());
    }

    let mut start = pos;
    while start > line_start && blank_at(start - 1) {
        start -= 1;
    }
    let mut end = pos;
    while end < line_end && blank_at(end) {
        end += 1;
    }

    if end - start == 1 && surface.char_at(start) == Some(' ') {
        surface.set_position(end, MoveMode::Move);
        return Ok(());
    }

    let mut block = EditBlock::begin(surface);
    block.set_position(start, MoveMode::Move);
    block.set_position(end, MoveMode::Extend);
    if let Err(err) = block.insert_text(" ") {
        block.set_position(pos, MoveMode::Move);
        return Err(err.into());
    }
    Ok(())
}

/// Remove the selection. On failure the cursor returns to `restore` with
/// nothing selected.
fn delete_selection(surface: &mut dyn TextSurface, restore: usize) -> Result<(), CommandError> {
    if let Err(err) = surface.remove_selected_text() {
        surface.set_position(restore, MoveMode::Move);
        return Err(err.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
