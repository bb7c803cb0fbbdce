//! Mark ring — bounded history of saved cursor positions.
//!
//! `C-SPC` pushes the cursor position as a new *mark*. The most recent mark
//! is one end of the region; while it is *active*, cursor motion extends
//! the selection from it. `C-m` (pop-to-mark) walks back through older
//! marks.
//!
//! ```text
//!   front                          back
//!   ┌────┬────┬────┬────┐
//!   │ 15 │ 10 │  5 │  0 │   add_mark(20) → [20*, 15, 10, 5, 0]
//!   └────┴────┴────┴────┘
//!     *  = active (only ever the front)
//! ```

use std::collections::VecDeque;

/// Number of marks kept per view (matches Emacs' `mark-ring-max`).
pub const MARK_RING_MAX: usize = 16;

// ---------------------------------------------------------------------------
// Mark
// ---------------------------------------------------------------------------

/// A saved cursor position.
///
/// Equality compares `valid` and `position` only; whether a mark is active
/// does not change which position it names.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Mark {
    pub valid: bool,
    pub active: bool,
    pub position: usize,
}

impl Mark {
    /// "No mark". Returned by queries on an empty ring.
    pub const NONE: Self = Self {
        valid: false,
        active: false,
        position: 0,
    };

    /// A fresh mark: valid and active.
    #[must_use]
    pub const fn at(position: usize) -> Self {
        Self {
            valid: true,
            active: true,
            position,
        }
    }
}

impl PartialEq for Mark {
    fn eq(&self, other: &Self) -> bool {
        self.valid == other.valid && self.position == other.position
    }
}

impl Default for Mark {
    fn default() -> Self {
        Self::NONE
    }
}

// ---------------------------------------------------------------------------
// MarkRing
// ---------------------------------------------------------------------------

/// Bounded ring of marks, most recent first.
///
/// Invariants:
///
/// - `len() <= capacity()`
/// - at most one mark is active, and only the front can be
/// - the cycle cursor returns to the front on every [`add_mark`](Self::add_mark)
#[derive(Debug, Clone)]
pub struct MarkRing {
    marks: VecDeque<Mark>,
    capacity: usize,
    /// Index of the mark [`previous`](Self::previous) returns next.
    cursor: usize,
}

impl MarkRing {
    /// A ring holding at most [`MARK_RING_MAX`] marks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MARK_RING_MAX)
    }

    /// A ring holding at most `capacity` marks (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            marks: VecDeque::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    /// Record a mark at `position`.
    ///
    /// If the front mark already sits at `position` its active flag is
    /// toggled instead. Otherwise the front is deactivated and a new active
    /// mark goes in front of it, evicting the oldest mark when full.
    pub fn add_mark(&mut self, position: usize) {
        let mark = Mark::at(position);
        self.cursor = 0;

        if let Some(front) = self.marks.front_mut() {
            if *front == mark {
                front.active = !front.active;
                return;
            }
            front.active = false;
        }

        self.marks.push_front(mark);
        self.marks.truncate(self.capacity);
    }

    /// The front mark, or [`Mark::NONE`]. Does not move the cycle cursor.
    #[must_use]
    pub fn most_recent(&self) -> Mark {
        self.marks.front().copied().unwrap_or(Mark::NONE)
    }

    /// The mark under the cycle cursor, advancing the cursor toward older
    /// marks and wrapping back to the front after the oldest.
    pub fn previous(&mut self) -> Mark {
        let Some(&mark) = self.marks.get(self.cursor) else {
            return Mark::NONE;
        };
        self.cursor = (self.cursor + 1) % self.marks.len();
        mark
    }

    /// Flip the front mark's active flag. No-op on an empty ring.
    pub fn toggle_active(&mut self) {
        if let Some(front) = self.marks.front_mut() {
            front.active = !front.active;
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Marks from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter()
    }
}

impl Default for MarkRing {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
