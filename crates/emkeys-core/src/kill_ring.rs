//! Kill ring — killed text shared by every view.
//!
//! Each kill (`C-k`, `M-d`, `C-w`, `M-w`) pushes its text; `C-y` inserts
//! the most recent entry and `M-y` replaces what was just yanked with
//! successively older entries:
//!
//! ```text
//!   entries: ["c", "b", "a"]      most recent first
//!   yank()  → "c"                 rotation now points at "b"
//!   next()  → "b", next() → "a", next() → "c", ...
//! ```
//!
//! The ring also remembers which view performed the last yank, so a yank-pop
//! issued from another view can be refused, and which view made the head
//! entry, so a kill only coalesces onto text that view killed itself.
//!
//! [`KillRing`] is the boundary the dispatcher consumes; [`SharedKillRing`]
//! is the in-process implementation behind a [`parking_lot::Mutex`].

use parking_lot::Mutex;

use crate::host::ViewId;

/// Entries kept before the oldest is dropped (matches Emacs' `kill-ring-max`).
pub const KILL_RING_MAX: usize = 60;

// ---------------------------------------------------------------------------
// KillRing
// ---------------------------------------------------------------------------

/// A shared, internally synchronized ring of killed text.
pub trait KillRing: Send + Sync {
    /// Store `text` as the most recent entry. Empty text is ignored.
    fn push(&self, text: &str);

    /// Extend the most recent entry with `text`, or push it when the ring
    /// is empty.
    fn append(&self, text: &str);

    /// The most recent entry, without touching the rotation.
    fn head(&self) -> Option<String>;

    /// The most recent entry. Rotation restarts at the entry after it.
    fn yank(&self) -> Option<String>;

    /// The entry under the rotation, advancing it toward older entries and
    /// wrapping. `None` when the ring is empty.
    fn next(&self) -> Option<String>;

    /// The view that performed the most recent yank.
    fn current_yank_view(&self) -> Option<ViewId>;

    fn set_current_yank_view(&self, view: ViewId);

    /// The view that made the head entry. Cleared by every
    /// [`push`](Self::push), so an entry pushed by anyone else has no owner.
    fn last_kill_view(&self) -> Option<ViewId>;

    /// Claim the head entry for `view`.
    fn set_last_kill_view(&self, view: ViewId);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Entries {
    /// Most recent at index 0.
    texts: Vec<String>,
    max_size: usize,
    rotation: usize,
    yank_view: Option<ViewId>,
    kill_view: Option<ViewId>,
}

impl Entries {
    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.texts.insert(0, text.to_string());
        self.texts.truncate(self.max_size);
        self.rotation = 0;
        self.kill_view = None;
    }

    fn append(&mut self, text: &str) {
        match self.texts.first_mut() {
            Some(head) => head.push_str(text),
            None => self.push(text),
        }
    }

    fn yank(&mut self) -> Option<String> {
        let head = self.texts.first()?.clone();
        self.rotation = 1 % self.texts.len();
        Some(head)
    }

    fn next(&mut self) -> Option<String> {
        let len = self.texts.len();
        if len == 0 {
            return None;
        }
        let idx = self.rotation % len;
        self.rotation = (idx + 1) % len;
        Some(self.texts[idx].clone())
    }
}

// ---------------------------------------------------------------------------
// SharedKillRing
// ---------------------------------------------------------------------------

/// Mutex-protected [`KillRing`]. Wrap it in an `Arc` to share it.
#[derive(Debug)]
pub struct SharedKillRing {
    inner: Mutex<Entries>,
}

impl SharedKillRing {
    /// A ring holding at most [`KILL_RING_MAX`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(KILL_RING_MAX)
    }

    /// A ring holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Entries {
                texts: Vec::new(),
                max_size: capacity.max(1),
                rotation: 0,
                yank_view: None,
                kill_view: None,
            }),
        }
    }

    /// All entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().texts.clone()
    }
}

impl Default for SharedKillRing {
    fn default() -> Self {
        Self::new()
    }
}

impl KillRing for SharedKillRing {
    fn push(&self, text: &str) {
        self.inner.lock().push(text);
    }

    fn append(&self, text: &str) {
        self.inner.lock().append(text);
    }

    fn head(&self) -> Option<String> {
        self.inner.lock().texts.first().cloned()
    }

    fn yank(&self) -> Option<String> {
        self.inner.lock().yank()
    }

    fn next(&self) -> Option<String> {
        self.inner.lock().next()
    }

    fn current_yank_view(&self) -> Option<ViewId> {
        self.inner.lock().yank_view
    }

    fn set_current_yank_view(&self, view: ViewId) {
        self.inner.lock().yank_view = Some(view);
    }

    fn last_kill_view(&self) -> Option<ViewId> {
        self.inner.lock().kill_view
    }

    fn set_last_kill_view(&self, view: ViewId) {
        let mut entries = self.inner.lock();
        if !entries.texts.is_empty() {
            entries.kill_view = Some(view);
        }
    }

    fn len(&self) -> usize {
        self.inner.lock().texts.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ring_of(texts: &[&str]) -> SharedKillRing {
        let ring = SharedKillRing::new();
        for text in texts {
            ring.push(text);
        }
        ring
    }

    #[test]
    fn push_is_most_recent_first() {
        let ring = ring_of(&["a", "b", "c"]);
        assert_eq!(ring.entries(), vec!["c", "b", "a"]);
        assert_eq!(ring.head().as_deref(), Some("c"));
    }

    #[test]
    fn empty_text_is_never_stored() {
        let ring = SharedKillRing::new();
        ring.push("");
        ring.append("");
        assert!(ring.is_empty());
    }

    #[test]
    fn append_extends_head() {
        let ring = ring_of(&["old", "aaa"]);
        ring.append("\nbbb");
        assert_eq!(ring.entries(), vec!["aaa\nbbb", "old"]);
    }

    #[test]
    fn append_on_empty_pushes() {
        let ring = SharedKillRing::new();
        ring.append("x");
        assert_eq!(ring.entries(), vec!["x"]);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let ring = SharedKillRing::with_capacity(2);
        ring.push("a");
        ring.push("b");
        ring.push("c");
        assert_eq!(ring.entries(), vec!["c", "b"]);
    }

    #[test]
    fn yank_then_next_rotates_through_older_entries() {
        let ring = ring_of(&["a", "b", "c"]);
        assert_eq!(ring.yank().as_deref(), Some("c"));
        let popped: Vec<String> = (0..4).filter_map(|_| ring.next()).collect();
        assert_eq!(popped, vec!["b", "a", "c", "b"]);
    }

    #[test]
    fn yank_rewinds_rotation() {
        let ring = ring_of(&["a", "b"]);
        ring.yank();
        ring.next();
        assert_eq!(ring.yank().as_deref(), Some("b"));
        assert_eq!(ring.next().as_deref(), Some("a"));
    }

    #[test]
    fn single_entry_rotates_onto_itself() {
        let ring = ring_of(&["only"]);
        ring.yank();
        assert_eq!(ring.next().as_deref(), Some("only"));
    }

    #[test]
    fn empty_ring_yields_nothing() {
        let ring = SharedKillRing::new();
        assert_eq!(ring.yank(), None);
        assert_eq!(ring.next(), None);
    }

    #[test]
    fn remembers_yank_view() {
        let ring = SharedKillRing::new();
        assert_eq!(ring.current_yank_view(), None);
        ring.set_current_yank_view(ViewId::new(2));
        assert_eq!(ring.current_yank_view(), Some(ViewId::new(2)));
    }

    #[test]
    fn push_clears_kill_owner() {
        let ring = SharedKillRing::new();
        ring.set_last_kill_view(ViewId::new(1));
        assert_eq!(ring.last_kill_view(), None);

        ring.push("a");
        ring.set_last_kill_view(ViewId::new(1));
        ring.append("b");
        assert_eq!(ring.last_kill_view(), Some(ViewId::new(1)));

        ring.push("c");
        assert_eq!(ring.last_kill_view(), None);
    }
}
