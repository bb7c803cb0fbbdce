// SPDX-License-Identifier: MIT
//
// Key identity, modifier flags, and the normalized chord.
//
// A host reports a key press as a code plus modifiers. Different hosts
// spell the same press differently: one reports `Char('M')` for
// Ctrl+Shift+M, another `Char('m')` with SHIFT set. `KeyChord::new`
// folds these into one canonical form so binding lookup never has to
// guess.

use std::fmt;

use bitflags::bitflags;

// ─── Key codes ──────────────────────────────────────────────────────────────

/// A modifier key pressed on its own.
///
/// Hosts that report bare modifier presses (Qt-style toolkits do) deliver
/// them as [`KeyCode::Modifier`]. They never form a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    AltGr,
    Super,
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char). Function keys F1–F35 use [`F`](KeyCode::F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character (printable, including space).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F35.
    F(u8),
    /// A bare modifier press.
    Modifier(ModifierKey),
}

impl KeyCode {
    /// True for bare modifier presses.
    #[inline]
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(self, Self::Modifier(_))
    }
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Same bit layout as the Kitty keyboard protocol mask for the four
    /// modifiers Emacs notation can name. `ALT` is Emacs' Meta (`M-`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

// ─── Chord ──────────────────────────────────────────────────────────────────

/// One key press with its full modifier set, in canonical form.
///
/// Canonical form: an ASCII uppercase letter is stored as its lowercase
/// letter with [`Modifiers::SHIFT`] set. Every other code is stored as
/// given. Two chords are equal iff code and modifier set are identical,
/// which is exactly the matching rule the binding table uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    code: KeyCode,
    modifiers: Modifiers,
}

impl KeyChord {
    /// Build a chord, normalizing uppercase ASCII letters to lowercase+SHIFT.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        match code {
            KeyCode::Char(ch) if ch.is_ascii_uppercase() => Self {
                code: KeyCode::Char(ch.to_ascii_lowercase()),
                modifiers: modifiers.union(Modifiers::SHIFT),
            },
            _ => Self { code, modifiers },
        }
    }

    /// A chord with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Ctrl + `ch`.
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// Alt (Meta) + `ch`.
    #[must_use]
    pub const fn alt(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::ALT)
    }

    #[inline]
    #[must_use]
    pub const fn code(self) -> KeyCode {
        self.code
    }

    #[inline]
    #[must_use]
    pub const fn modifiers(self) -> Modifiers {
        self.modifiers
    }

    /// True if this chord is the Escape key, with or without modifiers.
    #[inline]
    #[must_use]
    pub const fn is_escape(self) -> bool {
        matches!(self.code, KeyCode::Escape)
    }
}

impl fmt::Debug for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyChord({self})")
    }
}

// ─── Events ─────────────────────────────────────────────────────────────────

/// Key press / repeat / release distinction.
///
/// Hosts that cannot tell report everything as
/// [`Press`](KeyEventKind::Press).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event as delivered by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press event.
    #[must_use]
    pub const fn press(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    /// The canonical chord for this event.
    #[must_use]
    pub const fn chord(&self) -> KeyChord {
        KeyChord::new(self.code, self.modifiers)
    }

    /// True for presses and auto-repeats. Releases never trigger commands.
    #[inline]
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }
}

impl From<KeyChord> for KeyEvent {
    fn from(chord: KeyChord) -> Self {
        Self::press(chord.code, chord.modifiers)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
