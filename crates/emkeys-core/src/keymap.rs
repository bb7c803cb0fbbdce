//! Key bindings — which chord runs which command.
//!
//! A [`Keymap`] is built once, from the default Emacs table optionally
//! overridden per command by the configuration, and is read-only
//! afterwards. Lookup is an exact match on key code plus the full modifier
//! set: `C-k` does not match `C-M-k`.
//!
//! Every command belongs to a [`Category`] that drives the region rule in
//! the dispatcher: motions and set-mark keep an active region alive,
//! everything else consumes it.

use std::collections::HashMap;
use std::fmt;

use emkeys_input::{KeyChord, KeyCode, Modifiers};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A logical editing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    MoveDown,
    MoveUp,
    MoveLineStart,
    MoveLineEnd,
    MoveLeft,
    MoveRight,
    MoveWordLeft,
    MoveWordRight,
    MoveDocStart,
    MoveDocEnd,
    PageDown,
    PageUp,
    Recenter,
    ExchangeDotAndMark,
    SetMark,
    KillWord,
    BackwardKillWord,
    DeleteChar,
    KillLine,
    Yank,
    YankPop,
    Cut,
    Copy,
    PopToMark,
    RemoveWhitespace,
    CancelMark,
}

/// How a command interacts with an active region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Cursor motion. Extends an active region.
    Movement,
    /// Sets or toggles the mark.
    SetMark,
    /// Everything else. Consumes an active region.
    Other,
}

impl Command {
    pub const ALL: [Self; 26] = [
        Self::MoveDown,
        Self::MoveUp,
        Self::MoveLineStart,
        Self::MoveLineEnd,
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveWordLeft,
        Self::MoveWordRight,
        Self::MoveDocStart,
        Self::MoveDocEnd,
        Self::PageDown,
        Self::PageUp,
        Self::Recenter,
        Self::ExchangeDotAndMark,
        Self::SetMark,
        Self::KillWord,
        Self::BackwardKillWord,
        Self::DeleteChar,
        Self::KillLine,
        Self::Yank,
        Self::YankPop,
        Self::Cut,
        Self::Copy,
        Self::PopToMark,
        Self::RemoveWhitespace,
        Self::CancelMark,
    ];

    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::MoveDown
            | Self::MoveUp
            | Self::MoveLineStart
            | Self::MoveLineEnd
            | Self::MoveLeft
            | Self::MoveRight
            | Self::MoveWordLeft
            | Self::MoveWordRight
            | Self::MoveDocStart
            | Self::MoveDocEnd
            | Self::PageDown
            | Self::PageUp
            | Self::Recenter
            | Self::ExchangeDotAndMark => Category::Movement,
            Self::SetMark => Category::SetMark,
            Self::KillWord
            | Self::BackwardKillWord
            | Self::DeleteChar
            | Self::KillLine
            | Self::Yank
            | Self::YankPop
            | Self::Cut
            | Self::Copy
            | Self::PopToMark
            | Self::RemoveWhitespace
            | Self::CancelMark => Category::Other,
        }
    }

    /// The configuration name, e.g. `kill-line`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveDown => "move-down",
            Self::MoveUp => "move-up",
            Self::MoveLineStart => "move-line-start",
            Self::MoveLineEnd => "move-line-end",
            Self::MoveLeft => "move-left",
            Self::MoveRight => "move-right",
            Self::MoveWordLeft => "move-word-left",
            Self::MoveWordRight => "move-word-right",
            Self::MoveDocStart => "move-doc-start",
            Self::MoveDocEnd => "move-doc-end",
            Self::PageDown => "page-down",
            Self::PageUp => "page-up",
            Self::Recenter => "recenter",
            Self::ExchangeDotAndMark => "exchange-dot-and-mark",
            Self::SetMark => "set-mark",
            Self::KillWord => "kill-word",
            Self::BackwardKillWord => "backward-kill-word",
            Self::DeleteChar => "delete-char",
            Self::KillLine => "kill-line",
            Self::Yank => "yank",
            Self::YankPop => "yank-pop",
            Self::Cut => "cut",
            Self::Copy => "copy",
            Self::PopToMark => "pop-to-mark",
            Self::RemoveWhitespace => "remove-whitespace",
            Self::CancelMark => "cancel-mark",
        }
    }

    /// Resolve a configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Default bindings
// ---------------------------------------------------------------------------

const fn chord(code: KeyCode, modifiers: Modifiers) -> KeyChord {
    KeyChord::new(code, modifiers)
}

const CTRL_SHIFT: Modifiers = Modifiers::CTRL.union(Modifiers::SHIFT);
const ALT_SHIFT: Modifiers = Modifiers::ALT.union(Modifiers::SHIFT);

/// The Emacs bindings. Multi-chord Emacs sequences are replaced by
/// single-chord stand-ins: `C-S-m` for `C-x C-x`, `C-m` for `C-u C-SPC`,
/// `C-S-@` for the terminal spelling of `C-SPC`.
pub const DEFAULT_BINDINGS: &[(Command, KeyChord)] = &[
    (Command::MoveDown, KeyChord::ctrl('n')),
    (Command::MoveUp, KeyChord::ctrl('p')),
    (Command::MoveLineStart, KeyChord::ctrl('a')),
    (Command::MoveLineEnd, KeyChord::ctrl('e')),
    (Command::MoveLeft, KeyChord::ctrl('b')),
    (Command::MoveRight, KeyChord::ctrl('f')),
    (Command::MoveWordLeft, KeyChord::alt('b')),
    (Command::MoveWordRight, KeyChord::alt('f')),
    (Command::MoveDocStart, chord(KeyCode::Char('<'), ALT_SHIFT)),
    (Command::MoveDocEnd, chord(KeyCode::Char('>'), ALT_SHIFT)),
    (Command::PageDown, KeyChord::ctrl('v')),
    (Command::PageUp, KeyChord::alt('v')),
    (Command::Recenter, KeyChord::ctrl('j')),
    (Command::ExchangeDotAndMark, chord(KeyCode::Char('m'), CTRL_SHIFT)),
    (Command::SetMark, KeyChord::ctrl(' ')),
    (Command::SetMark, chord(KeyCode::Char('@'), CTRL_SHIFT)),
    (Command::KillWord, KeyChord::alt('d')),
    (Command::BackwardKillWord, chord(KeyCode::Backspace, Modifiers::CTRL)),
    (Command::DeleteChar, KeyChord::ctrl('d')),
    (Command::KillLine, KeyChord::ctrl('k')),
    (Command::Yank, KeyChord::ctrl('y')),
    (Command::YankPop, KeyChord::alt('y')),
    (Command::Cut, KeyChord::ctrl('w')),
    (Command::Copy, KeyChord::alt('w')),
    (Command::PopToMark, KeyChord::ctrl('m')),
    (Command::RemoveWhitespace, KeyChord::alt(' ')),
    (Command::CancelMark, KeyChord::ctrl('g')),
];

// ---------------------------------------------------------------------------
// Keymap
// ---------------------------------------------------------------------------

/// Chord → command table.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    by_chord: HashMap<KeyChord, Command>,
    by_command: HashMap<Command, Vec<KeyChord>>,
}

impl Keymap {
    /// The default Emacs table.
    #[must_use]
    pub fn emacs() -> Self {
        Self::from_bindings(DEFAULT_BINDINGS.iter().copied())
    }

    /// Build from `(command, chord)` pairs.
    ///
    /// A chord listed twice is a programmer error: it asserts in debug
    /// builds and keeps the first binding in release builds.
    #[must_use]
    pub fn from_bindings(bindings: impl IntoIterator<Item = (Command, KeyChord)>) -> Self {
        let mut keymap = Self::default();
        for (command, chord) in bindings {
            keymap.bind(command, chord);
        }
        keymap
    }

    /// The default table with the chords of some commands replaced.
    ///
    /// Each override replaces *all* default chords of its command.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ConflictingBinding`] if two commands end up sharing a
    /// chord.
    pub fn with_overrides(overrides: &[(Command, Vec<KeyChord>)]) -> Result<Self, ConfigError> {
        let defaults = DEFAULT_BINDINGS
            .iter()
            .copied()
            .filter(|(command, _)| !overrides.iter().any(|(c, _)| c == command));
        let replacements = overrides
            .iter()
            .flat_map(|(command, chords)| chords.iter().map(|&chord| (*command, chord)));

        let mut seen: HashMap<KeyChord, Command> = HashMap::new();
        let mut table = Vec::new();
        for (command, chord) in defaults.chain(replacements) {
            match seen.get(&chord) {
                Some(&first) if first == command => {}
                Some(&first) => {
                    return Err(ConfigError::ConflictingBinding {
                        chord,
                        first: first.name().to_string(),
                        second: command.name().to_string(),
                    });
                }
                None => {
                    seen.insert(chord, command);
                    table.push((command, chord));
                }
            }
        }

        Ok(Self::from_bindings(table))
    }

    fn bind(&mut self, command: Command, chord: KeyChord) {
        debug_assert!(
            !self.by_chord.contains_key(&chord),
            "{chord} bound twice ({command})"
        );
        if let Some(existing) = self.by_chord.get(&chord) {
            tracing::error!(%chord, %existing, ignored = %command, "duplicate key binding");
            return;
        }
        self.by_chord.insert(chord, command);
        self.by_command.entry(command).or_default().push(chord);
    }

    /// The command bound to `chord`.
    #[must_use]
    pub fn lookup(&self, chord: KeyChord) -> Option<Command> {
        self.by_chord.get(&chord).copied()
    }

    /// The category of the command bound to `chord`, `None` when unbound.
    #[must_use]
    pub fn classify(&self, chord: KeyChord) -> Option<Category> {
        self.lookup(chord).map(Command::category)
    }

    /// Whether the host should route `chord` to the key layer ahead of its
    /// own shortcuts. Escape is never captured.
    #[must_use]
    pub fn wants_capture(&self, chord: KeyChord) -> bool {
        !chord.is_escape() && self.by_chord.contains_key(&chord)
    }

    /// All chords bound to `command`, in binding order.
    ///
    /// Asking for a command with no chord is a programmer error: it asserts
    /// in debug builds and yields an empty slice in release builds.
    #[must_use]
    pub fn bindings_for(&self, command: Command) -> &[KeyChord] {
        let chords = self.by_command.get(&command).map_or(&[][..], Vec::as_slice);
        debug_assert!(!chords.is_empty(), "{command} has no key binding");
        if chords.is_empty() {
            tracing::error!(%command, "no key binding");
        }
        chords
    }

    /// Number of bound chords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_chord.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_chord.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(notation: &str) -> KeyChord {
        notation.parse().unwrap()
    }

    // -- Defaults -----------------------------------------------------------

    #[test]
    fn every_command_has_a_default_chord() {
        let keymap = Keymap::emacs();
        for command in Command::ALL {
            assert!(!keymap.bindings_for(command).is_empty(), "{command}");
        }
        assert_eq!(keymap.len(), DEFAULT_BINDINGS.len());
    }

    #[test]
    fn default_table_matches_notation() {
        let keymap = Keymap::emacs();
        let cases = [
            ("C-k", Command::KillLine),
            ("M-w", Command::Copy),
            ("M-S-<", Command::MoveDocStart),
            ("M-S->", Command::MoveDocEnd),
            ("C-SPC", Command::SetMark),
            ("C-S-@", Command::SetMark),
            ("C-<backspace>", Command::BackwardKillWord),
            ("C-S-m", Command::ExchangeDotAndMark),
            ("M-SPC", Command::RemoveWhitespace),
            ("C-v", Command::PageDown),
            ("M-v", Command::PageUp),
        ];
        for (notation, command) in cases {
            assert_eq!(keymap.lookup(key(notation)), Some(command), "{notation}");
        }
    }

    #[test]
    fn set_mark_has_two_chords() {
        let keymap = Keymap::emacs();
        assert_eq!(
            keymap.bindings_for(Command::SetMark),
            &[key("C-SPC"), key("C-S-@")]
        );
    }

    // -- Matching -----------------------------------------------------------

    #[test]
    fn modifier_set_must_match_exactly() {
        let keymap = Keymap::emacs();
        assert_eq!(keymap.lookup(key("C-M-k")), None);
        assert_eq!(keymap.lookup(key("k")), None);
        assert_eq!(keymap.lookup(key("C-m")), Some(Command::PopToMark));
        assert_eq!(keymap.lookup(key("C-M")), Some(Command::ExchangeDotAndMark));
    }

    #[test]
    fn classify_by_category() {
        let keymap = Keymap::emacs();
        assert_eq!(keymap.classify(key("C-f")), Some(Category::Movement));
        assert_eq!(keymap.classify(key("C-S-m")), Some(Category::Movement));
        assert_eq!(keymap.classify(key("C-j")), Some(Category::Movement));
        assert_eq!(keymap.classify(key("C-SPC")), Some(Category::SetMark));
        assert_eq!(keymap.classify(key("C-w")), Some(Category::Other));
        assert_eq!(keymap.classify(key("C-g")), Some(Category::Other));
        assert_eq!(keymap.classify(key("x")), None);
    }

    #[test]
    fn capture_only_bound_keys_never_escape() {
        let keymap = Keymap::from_bindings([
            (Command::CancelMark, key("ESC")),
            (Command::Yank, key("C-y")),
        ]);
        assert!(keymap.wants_capture(key("C-y")));
        assert!(!keymap.wants_capture(key("ESC")));
        assert!(!keymap.wants_capture(key("C-q")));
        assert_eq!(keymap.lookup(key("ESC")), Some(Command::CancelMark));
    }

    // -- Overrides ----------------------------------------------------------

    #[test]
    fn override_replaces_all_chords_of_command() {
        let keymap =
            Keymap::with_overrides(&[(Command::SetMark, vec![key("C-@")])]).unwrap();
        assert_eq!(keymap.lookup(key("C-SPC")), None);
        assert_eq!(keymap.lookup(key("C-@")), Some(Command::SetMark));
        assert_eq!(keymap.lookup(key("C-k")), Some(Command::KillLine));
    }

    #[test]
    fn override_can_swap_chords_between_commands() {
        let keymap = Keymap::with_overrides(&[
            (Command::PageDown, vec![key("M-v")]),
            (Command::PageUp, vec![key("C-v")]),
        ])
        .unwrap();
        assert_eq!(keymap.lookup(key("C-v")), Some(Command::PageUp));
        assert_eq!(keymap.lookup(key("M-v")), Some(Command::PageDown));
    }

    #[test]
    fn override_conflict_is_an_error() {
        let err = Keymap::with_overrides(&[(Command::Yank, vec![key("C-k")])]).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingBinding { .. }));
        assert_eq!(err.to_string(), "C-k is bound to both `kill-line` and `yank`");
    }

    // -- Names --------------------------------------------------------------

    #[test]
    fn names_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_name(command.name()), Some(command));
        }
        assert_eq!(Command::from_name("self-destruct"), None);
        assert_eq!(Command::ExchangeDotAndMark.to_string(), "exchange-dot-and-mark");
    }
}
