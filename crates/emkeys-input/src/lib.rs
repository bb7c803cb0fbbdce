// SPDX-License-Identifier: MIT
//
// emkeys-input — key model for the emkeys command layer.
//
// Hosts deliver key presses as a key code plus a modifier set. This crate
// gives those a single normalized shape (`KeyChord`) so that binding
// lookup can be an exact equality test, and it reads and writes the
// Emacs `kbd` notation (`C-k`, `M-S-<`, `C-<backspace>`) used by the
// binding table, the configuration file, and the command-line host.

pub mod key;
pub mod notation;

pub use key::{KeyChord, KeyCode, KeyEvent, KeyEventKind, ModifierKey, Modifiers};
pub use notation::{format_sequence, parse_sequence, KeyParseError};
