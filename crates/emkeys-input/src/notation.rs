// SPDX-License-Identifier: MIT
//
// Emacs key notation.
//
// Reads and writes the `kbd` spelling of chords:
//
//   C-k           Ctrl+k
//   M-w           Alt(Meta)+w
//   M-S-<         Alt+Shift+<
//   C-SPC         Ctrl+Space
//   C-<backspace> Ctrl+Backspace
//   s-a           Super+a
//
// A sequence is whitespace-separated chords: "C-SPC C-f C-f C-w".
//
// Named keys: SPC RET TAB ESC DEL, and the angle-bracket forms <up>
// <down> <left> <right> <home> <end> <prior> <next> <insert> <delete>
// <backspace> <f1>..<f35>. Bare `f1`..`f35` are accepted too.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::key::{KeyChord, KeyCode, Modifiers};

/// Error produced when a key description cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key description")]
    Empty,
    #[error("unknown key name `{0}`")]
    UnknownKey(String),
    #[error("modifier `{modifier}-` repeated in `{token}`")]
    DuplicateModifier { modifier: char, token: String },
}

/// Parse a whitespace-separated chord sequence.
///
/// # Errors
///
/// Returns the first chord's parse error, or [`KeyParseError::Empty`] if the
/// description contains no chords.
pub fn parse_sequence(desc: &str) -> Result<Vec<KeyChord>, KeyParseError> {
    let chords = desc
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<KeyChord>, _>>()?;
    if chords.is_empty() {
        return Err(KeyParseError::Empty);
    }
    Ok(chords)
}

/// Format a chord sequence as space-separated notation.
#[must_use]
pub fn format_sequence(chords: &[KeyChord]) -> String {
    chords
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for KeyChord {
    type Err = KeyParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let mut modifiers = Modifiers::empty();
        let mut rest = token;

        // A prefix is one modifier letter followed by `-` with something
        // after it, so a lone "-" or "C--" (Ctrl+minus) still parses.
        while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
            let letter = rest.as_bytes()[0] as char;
            let flag = match letter {
                'C' => Modifiers::CTRL,
                'M' => Modifiers::ALT,
                'S' => Modifiers::SHIFT,
                's' => Modifiers::SUPER,
                _ => break,
            };
            if modifiers.contains(flag) {
                return Err(KeyParseError::DuplicateModifier {
                    modifier: letter,
                    token: token.to_string(),
                });
            }
            modifiers |= flag;
            rest = &rest[2..];
        }

        let code = parse_key_name(rest)?;
        Ok(Self::new(code, modifiers))
    }
}

fn parse_key_name(name: &str) -> Result<KeyCode, KeyParseError> {
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(ch));
    }

    let bare = name
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(name);

    let code = match bare {
        "SPC" | "space" => KeyCode::Char(' '),
        "RET" | "return" => KeyCode::Enter,
        "TAB" | "tab" => KeyCode::Tab,
        "ESC" | "escape" => KeyCode::Escape,
        "DEL" | "backspace" => KeyCode::Backspace,
        "delete" | "deletechar" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "prior" => KeyCode::PageUp,
        "next" => KeyCode::PageDown,
        other => parse_function_key(other)
            .ok_or_else(|| KeyParseError::UnknownKey(name.to_string()))?,
    };
    Ok(code)
}

fn parse_function_key(name: &str) -> Option<KeyCode> {
    let n: u8 = name.strip_prefix('f')?.parse().ok()?;
    (1..=35).contains(&n).then_some(KeyCode::F(n))
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = self.modifiers();
        if mods.contains(Modifiers::CTRL) {
            f.write_str("C-")?;
        }
        if mods.contains(Modifiers::ALT) {
            f.write_str("M-")?;
        }
        if mods.contains(Modifiers::SHIFT) {
            f.write_str("S-")?;
        }
        if mods.contains(Modifiers::SUPER) {
            f.write_str("s-")?;
        }
        match self.code() {
            KeyCode::Char(' ') => f.write_str("SPC"),
            KeyCode::Char(ch) => write!(f, "{ch}"),
            KeyCode::Enter => f.write_str("RET"),
            KeyCode::Tab => f.write_str("TAB"),
            KeyCode::Escape => f.write_str("ESC"),
            KeyCode::Backspace => f.write_str("<backspace>"),
            KeyCode::Delete => f.write_str("<delete>"),
            KeyCode::Insert => f.write_str("<insert>"),
            KeyCode::Up => f.write_str("<up>"),
            KeyCode::Down => f.write_str("<down>"),
            KeyCode::Left => f.write_str("<left>"),
            KeyCode::Right => f.write_str("<right>"),
            KeyCode::Home => f.write_str("<home>"),
            KeyCode::End => f.write_str("<end>"),
            KeyCode::PageUp => f.write_str("<prior>"),
            KeyCode::PageDown => f.write_str("<next>"),
            KeyCode::F(n) => write!(f, "<f{n}>"),
            KeyCode::Modifier(key) => write!(f, "<{key:?}>"),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chord(s: &str) -> KeyChord {
        s.parse().unwrap()
    }

    // ── Parsing ─────────────────────────────────────────────────────────

    #[test]
    fn plain_char() {
        assert_eq!(chord("a"), KeyChord::plain(KeyCode::Char('a')));
    }

    #[test]
    fn ctrl_and_meta() {
        assert_eq!(chord("C-k"), KeyChord::ctrl('k'));
        assert_eq!(chord("M-w"), KeyChord::alt('w'));
    }

    #[test]
    fn combined_modifiers_any_order() {
        let expected = KeyChord::new(KeyCode::Char('<'), Modifiers::ALT | Modifiers::SHIFT);
        assert_eq!(chord("M-S-<"), expected);
        assert_eq!(chord("S-M-<"), expected);
    }

    #[test]
    fn space_names() {
        assert_eq!(
            chord("C-SPC"),
            KeyChord::new(KeyCode::Char(' '), Modifiers::CTRL)
        );
        assert_eq!(chord("M-<space>"), KeyChord::alt(' '));
    }

    #[test]
    fn angle_bracket_names() {
        assert_eq!(
            chord("C-<backspace>"),
            KeyChord::new(KeyCode::Backspace, Modifiers::CTRL)
        );
        assert_eq!(chord("<prior>"), KeyChord::plain(KeyCode::PageUp));
        assert_eq!(chord("<f12>"), KeyChord::plain(KeyCode::F(12)));
        assert_eq!(chord("f3"), KeyChord::plain(KeyCode::F(3)));
    }

    #[test]
    fn uppercase_letter_means_shift() {
        assert_eq!(chord("C-M"), chord("C-S-m"));
    }

    #[test]
    fn minus_key() {
        assert_eq!(chord("-"), KeyChord::plain(KeyCode::Char('-')));
        assert_eq!(chord("C--"), KeyChord::ctrl('-'));
    }

    #[test]
    fn lone_modifier_letter_is_a_char() {
        assert_eq!(chord("C"), KeyChord::new(KeyCode::Char('c'), Modifiers::SHIFT));
    }

    #[test]
    fn errors() {
        assert_eq!("".parse::<KeyChord>(), Err(KeyParseError::Empty));
        assert_eq!(
            "C-bogus".parse::<KeyChord>(),
            Err(KeyParseError::UnknownKey("bogus".into()))
        );
        assert_eq!(
            "<f36>".parse::<KeyChord>(),
            Err(KeyParseError::UnknownKey("<f36>".into()))
        );
        assert!(matches!(
            "C-C-a".parse::<KeyChord>(),
            Err(KeyParseError::DuplicateModifier { modifier: 'C', .. })
        ));
    }

    #[test]
    fn sequence() {
        let seq = parse_sequence("C-SPC  C-f\tC-w").unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[1], KeyChord::ctrl('f'));
        assert_eq!(parse_sequence("   "), Err(KeyParseError::Empty));
        assert!(parse_sequence("C-f nope!").is_err());
    }

    // ── Formatting ──────────────────────────────────────────────────────

    #[test]
    fn display_is_canonical() {
        assert_eq!(chord("S-M-<").to_string(), "M-S-<");
        assert_eq!(chord("C-M").to_string(), "C-S-m");
        assert_eq!(chord("C-SPC").to_string(), "C-SPC");
        assert_eq!(chord("C-DEL").to_string(), "C-<backspace>");
        assert_eq!(chord("<next>").to_string(), "<next>");
    }

    #[test]
    fn format_sequence_joins_with_spaces() {
        let seq = parse_sequence("C-a M-f C-k").unwrap();
        assert_eq!(format_sequence(&seq), "C-a M-f C-k");
    }

    #[test]
    fn debug_uses_notation() {
        assert_eq!(format!("{:?}", KeyChord::ctrl('y')), "KeyChord(C-y)");
    }
}
