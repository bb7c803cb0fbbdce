//! Word motions for the reference text view.
//!
//! | Function | Emacs key | Lands on |
//! |----------|-----------|----------|
//! | [`next_word_start`] | `M-f` | start of the next word, or end of text |
//! | [`previous_word_start`] | `M-b` | start of the previous word, or start of text |
//!
//! A word is a run of word characters (letters, digits, underscore) or a
//! run of punctuation. Boundaries exist between classes, so `hello.world`
//! holds three words. Blanks and line breaks separate words and are never
//! part of one.
//!
//! Unlike Vim's `w`, running out of words is not a reason to stay put: the
//! forward motion lands on the end of the text, which is what lets `M-d`
//! kill the trailing blanks after the last word.

use crate::buffer::Buffer;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters.
    Punctuation,
    /// Whitespace within a line.
    Blank,
    /// Line ending.
    Newline,
}

pub(crate) fn classify(ch: char) -> CharClass {
    if ch == '\n' || ch == '\r' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// True for whitespace that does not end a line (space, tab, ...).
#[inline]
#[must_use]
pub fn is_blank(ch: char) -> bool {
    classify(ch) == CharClass::Blank
}

fn is_word_part(ch: char) -> bool {
    matches!(classify(ch), CharClass::Word | CharClass::Punctuation)
}

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// Offset of the start of the next word after `offset`.
///
/// 1. Skip the current token (same-class chars).
/// 2. Skip blanks and line breaks.
///
/// Returns the end of the text when no word follows.
#[must_use]
pub fn next_word_start(buf: &Buffer, offset: usize) -> usize {
    let rope = buf.rope();
    let total = rope.len_chars();
    if offset >= total {
        return total;
    }

    let mut idx = offset;
    let start_class = classify(rope.char(idx));
    if matches!(start_class, CharClass::Word | CharClass::Punctuation) {
        while idx < total && classify(rope.char(idx)) == start_class {
            idx += 1;
        }
    }

    while idx < total && !is_word_part(rope.char(idx)) {
        idx += 1;
    }

    idx
}

/// Offset of the start of the word before `offset`.
///
/// 1. Step back over blanks and line breaks.
/// 2. Step back through the token to its first char.
///
/// Returns 0 when no word precedes.
#[must_use]
pub fn previous_word_start(buf: &Buffer, offset: usize) -> usize {
    let rope = buf.rope();
    let mut idx = offset.min(rope.len_chars());

    while idx > 0 && !is_word_part(rope.char(idx - 1)) {
        idx -= 1;
    }
    if idx == 0 {
        return 0;
    }

    let word_class = classify(rope.char(idx - 1));
    while idx > 0 && classify(rope.char(idx - 1)) == word_class {
        idx -= 1;
    }

    idx
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(text: &str) -> Buffer {
        Buffer::from_text(text)
    }

    // -- classify -----------------------------------------------------------

    #[test]
    fn classify_chars() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('_'), CharClass::Word);
        assert_eq!(classify('é'), CharClass::Word);
        assert_eq!(classify('.'), CharClass::Punctuation);
        assert_eq!(classify(' '), CharClass::Blank);
        assert_eq!(classify('\t'), CharClass::Blank);
        assert_eq!(classify('\n'), CharClass::Newline);
    }

    #[test]
    fn blank_excludes_line_breaks() {
        assert!(is_blank(' '));
        assert!(is_blank('\t'));
        assert!(!is_blank('\n'));
        assert!(!is_blank('x'));
    }

    // -- next_word_start ----------------------------------------------------

    #[test]
    fn next_from_word_start() {
        assert_eq!(next_word_start(&buf("hello world"), 0), 6);
    }

    #[test]
    fn next_from_middle_of_word() {
        assert_eq!(next_word_start(&buf("hello world"), 2), 6);
    }

    #[test]
    fn next_from_inside_blanks() {
        assert_eq!(next_word_start(&buf("foo   bar"), 4), 6);
    }

    #[test]
    fn next_stops_at_punctuation() {
        let b = buf("x=y+z");
        assert_eq!(next_word_start(&b, 0), 1);
        assert_eq!(next_word_start(&b, 1), 2);
    }

    #[test]
    fn next_crosses_lines() {
        assert_eq!(next_word_start(&buf("hello\n\n  world"), 0), 9);
    }

    #[test]
    fn next_past_last_word_reaches_end() {
        assert_eq!(next_word_start(&buf("hello world"), 6), 11);
        assert_eq!(next_word_start(&buf("hello   "), 0), 8);
        assert_eq!(next_word_start(&buf("hello"), 5), 5);
    }

    // -- previous_word_start ------------------------------------------------

    #[test]
    fn previous_from_word_end() {
        assert_eq!(previous_word_start(&buf("hello world"), 11), 6);
    }

    #[test]
    fn previous_from_word_start() {
        assert_eq!(previous_word_start(&buf("hello world"), 6), 0);
    }

    #[test]
    fn previous_skips_blanks_and_lines() {
        assert_eq!(previous_word_start(&buf("one\n\n   two"), 8), 0);
    }

    #[test]
    fn previous_stops_at_punctuation() {
        assert_eq!(previous_word_start(&buf("foo.bar"), 4), 3);
    }

    #[test]
    fn previous_at_start_stays() {
        assert_eq!(previous_word_start(&buf("   hello"), 2), 0);
        assert_eq!(previous_word_start(&buf("hello"), 0), 0);
    }
}
