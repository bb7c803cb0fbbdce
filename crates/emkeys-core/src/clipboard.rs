//! Clipboard boundary.
//!
//! Kills and copies publish their text here so other applications can
//! paste it, and yank reads it back before consulting the kill ring.

use parking_lot::Mutex;

/// A plain-text clipboard shared by every view.
pub trait Clipboard: Send + Sync {
    /// Current clipboard text. Empty when there is none.
    fn text(&self) -> String;

    fn set_text(&self, text: &str);
}

/// In-process clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<String>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn text(&self) -> String {
        self.text.lock().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }
}

/// The desktop clipboard via `arboard`.
///
/// Each call opens a fresh handle. Failures are logged and read as empty.
#[cfg(feature = "system-clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn text(&self) -> String {
        match arboard::Clipboard::new().and_then(|mut c| c.get_text()) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(%err, "cannot read system clipboard");
                String::new()
            }
        }
    }

    fn set_text(&self, text: &str) {
        if let Err(err) = arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
            tracing::warn!(%err, "cannot write system clipboard");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_round_trip() {
        let clip = MemoryClipboard::new();
        assert_eq!(clip.text(), "");
        clip.set_text("hello");
        assert_eq!(clip.text(), "hello");
        clip.set_text("");
        assert_eq!(clip.text(), "");
    }
}
