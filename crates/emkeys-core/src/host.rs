//! Host boundary — what the embedding application is told, and what it
//! lets the layer change about a view's display.

use std::fmt;

use parking_lot::Mutex;

use crate::error::CommandError;
use crate::surface::TextRange;

// ---------------------------------------------------------------------------
// ViewId
// ---------------------------------------------------------------------------

/// Identity of one editing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Notifications sent to the embedding application.
///
/// Called synchronously from the dispatching thread. Every method has an
/// empty default body.
pub trait Host: Send + Sync {
    /// The region of `view` changed. An empty slice means "no region".
    fn selection_changed(&self, view: ViewId, ranges: &[TextRange]) {
        let _ = (view, ranges);
    }

    /// A command failed softly. Hosts usually beep.
    fn alert(&self, view: ViewId, error: &CommandError) {
        let _ = (view, error);
    }

    /// The key layer was switched on or off.
    fn mode_changed(&self, enabled: bool) {
        let _ = enabled;
    }
}

/// A host that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {}

/// One recorded [`Host`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    SelectionChanged { view: ViewId, ranges: Vec<TextRange> },
    Alert { view: ViewId, error: CommandError },
    ModeChanged(bool),
}

/// A host that records every call, for tests and scripted runs.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Just the alerts, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<CommandError> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                HostEvent::Alert { error, .. } => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        self.events.lock().push(event);
    }
}

impl Host for RecordingHost {
    fn selection_changed(&self, view: ViewId, ranges: &[TextRange]) {
        self.push(HostEvent::SelectionChanged {
            view,
            ranges: ranges.to_vec(),
        });
    }

    fn alert(&self, view: ViewId, error: &CommandError) {
        self.push(HostEvent::Alert {
            view,
            error: error.clone(),
        });
    }

    fn mode_changed(&self, enabled: bool) {
        self.push(HostEvent::ModeChanged(enabled));
    }
}

// ---------------------------------------------------------------------------
// DisplaySettings
// ---------------------------------------------------------------------------

/// Per-view display state the layer adjusts while it is enabled.
pub trait DisplaySettings {
    fn line_wrap(&self) -> bool;
    fn set_line_wrap(&mut self, wrap: bool);
    fn is_read_only(&self) -> bool;
    fn set_read_only(&mut self, read_only: bool);
    fn set_overwrite_mode(&mut self, overwrite: bool);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recording_host_keeps_order() {
        let host = RecordingHost::new();
        let view = ViewId::new(3);
        host.mode_changed(true);
        host.alert(view, &CommandError::NoMark);
        host.selection_changed(view, &[]);

        assert_eq!(
            host.events(),
            vec![
                HostEvent::ModeChanged(true),
                HostEvent::Alert {
                    view,
                    error: CommandError::NoMark
                },
                HostEvent::SelectionChanged {
                    view,
                    ranges: vec![]
                },
            ]
        );
        assert_eq!(host.alerts(), vec![CommandError::NoMark]);
        assert_eq!(host.take().len(), 3);
        assert!(host.events().is_empty());
    }

    #[test]
    fn view_id_display() {
        assert_eq!(ViewId::new(7).to_string(), "view#7");
        assert_eq!(ViewId::new(7).get(), 7);
    }
}
