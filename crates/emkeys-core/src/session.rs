//! Session — every open view plus the on/off switch for the key layer.
//!
//! A [`Session`] owns the views of one editor instance. Each view is a
//! surface paired with its own [`Dispatcher`]; all of them share one
//! keymap, kill ring, clipboard and host.
//!
//! While the layer is enabled, every surface runs with line wrap off. The
//! surface's own read-only and line-wrap settings are remembered when the
//! layer takes it over and put back when the layer is switched off.

use std::collections::HashMap;

use emkeys_input::{KeyChord, KeyEvent};
use tracing::{debug, info};

use crate::config::Config;
use crate::dispatch::{Dispatcher, EventResult, Shared};
use crate::error::ConfigError;
use crate::host::{DisplaySettings, ViewId};
use crate::options::{self, OptionName, SetDirective};
use crate::surface::TextSurface;

/// Display settings a surface had before the layer took it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SavedDisplay {
    read_only: bool,
    line_wrap: bool,
}

#[derive(Debug)]
struct View<S> {
    surface: S,
    dispatcher: Dispatcher,
    saved: Option<SavedDisplay>,
}

impl<S: DisplaySettings> View<S> {
    fn take_over(&mut self) {
        if self.saved.is_some() {
            return;
        }
        self.saved = Some(SavedDisplay {
            read_only: self.surface.is_read_only(),
            line_wrap: self.surface.line_wrap(),
        });
        self.surface.set_line_wrap(false);
    }

    fn restore(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.surface.set_read_only(saved.read_only);
            self.surface.set_line_wrap(saved.line_wrap);
        }
        self.surface.set_overwrite_mode(false);
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Session<S> {
    config: Config,
    shared: Shared,
    enabled: bool,
    views: HashMap<ViewId, View<S>>,
    next_id: u64,
}

impl<S: TextSurface + DisplaySettings> Session<S> {
    /// A session with services built from `config`.
    ///
    /// # Errors
    ///
    /// Whatever [`Config::keymap`] rejects.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let shared = Shared::from_config(&config)?;
        Ok(Self::with_shared(config, shared))
    }

    /// A session using caller-provided services.
    #[must_use]
    pub fn with_shared(config: Config, shared: Shared) -> Self {
        Self {
            enabled: config.enabled,
            config,
            shared,
            views: HashMap::new(),
            next_id: 1,
        }
    }

    // -- Views --------------------------------------------------------------

    /// Start managing `surface`.
    pub fn open_view(&mut self, surface: S) -> ViewId {
        let id = ViewId::new(self.next_id);
        self.next_id += 1;

        let mut dispatcher = Dispatcher::with_config(id, self.shared.clone(), &self.config);
        dispatcher.set_enabled(self.enabled);
        let mut view = View {
            surface,
            dispatcher,
            saved: None,
        };
        if self.enabled {
            view.take_over();
        }

        debug!(view = %id, "opened");
        self.views.insert(id, view);
        id
    }

    /// Stop managing a view and hand its surface back with its display
    /// settings restored. Its mark ring is discarded.
    pub fn close_view(&mut self, id: ViewId) -> Option<S> {
        let mut view = self.views.remove(&id)?;
        view.restore();
        debug!(view = %id, "closed");
        Some(view.surface)
    }

    #[must_use]
    pub fn surface(&self, id: ViewId) -> Option<&S> {
        self.views.get(&id).map(|view| &view.surface)
    }

    pub fn surface_mut(&mut self, id: ViewId) -> Option<&mut S> {
        self.views.get_mut(&id).map(|view| &mut view.surface)
    }

    #[must_use]
    pub fn dispatcher(&self, id: ViewId) -> Option<&Dispatcher> {
        self.views.get(&id).map(|view| &view.dispatcher)
    }

    /// Open views, in no particular order.
    pub fn views(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.keys().copied()
    }

    #[inline]
    #[must_use]
    pub const fn shared(&self) -> &Shared {
        &self.shared
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // -- Mode ---------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch the key layer on or off for every view.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        for view in self.views.values_mut() {
            if enabled {
                view.take_over();
            } else {
                view.restore();
            }
            view.dispatcher.set_enabled(enabled);
        }
        info!(enabled, views = self.views.len(), "key layer switched");
        self.shared.host.mode_changed(enabled);
    }

    /// Apply `set`-style arguments and return the lines a query produced.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownOption`] for an unrecognized name and
    /// [`ConfigError::InvalidValue`] for a value the option cannot take.
    /// Arguments before the failing one stay applied.
    pub fn apply_option(&mut self, args: &str) -> Result<Vec<String>, ConfigError> {
        let mut output = Vec::new();
        for directive in options::parse_set(args) {
            match directive {
                SetDirective::ShowAll => {
                    output.push(self.show(OptionName::EmacsKeys));
                    output.push(self.show(OptionName::ScrollMargin));
                }
                SetDirective::Query(name) => output.push(self.show(lookup(&name)?)),
                SetDirective::On(name) => self.set_bool(&name, |_| true)?,
                SetDirective::Off(name) => self.set_bool(&name, |_| false)?,
                SetDirective::Toggle(name) => self.set_bool(&name, |current| !current)?,
                SetDirective::Assign(name, value) => self.assign(&name, &value)?,
            }
        }
        Ok(output)
    }

    fn show(&self, option: OptionName) -> String {
        match option {
            OptionName::EmacsKeys => options::format_bool(option.full_name(), self.enabled),
            OptionName::ScrollMargin => {
                format!("{}={}", option.full_name(), self.config.scroll_margin)
            }
        }
    }

    fn set_bool(&mut self, name: &str, value: impl FnOnce(bool) -> bool) -> Result<(), ConfigError> {
        match lookup(name)? {
            OptionName::EmacsKeys => {
                self.set_enabled(value(self.enabled));
                Ok(())
            }
            OptionName::ScrollMargin => Err(ConfigError::InvalidValue {
                option: name.to_string(),
                value: String::new(),
            }),
        }
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            option: name.to_string(),
            value: value.to_string(),
        };
        match lookup(name)? {
            OptionName::ScrollMargin => {
                let lines: usize = value.parse().map_err(|_| invalid())?;
                self.config.scroll_margin = lines;
                for view in self.views.values_mut() {
                    view.dispatcher.set_scroll_margin(lines);
                }
                Ok(())
            }
            OptionName::EmacsKeys => Err(invalid()),
        }
    }

    // -- Keys ---------------------------------------------------------------

    /// Route a key event to the dispatcher of view `id`.
    pub fn handle_key(&mut self, id: ViewId, event: KeyEvent) -> EventResult {
        let Some(view) = self.views.get_mut(&id) else {
            debug!(view = %id, "key for unknown view");
            return EventResult::Unhandled;
        };
        view.dispatcher.handle_key(&mut view.surface, event)
    }

    /// Whether the host should route `chord` here before its own shortcuts.
    #[must_use]
    pub fn wants_capture(&self, chord: KeyChord) -> bool {
        self.enabled && self.shared.keymap.wants_capture(chord)
    }
}

fn lookup(name: &str) -> Result<OptionName, ConfigError> {
    OptionName::lookup(name).ok_or_else(|| ConfigError::UnknownOption(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
