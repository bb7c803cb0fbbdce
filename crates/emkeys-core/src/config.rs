//! Configuration file.
//!
//! ```toml
//! enabled = true
//! mark-ring-capacity = 16
//! kill-ring-capacity = 60
//! scroll-margin = 6
//!
//! [bindings]
//! set-mark = ["C-SPC", "C-@"]
//! exchange-dot-and-mark = "C-x"
//! ```
//!
//! Every field is optional. A `bindings` entry replaces all default chords
//! of the named command; commands not listed keep theirs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use emkeys_input::KeyChord;
use emkeys_input::KeyParseError;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::keymap::{Command, Keymap};
use crate::kill_ring::KILL_RING_MAX;
use crate::mark::MARK_RING_MAX;

/// Lines of context kept by page-down / page-up.
pub const DEFAULT_SCROLL_MARGIN: usize = 6;

/// One chord or a list of chords in key notation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    One(String),
    Many(Vec<String>),
}

impl KeySpec {
    fn notations(&self) -> &[String] {
        match self {
            Self::One(one) => std::slice::from_ref(one),
            Self::Many(many) => many,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Whether the key layer starts switched on.
    pub enabled: bool,
    pub mark_ring_capacity: usize,
    pub kill_ring_capacity: usize,
    pub scroll_margin: usize,
    /// Command name → chord(s).
    pub bindings: BTreeMap<String, KeySpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            mark_ring_capacity: MARK_RING_MAX,
            kill_ring_capacity: KILL_RING_MAX,
            scroll_margin: DEFAULT_SCROLL_MARGIN,
            bindings: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// Malformed TOML, unknown fields, zero capacities.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// An unreadable file, or anything [`from_toml_str`](Self::from_toml_str)
    /// rejects.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroCapacity`] for an empty mark or kill ring.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mark_ring_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "mark-ring-capacity",
            });
        }
        if self.kill_ring_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "kill-ring-capacity",
            });
        }
        Ok(())
    }

    /// Build the keymap: the defaults with `bindings` applied.
    ///
    /// # Errors
    ///
    /// Unknown command names, unparsable or empty chord lists, and chords
    /// claimed by two commands.
    pub fn keymap(&self) -> Result<Keymap, ConfigError> {
        let mut overrides = Vec::with_capacity(self.bindings.len());
        for (name, spec) in &self.bindings {
            let command =
                Command::from_name(name).ok_or_else(|| ConfigError::UnknownCommand(name.clone()))?;
            let chords = spec
                .notations()
                .iter()
                .map(|notation| notation.parse::<KeyChord>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ConfigError::BadChord {
                    command: name.clone(),
                    source,
                })?;
            if chords.is_empty() {
                return Err(ConfigError::BadChord {
                    command: name.clone(),
                    source: KeyParseError::Empty,
                });
            }
            overrides.push((command, chords));
        }
        Keymap::with_overrides(&overrides)
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

    #[test]
    fn empty_text_gives_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str("scroll-margin = 2\nenabled = false\n").unwrap();
        assert_eq!(config.scroll_margin, 2);
        assert!(!config.enabled);
        assert_eq!(config.mark_ring_capacity, MARK_RING_MAX);
        assert_eq!(config.kill_ring_capacity, KILL_RING_MAX);
    }

    #[test]
    fn bindings_accept_one_or_many() {
        let config = Config::from_toml_str(
            r#"
            [bindings]
            set-mark = ["C-SPC", "C-@"]
            exchange-dot-and-mark = "C-x"
            "#,
        )
        .unwrap();
        let keymap = config.keymap().unwrap();
        assert_eq!(keymap.lookup(key("C-@")), Some(Command::SetMark));
        assert_eq!(keymap.lookup(key("C-S-@")), None);
        assert_eq!(keymap.lookup(key("C-x")), Some(Command::ExchangeDotAndMark));
        assert_eq!(keymap.lookup(key("C-S-m")), None);
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            Config::from_toml_str("colour = \"red\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = Config::from_toml_str("kill-ring-capacity = 0").unwrap_err();
        assert_eq!(err.to_string(), "kill-ring-capacity must be at least 1");
    }

    #[test]
    fn unknown_command_is_rejected() {
        let config = Config::from_toml_str("[bindings]\nfly = \"C-z\"").unwrap();
        assert!(matches!(config.keymap(), Err(ConfigError::UnknownCommand(name)) if name == "fly"));
    }

    #[test]
    fn malformed_chord_is_rejected() {
        let config = Config::from_toml_str("[bindings]\nyank = \"C-nope\"").unwrap();
        assert!(matches!(
            config.keymap(),
            Err(ConfigError::BadChord { command, source: KeyParseError::UnknownKey(_) })
                if command == "yank"
        ));
    }

    #[test]
    fn empty_chord_list_is_rejected() {
        let config = Config::from_toml_str("[bindings]\nyank = []").unwrap();
        assert!(matches!(
            config.keymap(),
            Err(ConfigError::BadChord { source: KeyParseError::Empty, .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load(Path::new("/nonexistent/emkeys.toml")).unwrap_err();
        assert!(err.to_string().starts_with("cannot read /nonexistent/emkeys.toml"));
    }
}
