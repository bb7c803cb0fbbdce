//! Error types.
//!
//! [`CommandError`] is a soft failure of one editing command. It never
//! escapes the dispatcher: it becomes a single [`Host::alert`] call.
//! [`ConfigError`] covers loading configuration and runtime option
//! directives.
//!
//! [`Host::alert`]: crate::host::Host::alert

use std::io;
use std::path::PathBuf;

use emkeys_input::{KeyChord, KeyParseError};
use thiserror::Error;

use crate::surface::SurfaceError;

/// Why a command did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no mark set in this view")]
    NoMark,
    #[error("nothing to kill")]
    NothingToKill,
    #[error("the region is not active")]
    NoSelection,
    #[error("previous command was not a yank")]
    StaleYank,
    #[error("kill ring is empty")]
    EmptyKillRing,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Configuration or option errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("bad key for `{command}`: {source}")]
    BadChord {
        command: String,
        #[source]
        source: KeyParseError,
    },
    #[error("{chord} is bound to both `{first}` and `{second}`")]
    ConflictingBinding {
        chord: KeyChord,
        first: String,
        second: String,
    },
    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("invalid value for {option}: {value}")]
    InvalidValue { option: String, value: String },
}
