//! # emkeys-core — Emacs key command layer
//!
//! Turns key chords into editing commands against a host-provided text
//! surface:
//!
//! - **[`keymap`]** — `Command`, its category, and the chord → command table
//! - **[`dispatch`]** — `Dispatcher`: one per view, runs commands and owns
//!   the region state machine
//! - **[`mark`]** — `MarkRing`, the bounded history of saved positions
//! - **[`kill_ring`]** — `KillRing`, killed text shared across views
//! - **[`clipboard`]** — the clipboard boundary
//! - **[`session`]** — `Session`: open views plus the on/off switch
//! - **[`surface`]** — the `TextSurface` trait commands are written against
//! - **[`text_view`]** — `TextView`, a rope-backed reference surface
//! - **[`config`]** / **[`options`]** — TOML configuration and `set` directives
//!
//! ```
//! use emkeys_core::{Dispatcher, Shared, TextView, ViewId};
//! use emkeys_input::parse_sequence;
//!
//! let mut view = TextView::from_text("hello world");
//! let mut dispatcher = Dispatcher::new(ViewId::new(1), Shared::default());
//! for chord in parse_sequence("C-SPC M-f C-w").unwrap() {
//!     dispatcher.handle_key(&mut view, chord.into());
//! }
//! assert_eq!(view.text(), "world");
//! ```

pub mod buffer;
pub mod clipboard;
pub mod config;
pub mod dispatch;
pub mod edit_log;
pub mod error;
pub mod host;
pub mod keymap;
pub mod kill_ring;
pub mod mark;
pub mod options;
pub mod session;
pub mod surface;
pub mod text_view;
pub mod word;

pub use clipboard::{Clipboard, MemoryClipboard};
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use config::Config;
pub use dispatch::{Dispatcher, EventResult, RegionState, Shared};
pub use error::{CommandError, ConfigError};
pub use host::{DisplaySettings, Host, NullHost, ViewId};
pub use keymap::{Category, Command, Keymap};
pub use kill_ring::{KillRing, SharedKillRing};
pub use mark::{Mark, MarkRing};
pub use session::Session;
pub use surface::{MoveMode, MoveOp, SurfaceError, TextRange, TextSurface};
pub use text_view::TextView;
