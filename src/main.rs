// SPDX-License-Identifier: MIT
//
// emkeys — replay Emacs key sequences against a text buffer.
//
// This is the main binary that wires the two crates together:
//
//   emkeys-input → key chords and `kbd` notation
//   emkeys-core  → keymap, dispatcher, mark ring, kill ring, session
//
// A run loads the text into a `TextView`, opens it in a `Session`, and feeds
// it the chords one by one. Each chord flows through:
//
//   notation → KeyChord → Session::handle_key → Dispatcher → TextView
//
// Chords the layer leaves unhandled are typed into the buffer the way an
// editor would, so `"h i C-a C-k"` both inserts and kills. When the keys are
// done the final text goes to stdout, followed by the cursor, mark and
// clipboard state:
//
//   $ emkeys --text "hello world" C-SPC M-f C-w
//   world
//   cursor 0
//   mark 0 inactive
//   clipboard "hello "

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use emkeys_core::{
    CommandError, Config, DisplaySettings, Host, MoveMode, Session, Shared, TextRange,
    TextSurface, TextView, ViewId,
};
use emkeys_input::{KeyChord, KeyCode, Modifiers, parse_sequence};

/// Environment variable holding the log filter, e.g. `EMKEYS_LOG=debug`.
const LOG_ENV: &str = "EMKEYS_LOG";

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "emkeys", version, about = "Replay Emacs key sequences against a text buffer")]
struct Cli {
    /// Initial buffer text.
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the initial buffer text from a file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Initial cursor offset, in chars.
    #[arg(long, default_value_t = 0)]
    cursor: usize,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Visible lines, for page and recenter commands.
    #[arg(long)]
    height: Option<usize>,

    /// Start read-only.
    #[arg(long)]
    read_only: bool,

    /// `set`-style option arguments applied before replay (e.g. `sm=2`).
    #[arg(long = "set", value_name = "ARGS")]
    set: Vec<String>,

    /// Log at debug level (overridden by EMKEYS_LOG).
    #[arg(short, long)]
    verbose: bool,

    /// Key sequence in Emacs notation, e.g. `C-SPC M-f C-w`.
    #[arg(required = true)]
    keys: Vec<String>,
}

// ─── Host ───────────────────────────────────────────────────────────────────

/// Reports layer notifications as log events.
#[derive(Debug, Default)]
struct LogHost;

impl Host for LogHost {
    fn selection_changed(&self, view: ViewId, ranges: &[TextRange]) {
        debug!(%view, ?ranges, "selection changed");
    }

    fn alert(&self, view: ViewId, error: &CommandError) {
        warn!(%view, "{error}");
    }

    fn mode_changed(&self, enabled: bool) {
        info!(enabled, "mode changed");
    }
}

// ─── Setup ──────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    Config::load(path).with_context(|| format!("loading configuration {}", path.display()))
}

fn load_text(cli: &Cli) -> Result<String> {
    match (&cli.text, &cli.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        (None, None) => Ok(String::new()),
    }
}

fn shared_services(config: &Config) -> Result<Shared> {
    let shared = Shared::from_config(config)
        .context("building keymap")?
        .with_host(Arc::new(LogHost));
    #[cfg(feature = "system-clipboard")]
    let shared = shared.with_clipboard(Arc::new(emkeys_core::SystemClipboard));
    Ok(shared)
}

// ─── Replay ─────────────────────────────────────────────────────────────────

/// Text a chord types when the layer leaves it alone, if any.
fn self_insert(chord: KeyChord) -> Option<String> {
    let mods = chord.modifiers();
    if mods.intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER) {
        return None;
    }
    match chord.code() {
        KeyCode::Char(ch) if mods.contains(Modifiers::SHIFT) => Some(ch.to_uppercase().collect()),
        KeyCode::Char(ch) => Some(ch.to_string()),
        KeyCode::Enter => Some("\n".to_string()),
        KeyCode::Tab => Some("\t".to_string()),
        _ => None,
    }
}

fn replay(session: &mut Session<TextView>, id: ViewId, chords: &[KeyChord]) {
    for &chord in chords {
        if session.handle_key(id, chord.into()).is_handled() {
            continue;
        }
        let Some(surface) = session.surface_mut(id) else {
            return;
        };
        match self_insert(chord) {
            Some(text) => {
                if let Err(err) = surface.insert_text(&text) {
                    warn!(%chord, %err, "cannot insert");
                }
            }
            None => debug!(%chord, "ignored"),
        }
    }
}

fn report(out: &mut impl Write, session: &Session<TextView>, id: ViewId) -> Result<()> {
    let (Some(surface), Some(dispatcher)) = (session.surface(id), session.dispatcher(id)) else {
        bail!("view {id} is gone");
    };

    writeln!(out, "{}", surface.buffer().contents_with_line_endings())?;
    writeln!(out, "cursor {}", surface.position())?;

    let mark = dispatcher.marks().most_recent();
    if mark.valid {
        let state = if mark.active { "active" } else { "inactive" };
        writeln!(out, "mark {} {state}", mark.position)?;
    } else {
        writeln!(out, "mark none")?;
    }
    writeln!(out, "clipboard {:?}", session.shared().clipboard.text())?;
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let chords = parse_sequence(&cli.keys.join(" ")).context("parsing key sequence")?;

    let mut view = TextView::from_text(&load_text(cli)?);
    if let Some(height) = cli.height {
        view = view.with_height(height);
    }
    if cli.cursor > view.len_chars() {
        bail!("cursor {} is past the end of the text ({} chars)", cli.cursor, view.len_chars());
    }
    view.set_position(cli.cursor, MoveMode::Move);
    view.set_read_only(cli.read_only);

    let shared = shared_services(&config)?;
    let mut session = Session::with_shared(config, shared);
    let id = session.open_view(view);

    let mut out = io::stdout().lock();
    for args in &cli.set {
        for line in session.apply_option(args).with_context(|| format!("set {args}"))? {
            writeln!(out, "{line}")?;
        }
    }

    replay(&mut session, id, &chords);
    report(&mut out, &session, id)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str) -> (Session<TextView>, ViewId) {
        let mut session = Session::with_shared(Config::default(), Shared::default());
        let id = session.open_view(TextView::from_text(text));
        (session, id)
    }

    fn play(session: &mut Session<TextView>, id: ViewId, keys: &str) {
        replay(session, id, &parse_sequence(keys).unwrap());
    }

    #[test]
    fn unhandled_printables_are_typed() {
        let (mut session, id) = session("");
        play(&mut session, id, "h S-i SPC RET");
        assert_eq!(session.surface(id).unwrap().text(), "hI \n");
    }

    #[test]
    fn typing_and_killing_mix() {
        let (mut session, id) = session("");
        play(&mut session, id, "a b c C-a C-k x C-y");
        assert_eq!(session.surface(id).unwrap().text(), "xabc");
    }

    #[test]
    fn unbound_control_keys_are_ignored() {
        let (mut session, id) = session("abc");
        play(&mut session, id, "C-q M-x <f5>");
        assert_eq!(session.surface(id).unwrap().text(), "abc");
    }

    #[test]
    fn report_prints_state() {
        let (mut session, id) = session("hello world");
        play(&mut session, id, "C-SPC M-f C-w");
        let mut out = Vec::new();
        report(&mut out, &session, id).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "world\ncursor 0\nmark 0 inactive\nclipboard \"hello \"\n"
        );
    }

    #[test]
    fn report_without_mark() {
        let (session, id) = session("x");
        let mut out = Vec::new();
        report(&mut out, &session, id).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("mark none\n"));
    }

    #[test]
    fn cli_requires_keys() {
        assert!(Cli::try_parse_from(["emkeys", "--text", "abc"]).is_err());
        let cli = Cli::try_parse_from(["emkeys", "--text", "abc", "C-k", "C-y"]).unwrap();
        assert_eq!(cli.keys, vec!["C-k", "C-y"]);
    }
}
