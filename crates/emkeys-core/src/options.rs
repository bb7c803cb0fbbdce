//! Runtime options — the `set` directives.
//!
//! Parses `set`-style arguments. The values live on the
//! [`Session`](crate::session::Session); this module is the parsing layer.
//!
//! | Syntax          | Effect                        |
//! |-----------------|-------------------------------|
//! | `option`        | Enable boolean / show numeric |
//! | `nooption`      | Disable boolean               |
//! | `option!`       | Toggle boolean                |
//! | `option?`       | Query current value           |
//! | `option=N`      | Assign numeric value          |
//! | (empty), `all`  | Show all options              |
//!
//! | Full name      | Abbrev | Type    | Default |
//! |----------------|--------|---------|---------|
//! | `emacskeys`    | `ek`   | bool    | true    |
//! | `scrollmargin` | `sm`   | integer | 6       |

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    On(String),
    Off(String),
    Toggle(String),
    Query(String),
    Assign(String, String),
    ShowAll,
}

/// The option an accepted name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionName {
    EmacsKeys,
    ScrollMargin,
}

impl OptionName {
    /// Resolve a full name or abbreviation.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "emacskeys" | "ek" => Some(Self::EmacsKeys),
            "scrollmargin" | "sm" => Some(Self::ScrollMargin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::EmacsKeys => "emacskeys",
            Self::ScrollMargin => "scrollmargin",
        }
    }

    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::EmacsKeys)
    }
}

/// Parse the full argument string into directives, one per
/// whitespace-separated argument.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowAll];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // `no` only negates a known boolean, so an option whose own name starts
    // with "no" is never split.
    if let Some(name) = arg.strip_prefix("no") {
        if OptionName::lookup(name).is_some_and(OptionName::is_bool) {
            return SetDirective::Off(name.to_string());
        }
    }

    // A bare numeric option name shows its value.
    if OptionName::lookup(arg).is_some_and(|opt| !opt.is_bool()) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_forms() {
        assert_eq!(parse_set_arg("emacskeys"), SetDirective::On("emacskeys".into()));
        assert_eq!(parse_set_arg("noemacskeys"), SetDirective::Off("emacskeys".into()));
        assert_eq!(parse_set_arg("noek"), SetDirective::Off("ek".into()));
        assert_eq!(parse_set_arg("emacskeys!"), SetDirective::Toggle("emacskeys".into()));
        assert_eq!(parse_set_arg("emacskeys?"), SetDirective::Query("emacskeys".into()));
    }

    #[test]
    fn numeric_forms() {
        assert_eq!(
            parse_set_arg("scrollmargin=2"),
            SetDirective::Assign("scrollmargin".into(), "2".into())
        );
        assert_eq!(parse_set_arg("sm"), SetDirective::Query("sm".into()));
    }

    #[test]
    fn no_prefix_on_numeric_is_not_negation() {
        assert_eq!(parse_set_arg("nosm"), SetDirective::On("nosm".into()));
    }

    #[test]
    fn empty_and_all_show_everything() {
        assert_eq!(parse_set("  "), vec![SetDirective::ShowAll]);
        assert_eq!(parse_set("all"), vec![SetDirective::ShowAll]);
    }

    #[test]
    fn multiple_arguments() {
        assert_eq!(
            parse_set("noek sm=3"),
            vec![
                SetDirective::Off("ek".into()),
                SetDirective::Assign("sm".into(), "3".into()),
            ]
        );
    }

    #[test]
    fn lookup_names() {
        assert_eq!(OptionName::lookup("ek"), Some(OptionName::EmacsKeys));
        assert_eq!(OptionName::lookup("scrollmargin"), Some(OptionName::ScrollMargin));
        assert_eq!(OptionName::lookup("number"), None);
        assert_eq!(OptionName::EmacsKeys.full_name(), "emacskeys");
    }

    #[test]
    fn format_bool_on_off() {
        assert_eq!(format_bool("emacskeys", true), "emacskeys");
        assert_eq!(format_bool("emacskeys", false), "noemacskeys");
    }
}
