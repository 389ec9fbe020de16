//! Command keyword and display-mode enums.

use std::collections::BTreeSet;
use std::fmt;

/// Dotted field paths suppressed while rendering (`-hide=a,b.c`).
pub type HiddenFields = BTreeSet<String>;

/// The verb of an invocation. `None` means no keyword was typed, which the
/// daemon treats like a create (POST) on the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CommandKind {
    #[default]
    None,
    Add,
    Set,
    Show,
    Del,
}

impl CommandKind {
    /// All keyword-bearing commands, in help order.
    pub const KEYWORDS: [CommandKind; 4] = [
        CommandKind::Add,
        CommandKind::Set,
        CommandKind::Del,
        CommandKind::Show,
    ];

    /// Recognize a command keyword. `delete` is accepted as a spelling of `del`.
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "add" => Some(CommandKind::Add),
            "set" => Some(CommandKind::Set),
            "show" => Some(CommandKind::Show),
            "del" | "delete" => Some(CommandKind::Del),
            _ => None,
        }
    }

    /// Canonical keyword (empty for `None`).
    pub fn keyword(&self) -> &'static str {
        match self {
            CommandKind::None => "",
            CommandKind::Add => "add",
            CommandKind::Set => "set",
            CommandKind::Show => "show",
            CommandKind::Del => "del",
        }
    }

    /// Value of the `help` query parameter for this command.
    pub fn help_param(&self) -> &'static str {
        match self {
            CommandKind::None => "NONE",
            CommandKind::Add => "ADD",
            CommandKind::Set => "SET",
            CommandKind::Show => "SHOW",
            CommandKind::Del => "DEL",
        }
    }

    /// One-line description used in help tables.
    pub fn description(&self) -> String {
        match self {
            CommandKind::None => String::new(),
            CommandKind::Add => "Add entry to a list".to_string(),
            CommandKind::Set => "Set a value".to_string(),
            CommandKind::Del => "Delete entry of a list".to_string(),
            CommandKind::Show => format!(
                "Show entry or list [{}]",
                ShowMode::FLAGS
                    .iter()
                    .map(|mode| mode.flag())
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
        }
    }

    /// Whether the request for this command carries a body.
    pub fn carries_body(&self) -> bool {
        matches!(self, CommandKind::None | CommandKind::Add | CommandKind::Set)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Requested verbosity/format of a `show`, flattened for callers that don't
/// care about the table/structured split of [`View`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowMode {
    #[default]
    Unspecified,
    Normal,
    Brief,
    Verbose,
    Json,
    Yaml,
}

impl ShowMode {
    /// Modes selectable by flag, in help order.
    pub const FLAGS: [ShowMode; 5] = [
        ShowMode::Normal,
        ShowMode::Brief,
        ShowMode::Verbose,
        ShowMode::Json,
        ShowMode::Yaml,
    ];

    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::FLAGS.into_iter().find(|mode| mode.flag() == flag)
    }

    pub fn flag(&self) -> &'static str {
        match self {
            ShowMode::Unspecified => "",
            ShowMode::Normal => "-normal",
            ShowMode::Brief => "-brief",
            ShowMode::Verbose => "-verbose",
            ShowMode::Json => "-json",
            ShowMode::Yaml => "-yaml",
        }
    }

    /// json/yaml dump the body instead of rendering a table.
    pub fn is_structured(&self) -> bool {
        matches!(self, ShowMode::Json | ShowMode::Yaml)
    }
}

/// Detail level of a table rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detail {
    #[default]
    Unspecified,
    Normal,
    Brief,
    Verbose,
}

impl Detail {
    /// Rendering depth budget.
    pub fn depth(&self) -> i32 {
        match self {
            Detail::Unspecified | Detail::Normal => 2,
            Detail::Brief => 1,
            Detail::Verbose => 3,
        }
    }
}

/// How a `show` response is presented.
///
/// Hidden fields only exist on the table variant, so `-hide` together with
/// `-json`/`-yaml` cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Table { detail: Detail, hidden: HiddenFields },
    Json,
    Yaml,
}

impl Default for View {
    fn default() -> Self {
        View::Table {
            detail: Detail::Unspecified,
            hidden: HiddenFields::new(),
        }
    }
}

impl View {
    /// Build a view from the (already validated) mode flag and hide list.
    pub(crate) fn from_parts(mode: ShowMode, hidden: HiddenFields) -> Self {
        let detail = match mode {
            ShowMode::Json => return View::Json,
            ShowMode::Yaml => return View::Yaml,
            ShowMode::Unspecified => Detail::Unspecified,
            ShowMode::Normal => Detail::Normal,
            ShowMode::Brief => Detail::Brief,
            ShowMode::Verbose => Detail::Verbose,
        };
        View::Table { detail, hidden }
    }

    pub fn mode(&self) -> ShowMode {
        match self {
            View::Json => ShowMode::Json,
            View::Yaml => ShowMode::Yaml,
            View::Table { detail, .. } => match detail {
                Detail::Unspecified => ShowMode::Unspecified,
                Detail::Normal => ShowMode::Normal,
                Detail::Brief => ShowMode::Brief,
                Detail::Verbose => ShowMode::Verbose,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for kind in CommandKind::KEYWORDS {
            assert_eq!(CommandKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(CommandKind::from_keyword("delete"), Some(CommandKind::Del));
        assert_eq!(CommandKind::from_keyword(""), None);
    }

    #[test]
    fn test_help_param_is_uppercase_keyword() {
        assert_eq!(CommandKind::None.help_param(), "NONE");
        assert_eq!(CommandKind::Show.help_param(), "SHOW");
        assert_eq!(CommandKind::Del.help_param(), "DEL");
    }

    #[test]
    fn test_show_description_lists_flags() {
        assert_eq!(
            CommandKind::Show.description(),
            "Show entry or list [-normal | -brief | -verbose | -json | -yaml]"
        );
    }

    #[test]
    fn test_show_mode_flags() {
        assert_eq!(ShowMode::from_flag("-brief"), Some(ShowMode::Brief));
        assert_eq!(ShowMode::from_flag("-yaml"), Some(ShowMode::Yaml));
        assert_eq!(ShowMode::from_flag("-hide"), None);
        assert_eq!(ShowMode::from_flag(""), None);
    }

    #[test]
    fn test_view_from_parts() {
        assert_eq!(View::from_parts(ShowMode::Json, HiddenFields::new()), View::Json);
        let hidden: HiddenFields = ["uuid".to_string()].into_iter().collect();
        let view = View::from_parts(ShowMode::Verbose, hidden.clone());
        assert_eq!(
            view,
            View::Table {
                detail: Detail::Verbose,
                hidden
            }
        );
        assert_eq!(view.mode(), ShowMode::Verbose);
    }

    #[test]
    fn test_detail_depths() {
        assert_eq!(Detail::Unspecified.depth(), 2);
        assert_eq!(Detail::Normal.depth(), 2);
        assert_eq!(Detail::Brief.depth(), 1);
        assert_eq!(Detail::Verbose.depth(), 3);
    }
}
