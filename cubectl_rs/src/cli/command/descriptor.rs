//! CommandDescriptor - result of compiling the command line.

use std::collections::BTreeMap;

use super::types::{CommandKind, HiddenFields, ShowMode, View};

static NO_HIDDEN_FIELDS: HiddenFields = HiddenFields::new();

/// Verb plus whatever only that verb may carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    None,
    Add,
    Set,
    Show(View),
    Del,
}

impl Action {
    fn from_kind(kind: CommandKind) -> Self {
        match kind {
            CommandKind::None => Action::None,
            CommandKind::Add => Action::Add,
            CommandKind::Set => Action::Set,
            CommandKind::Show => Action::Show(View::default()),
            CommandKind::Del => Action::Del,
        }
    }

    fn kind(&self) -> CommandKind {
        match self {
            Action::None => CommandKind::None,
            Action::Add => CommandKind::Add,
            Action::Set => CommandKind::Set,
            Action::Show(_) => CommandKind::Show,
            Action::Del => CommandKind::Del,
        }
    }
}

/// Canonical, validated representation of one invocation.
///
/// Produced by [`compile`](crate::cli::parser::compile). After that only the
/// alias layer rewrites it, through the crate-private mutators below.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandDescriptor {
    action: Action,
    path: Vec<String>,
    body: BTreeMap<String, String>,
    help: bool,
}

impl CommandDescriptor {
    /// Descriptor of a non-help invocation. `show` starts with the default view.
    pub fn new<I, S>(command: CommandKind, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: Action::from_kind(command),
            path: path.into_iter().map(Into::into).collect(),
            body: BTreeMap::new(),
            help: false,
        }
    }

    /// The bare help request produced by an empty command line.
    pub fn help_request() -> Self {
        Self {
            help: true,
            ..Self::default()
        }
    }

    /// Add (or replace) a body field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Turn the descriptor into a `show` with the given view.
    pub fn with_view(mut self, view: View) -> Self {
        self.action = Action::Show(view);
        self
    }

    /// Mark the descriptor as a help request.
    pub fn with_help(mut self) -> Self {
        self.help = true;
        self
    }

    pub(crate) fn from_parts(
        action: Action,
        path: Vec<String>,
        body: BTreeMap<String, String>,
        help: bool,
    ) -> Self {
        Self {
            action,
            path,
            body,
            help,
        }
    }

    pub fn command(&self) -> CommandKind {
        self.action.kind()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn path_segments(&self) -> &[String] {
        &self.path
    }

    pub fn body_fields(&self) -> &BTreeMap<String, String> {
        &self.body
    }

    pub fn is_help_request(&self) -> bool {
        self.help
    }

    /// The show view, if this is a `show`.
    pub fn view(&self) -> Option<&View> {
        match &self.action {
            Action::Show(view) => Some(view),
            _ => None,
        }
    }

    /// `Unspecified` unless this is a `show` with a mode flag.
    pub fn show_mode(&self) -> ShowMode {
        self.view().map_or(ShowMode::Unspecified, View::mode)
    }

    /// Hidden fields of a table `show`; empty otherwise.
    pub fn hidden_fields(&self) -> &HiddenFields {
        match self.view() {
            Some(View::Table { hidden, .. }) => hidden,
            _ => &NO_HIDDEN_FIELDS,
        }
    }

    // ------------------------------------------------------------------------
    // Alias rewrites
    // ------------------------------------------------------------------------

    /// Change the verb. Switching to `show` keeps an existing view.
    pub(crate) fn set_command(&mut self, command: CommandKind) {
        if command != self.command() {
            self.action = Action::from_kind(command);
        }
    }

    pub(crate) fn set_view(&mut self, view: View) {
        self.action = Action::Show(view);
    }

    pub(crate) fn set_path(&mut self, path: Vec<String>) {
        self.path = path;
    }

    pub(crate) fn set_body(&mut self, body: BTreeMap<String, String>) {
        self.body = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command::types::Detail;

    #[test]
    fn test_help_request_is_empty() {
        let desc = CommandDescriptor::help_request();
        assert!(desc.is_help_request());
        assert_eq!(desc.command(), CommandKind::None);
        assert!(desc.path_segments().is_empty());
        assert!(desc.body_fields().is_empty());
    }

    #[test]
    fn test_non_show_has_no_view() {
        let desc = CommandDescriptor::new(CommandKind::Add, ["br1", "ports"]).with_field("peer", "veth1");
        assert_eq!(desc.view(), None);
        assert_eq!(desc.show_mode(), ShowMode::Unspecified);
        assert!(desc.hidden_fields().is_empty());
        assert_eq!(desc.body_fields().get("peer").map(String::as_str), Some("veth1"));
    }

    #[test]
    fn test_show_defaults_to_unspecified_table() {
        let desc = CommandDescriptor::new(CommandKind::Show, ["cubes"]);
        assert_eq!(desc.view(), Some(&View::default()));
        assert_eq!(desc.show_mode(), ShowMode::Unspecified);
    }

    #[test]
    fn test_set_command_keeps_existing_show_view() {
        let mut desc = CommandDescriptor::new(CommandKind::None, ["topology"]).with_view(View::Table {
            detail: Detail::Verbose,
            hidden: ["uuid".to_string()].into_iter().collect(),
        });
        desc.set_command(CommandKind::Show);
        assert_eq!(desc.show_mode(), ShowMode::Verbose);
        assert!(desc.hidden_fields().contains("uuid"));

        desc.set_command(CommandKind::Add);
        assert_eq!(desc.view(), None);
    }
}
