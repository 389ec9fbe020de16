//! Argument compiler: one left-to-right pass over the tokens.
//!
//! Rules are enforced inline, so the first violated rule decides the error.
//! Once the first `key=value` token is seen the pass is in the body phase and
//! neither path segments nor a command keyword may follow.

use std::collections::BTreeMap;

use super::helpers::{HELP_FLAGS, HIDE_FLAG, is_hide_flag, parse_hide_list, suggest_similar_flag};
use crate::cli::command::{Action, CommandDescriptor, CommandKind, HiddenFields, ShowMode, View};
use crate::cli::token::{TokenKind, classify};
use crate::error::SyntaxError;

/// Mutable state of a single compile pass.
#[derive(Default)]
struct Pass<'t> {
    command: Option<(CommandKind, &'t str)>,
    mode: Option<(ShowMode, &'t str)>,
    hidden: Option<HiddenFields>,
    path: Vec<String>,
    body: BTreeMap<String, String>,
    in_body: bool,
    help: bool,
}

impl<'t> Pass<'t> {
    fn command_kind(&self) -> CommandKind {
        self.command.map_or(CommandKind::None, |(kind, _)| kind)
    }

    fn command(&mut self, kind: CommandKind, token: &'t str, previous: &str) -> Result<(), SyntaxError> {
        if let Some((_, first)) = self.command {
            return Err(SyntaxError::new(format!(
                "Multiple commands found: {} and {}",
                token, first
            )));
        }
        if self.in_body {
            return Err(not_valid_after(token, previous));
        }
        self.command = Some((kind, token));
        Ok(())
    }

    fn flag(&mut self, token: &'t str, token_count: usize) -> Result<(), SyntaxError> {
        if let Some(mode) = ShowMode::from_flag(token) {
            return self.show_mode(mode, token);
        }

        if HELP_FLAGS.contains(&token) {
            if token_count != 1 {
                return Err(SyntaxError::new(format!("{} must be the only argument", token)));
            }
            self.help = true;
            return Ok(());
        }

        if is_hide_flag(token) {
            return self.hide(token);
        }

        Err(SyntaxError::new(match suggest_similar_flag(token) {
            Some(suggestion) => format!("{} is not a valid flag. Did you mean: {}?", token, suggestion),
            None => format!("{} is not a valid flag", token),
        }))
    }

    fn show_mode(&mut self, mode: ShowMode, token: &'t str) -> Result<(), SyntaxError> {
        if let Some((_, first)) = self.mode {
            return Err(SyntaxError::new(format!(
                "{} and {} cannot be used together",
                token, first
            )));
        }
        if self.command_kind() != CommandKind::Show {
            return Err(SyntaxError::new(format!(
                "{} can only be used with {} command",
                token,
                CommandKind::Show
            )));
        }
        if self.hidden.is_some() && mode.is_structured() {
            return Err(hide_incompatible(token));
        }
        self.mode = Some((mode, token));
        Ok(())
    }

    fn hide(&mut self, token: &str) -> Result<(), SyntaxError> {
        if self.command_kind() != CommandKind::Show {
            return Err(SyntaxError::new(format!(
                "{} can only be used with {} command",
                HIDE_FLAG,
                CommandKind::Show
            )));
        }
        if let Some((mode, flag)) = self.mode
            && mode.is_structured()
        {
            return Err(hide_incompatible(flag));
        }
        let keys = parse_hide_list(token)?;
        self.hidden.get_or_insert_with(HiddenFields::new).extend(keys);
        Ok(())
    }

    fn body_pair(&mut self, token: &str) -> Result<(), SyntaxError> {
        self.in_body = true;
        let Some((key, value)) = token.split_once('=') else {
            return Err(invalid_format(token));
        };
        if key.is_empty() || value.contains('=') {
            return Err(invalid_format(token));
        }
        if self.body.contains_key(key) {
            return Err(SyntaxError::new(format!("Duplicated values for {}", key)));
        }
        self.body.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn help_marker(&mut self, is_last: bool) -> Result<(), SyntaxError> {
        if !is_last {
            return Err(SyntaxError::new("'?' must be the last argument"));
        }
        self.help = true;
        Ok(())
    }

    fn path(&mut self, token: &str, previous: &str) -> Result<(), SyntaxError> {
        if self.in_body {
            return Err(not_valid_after(token, previous));
        }
        if token.is_empty() {
            return Err(SyntaxError::new("empty path segment is not valid"));
        }
        self.path.push(token.to_string());
        Ok(())
    }

    fn finish(self) -> CommandDescriptor {
        let action = match self.command_kind() {
            CommandKind::None => Action::None,
            CommandKind::Add => Action::Add,
            CommandKind::Set => Action::Set,
            CommandKind::Del => Action::Del,
            CommandKind::Show => {
                let mode = self.mode.map_or(ShowMode::Unspecified, |(mode, _)| mode);
                Action::Show(View::from_parts(mode, self.hidden.unwrap_or_default()))
            }
        };
        CommandDescriptor::from_parts(action, self.path, self.body, self.help)
    }
}

fn not_valid_after(token: &str, previous: &str) -> SyntaxError {
    SyntaxError::new(format!("{} is not valid after {}", token, previous))
}

fn invalid_format(token: &str) -> SyntaxError {
    SyntaxError::new(format!("{} is not a valid format", token))
}

fn hide_incompatible(mode_flag: &str) -> SyntaxError {
    SyntaxError::new(format!("{} is not compatible with {}", HIDE_FLAG, mode_flag))
}

/// Compile an ordered token list into a [`CommandDescriptor`].
///
/// An empty list is the root help request. No partial descriptor is ever
/// returned: the first rule violation aborts the pass.
pub fn compile<S: AsRef<str>>(tokens: &[S]) -> Result<CommandDescriptor, SyntaxError> {
    if tokens.is_empty() {
        return Ok(CommandDescriptor::help_request());
    }

    let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
    let mut pass = Pass::default();

    for (index, &token) in tokens.iter().enumerate() {
        let previous = index.checked_sub(1).map_or("", |i| tokens[i]);
        match classify(token) {
            TokenKind::Command(kind) => pass.command(kind, token, previous)?,
            TokenKind::Flag => pass.flag(token, tokens.len())?,
            TokenKind::BodyPair => pass.body_pair(token)?,
            TokenKind::Help => pass.help_marker(index + 1 == tokens.len())?,
            TokenKind::Path => pass.path(token, previous)?,
        }
    }

    Ok(pass.finish())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command::Detail;

    fn err(tokens: &[&str]) -> String {
        compile(tokens).unwrap_err().message().to_string()
    }

    #[test]
    fn test_empty_input_is_help() {
        let desc = compile::<&str>(&[]).unwrap();
        assert!(desc.is_help_request());
        assert!(desc.path_segments().is_empty());
        assert!(desc.body_fields().is_empty());
        assert_eq!(desc.command(), CommandKind::None);
    }

    #[test]
    fn test_path_command_and_body() {
        let desc = compile(&["hw0", "ports", "add", "port1", "peer=veth1", "type=external"]).unwrap();
        assert_eq!(desc.command(), CommandKind::Add);
        assert_eq!(desc.path_segments(), ["hw0", "ports", "port1"]);
        assert_eq!(desc.body_fields().len(), 2);
        assert_eq!(desc.body_fields()["peer"], "veth1");
        assert_eq!(desc.body_fields()["type"], "external");
        assert!(!desc.is_help_request());
    }

    #[test]
    fn test_no_command_keeps_path_order() {
        let desc = compile(&["br1", "ports", "port1"]).unwrap();
        assert_eq!(desc.command(), CommandKind::None);
        assert_eq!(desc.path_segments(), ["br1", "ports", "port1"]);
    }

    #[test]
    fn test_multiple_commands_name_both_tokens() {
        assert_eq!(err(&["br1", "show", "add"]), "Multiple commands found: add and show");
        assert_eq!(err(&["set", "br1", "set"]), "Multiple commands found: set and set");
    }

    #[test]
    fn test_command_after_body_is_rejected() {
        assert_eq!(err(&["br1", "a=1", "show"]), "show is not valid after a=1");
    }

    #[test]
    fn test_path_after_body_is_rejected() {
        assert_eq!(err(&["br1", "add", "a=1", "port1"]), "port1 is not valid after a=1");
        assert_eq!(err(&["a=1", "br1"]), "br1 is not valid after a=1");
    }

    #[test]
    fn test_body_pair_format() {
        assert_eq!(err(&["br1", "set", "a=b=c"]), "a=b=c is not a valid format");
        assert_eq!(err(&["br1", "set", "=x"]), "=x is not a valid format");
        let desc = compile(&["br1", "set", "name="]).unwrap();
        assert_eq!(desc.body_fields()["name"], "");
    }

    #[test]
    fn test_duplicate_body_key() {
        assert_eq!(err(&["br1", "set", "a=1", "a=2"]), "Duplicated values for a");
    }

    #[test]
    fn test_help_marker_must_be_last() {
        assert_eq!(err(&["br1", "?", "show"]), "'?' must be the last argument");
        assert_eq!(err(&["?", "?"]), "'?' must be the last argument");

        let desc = compile(&["br1", "ports", "add", "?"]).unwrap();
        assert!(desc.is_help_request());
        assert_eq!(desc.command(), CommandKind::Add);
        assert_eq!(desc.path_segments(), ["br1", "ports"]);
    }

    #[test]
    fn test_help_flag_only_alone() {
        assert!(compile(&["-h"]).unwrap().is_help_request());
        assert!(compile(&["--help"]).unwrap().is_help_request());
        assert_eq!(err(&["br1", "-h"]), "-h must be the only argument");
        assert_eq!(err(&["--help", "show"]), "--help must be the only argument");
    }

    #[test]
    fn test_show_modes() {
        let desc = compile(&["br1", "show", "-brief"]).unwrap();
        assert_eq!(desc.show_mode(), ShowMode::Brief);
        assert_eq!(
            desc.view(),
            Some(&View::Table {
                detail: Detail::Brief,
                hidden: HiddenFields::new()
            })
        );

        let desc = compile(&["br1", "show", "-json"]).unwrap();
        assert_eq!(desc.view(), Some(&View::Json));

        let desc = compile(&["br1", "show"]).unwrap();
        assert_eq!(desc.show_mode(), ShowMode::Unspecified);
    }

    #[test]
    fn test_show_modes_are_exclusive() {
        assert_eq!(
            err(&["br1", "show", "-json", "-yaml"]),
            "-yaml and -json cannot be used together"
        );
        assert_eq!(
            err(&["br1", "show", "-brief", "-brief"]),
            "-brief and -brief cannot be used together"
        );
    }

    #[test]
    fn test_show_flags_require_show() {
        assert_eq!(err(&["br1", "-json"]), "-json can only be used with show command");
        assert_eq!(err(&["br1", "-verbose", "show"]), "-verbose can only be used with show command");
        assert_eq!(err(&["br1", "add", "-brief"]), "-brief can only be used with show command");
        assert_eq!(err(&["br1", "del", "-hide=uuid"]), "-hide can only be used with show command");
    }

    #[test]
    fn test_hide_and_structured_modes_exclude_each_other() {
        assert_eq!(
            err(&["br1", "show", "-hide=uuid", "-json"]),
            "-hide is not compatible with -json"
        );
        assert_eq!(
            err(&["br1", "show", "-yaml", "-hide=uuid"]),
            "-hide is not compatible with -yaml"
        );
    }

    #[test]
    fn test_hide_with_table_mode() {
        let desc = compile(&["br1", "show", "-hide=uuid,ports.mac", "-verbose"]).unwrap();
        assert_eq!(desc.show_mode(), ShowMode::Verbose);
        assert!(desc.hidden_fields().contains("uuid"));
        assert!(desc.hidden_fields().contains("ports.mac"));
    }

    #[test]
    fn test_repeated_hide_flags_merge() {
        let desc = compile(&["br1", "show", "-hide=uuid", "-hide=name"]).unwrap();
        assert_eq!(desc.hidden_fields().len(), 2);
    }

    #[test]
    fn test_hide_usage_errors() {
        assert_eq!(err(&["br1", "show", "-hide"]), "-hide usage: -hide=key0,key1,key");
        assert_eq!(err(&["br1", "show", "-hide="]), "-hide usage: -hide=key0,key1,key");
    }

    #[test]
    fn test_unknown_flag() {
        assert_eq!(err(&["br1", "show", "-jsn"]), "-jsn is not a valid flag. Did you mean: -json?");
        assert_eq!(err(&["br1", "--no-such-thing"]), "--no-such-thing is not a valid flag");
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert_eq!(err(&["br1", ""]), "empty path segment is not valid");
    }

    #[test]
    fn test_structured_mode_never_carries_hidden_fields() {
        let cases: &[&[&str]] = &[
            &["br1", "show", "-json"],
            &["br1", "show", "-yaml"],
            &["br1", "show", "-hide=a"],
            &["br1", "show", "-hide=a", "-brief"],
        ];
        for tokens in cases {
            let desc = compile(tokens).unwrap();
            assert!(!(desc.show_mode().is_structured() && !desc.hidden_fields().is_empty()));
        }
    }
}
