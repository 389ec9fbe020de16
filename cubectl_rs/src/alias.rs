//! Alias layer: shorthand commands rewritten before lowering.
//!
//! Aliases are tried in order. The first one whose matcher returns `true` is
//! applied and the scan stops. A matcher that recognizes its keyword but not
//! the rest of the line returns an [`AliasError`] instead.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cli::command::{CommandDescriptor, CommandKind, Detail, HiddenFields, View};
use crate::error::AliasError;
use crate::help::{NO_HELP, attach_help, connect_help, detach_help, services_help};
use crate::types::{CLIENT_NAME, CLIENT_VERSION};

/// What to do after the alias layer ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasOutcome {
    /// Send the (possibly rewritten) descriptor. `preamble` is printed
    /// before the response.
    Continue { preamble: Option<String> },
    /// Nothing to send; print the text and stop.
    Handled(String),
}

struct Alias {
    name: &'static str,
    matches: fn(&CommandDescriptor) -> Result<bool, AliasError>,
    apply: fn(&mut CommandDescriptor) -> AliasOutcome,
}

const CONNECT_USAGE: &str = "Bad syntax, usage: connect peer1 peer2";
const DISCONNECT_USAGE: &str = "Bad syntax, usage: disconnect peer1 peer2";
const ATTACH_USAGE: &str =
    "Bad syntax, usage: attach cube port [position=auto, first, last], [before=cube], [after=cube]";
const DETACH_USAGE: &str = "Bad syntax, usage: detach cube port";

const ATTACH_OPTIONS: &[&str] = &["position", "before", "after"];
const ATTACH_POSITIONS: &[&str] = &["auto", "first", "last"];

const ALIASES: &[Alias] = &[
    Alias {
        name: "version",
        matches: version_matches,
        apply: version_apply,
    },
    Alias {
        name: "services-help",
        matches: |desc| Ok(keyword(desc) == Some("services") && desc.is_help_request() && desc.path_segments().len() == 1),
        apply: |desc| AliasOutcome::Handled(services_help(desc.command())),
    },
    Alias {
        name: "netdevs",
        matches: |desc| Ok(is_bare(desc, "netdevs")),
        apply: show,
    },
    Alias {
        name: "cubes",
        matches: |desc| Ok(is_bare(desc, "cubes")),
        apply: show,
    },
    Alias {
        name: "topology",
        matches: |desc| Ok(is_bare(desc, "topology")),
        apply: topology_apply,
    },
    Alias {
        name: "connect-help",
        matches: connect_help_matches,
        apply: |desc| AliasOutcome::Handled(connect_help(keyword(desc).unwrap_or("connect"))),
    },
    Alias {
        name: "connect",
        matches: |desc| peer_pair_matches(desc, "connect", CONNECT_USAGE),
        apply: |desc| peer_pair_apply(desc, "connect"),
    },
    Alias {
        name: "disconnect",
        matches: |desc| peer_pair_matches(desc, "disconnect", DISCONNECT_USAGE),
        apply: |desc| peer_pair_apply(desc, "disconnect"),
    },
    Alias {
        name: "attach-help",
        matches: |desc| Ok(keyword(desc) == Some("attach") && desc.is_help_request()),
        apply: |_| AliasOutcome::Handled(attach_help()),
    },
    Alias {
        name: "detach-help",
        matches: |desc| Ok(keyword(desc) == Some("detach") && desc.is_help_request()),
        apply: |_| AliasOutcome::Handled(detach_help()),
    },
    Alias {
        name: "attach",
        matches: attach_matches,
        apply: |desc| chain_apply(desc, "attach"),
    },
    Alias {
        name: "detach",
        matches: detach_matches,
        apply: |desc| chain_apply(desc, "detach"),
    },
];

/// First path segment, which is where every alias keyword lives.
fn keyword(desc: &CommandDescriptor) -> Option<&str> {
    desc.path_segments().first().map(String::as_str)
}

/// `name` alone: no command, no fields, not a help request.
fn is_bare(desc: &CommandDescriptor, name: &str) -> bool {
    desc.command() == CommandKind::None
        && !desc.is_help_request()
        && desc.body_fields().is_empty()
        && desc.path_segments() == [name]
}

fn proceed() -> AliasOutcome {
    AliasOutcome::Continue { preamble: None }
}

fn show(desc: &mut CommandDescriptor) -> AliasOutcome {
    desc.set_command(CommandKind::Show);
    proceed()
}

fn version_matches(desc: &CommandDescriptor) -> Result<bool, AliasError> {
    if keyword(desc) != Some("version") {
        return Ok(false);
    }
    if desc.is_help_request() {
        return Err(AliasError(NO_HELP.to_string()));
    }
    if desc.path_segments().len() != 1 {
        return Err(AliasError("Bad syntax, usage: version [show]".to_string()));
    }
    Ok(true)
}

fn version_apply(desc: &mut CommandDescriptor) -> AliasOutcome {
    desc.set_command(CommandKind::Show);
    AliasOutcome::Continue {
        preamble: Some(format!("{}:\n version: {}\n", CLIENT_NAME, CLIENT_VERSION)),
    }
}

fn topology_apply(desc: &mut CommandDescriptor) -> AliasOutcome {
    let hidden: HiddenFields = ["uuid".to_string()].into_iter().collect();
    desc.set_view(View::Table {
        detail: Detail::Verbose,
        hidden,
    });
    proceed()
}

fn connect_help_matches(desc: &CommandDescriptor) -> Result<bool, AliasError> {
    let usage = match keyword(desc) {
        Some("connect") => CONNECT_USAGE,
        Some("disconnect") => DISCONNECT_USAGE,
        _ => return Ok(false),
    };
    if !desc.is_help_request() {
        return Ok(false);
    }
    if desc.path_segments().len() != 1 {
        return Err(AliasError(usage.to_string()));
    }
    Ok(true)
}

fn peer_pair_matches(desc: &CommandDescriptor, name: &str, usage: &str) -> Result<bool, AliasError> {
    if keyword(desc) != Some(name) {
        return Ok(false);
    }
    if desc.path_segments().len() != 3 {
        return Err(AliasError(usage.to_string()));
    }
    Ok(true)
}

fn peer_pair_apply(desc: &mut CommandDescriptor, name: &str) -> AliasOutcome {
    let body = endpoints(desc, "peer1", "peer2");
    rewrite_add(desc, name, body)
}

fn attach_matches(desc: &CommandDescriptor) -> Result<bool, AliasError> {
    if keyword(desc) != Some("attach") {
        return Ok(false);
    }
    if desc.path_segments().len() != 3 {
        return Err(AliasError(ATTACH_USAGE.to_string()));
    }
    let fields = desc.body_fields();
    if fields.len() > 1 {
        return Err(AliasError("Only one parameter is supported".to_string()));
    }
    for (key, value) in fields {
        if !ATTACH_OPTIONS.contains(&key.as_str()) {
            return Err(AliasError(format!("Parameter {} is not valid", key)));
        }
        if key == "position" && !ATTACH_POSITIONS.contains(&value.as_str()) {
            return Err(AliasError(format!("{} is not valid for position argument", value)));
        }
    }
    Ok(true)
}

fn detach_matches(desc: &CommandDescriptor) -> Result<bool, AliasError> {
    if keyword(desc) != Some("detach") {
        return Ok(false);
    }
    if desc.path_segments().len() != 3 {
        return Err(AliasError(DETACH_USAGE.to_string()));
    }
    Ok(true)
}

/// `attach`/`detach cube port [option]`. The single attach option, if any,
/// is kept next to the endpoints.
fn chain_apply(desc: &mut CommandDescriptor, name: &str) -> AliasOutcome {
    let mut body = desc.body_fields().clone();
    body.extend(endpoints(desc, "cube", "port"));
    rewrite_add(desc, name, body)
}

fn endpoints(desc: &CommandDescriptor, first: &str, second: &str) -> BTreeMap<String, String> {
    let path = desc.path_segments();
    let mut body = BTreeMap::new();
    if let [_, a, b] = path {
        body.insert(first.to_string(), a.clone());
        body.insert(second.to_string(), b.clone());
    }
    body
}

fn rewrite_add(desc: &mut CommandDescriptor, name: &str, body: BTreeMap<String, String>) -> AliasOutcome {
    desc.set_command(CommandKind::Add);
    desc.set_path(vec![name.to_string()]);
    desc.set_body(body);
    proceed()
}

/// Run the alias table over `desc`, rewriting it in place.
pub fn run_aliases(desc: &mut CommandDescriptor) -> Result<AliasOutcome, AliasError> {
    for alias in ALIASES {
        if (alias.matches)(desc)? {
            debug!(alias = alias.name, "alias matched");
            return Ok((alias.apply)(desc));
        }
    }
    Ok(proceed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command::ShowMode;
    use crate::cli::parser::compile;

    fn run(tokens: &[&str]) -> (CommandDescriptor, Result<AliasOutcome, AliasError>) {
        let mut desc = compile(tokens).unwrap();
        let outcome = run_aliases(&mut desc);
        (desc, outcome)
    }

    fn error(tokens: &[&str]) -> String {
        run(tokens).1.unwrap_err().0
    }

    #[test]
    fn test_unrelated_commands_pass_through() {
        let (desc, outcome) = run(&["br1", "ports", "show"]);
        assert_eq!(outcome.unwrap(), proceed());
        assert_eq!(desc, compile(&["br1", "ports", "show"]).unwrap());
    }

    #[test]
    fn test_version() {
        let (desc, outcome) = run(&["version"]);
        assert_eq!(desc.command(), CommandKind::Show);
        let AliasOutcome::Continue { preamble: Some(text) } = outcome.unwrap() else {
            panic!("expected a preamble");
        };
        assert!(text.starts_with("cubectl:\n version: "));

        assert_eq!(error(&["version", "?"]), NO_HELP);
        assert_eq!(error(&["version", "extra"]), "Bad syntax, usage: version [show]");
    }

    #[test]
    fn test_bare_keywords_become_show() {
        for name in ["netdevs", "cubes"] {
            let (desc, _) = run(&[name]);
            assert_eq!(desc.command(), CommandKind::Show);
            assert_eq!(desc.show_mode(), ShowMode::Unspecified);
        }
        let (desc, _) = run(&["cubes", "br1"]);
        assert_eq!(desc.command(), CommandKind::None);
    }

    #[test]
    fn test_topology_is_verbose_without_uuid() {
        let (desc, _) = run(&["topology"]);
        assert_eq!(desc.command(), CommandKind::Show);
        assert_eq!(desc.show_mode(), ShowMode::Verbose);
        assert!(desc.hidden_fields().contains("uuid"));
    }

    #[test]
    fn test_explicit_topology_show_is_untouched() {
        let (desc, _) = run(&["topology", "show", "-json"]);
        assert_eq!(desc.show_mode(), ShowMode::Json);
    }

    #[test]
    fn test_connect() {
        let (desc, outcome) = run(&["connect", "br1:port1", "rt2:port2"]);
        assert_eq!(outcome.unwrap(), proceed());
        assert_eq!(desc.command(), CommandKind::Add);
        assert_eq!(desc.path_segments(), ["connect"]);
        assert_eq!(desc.body_fields()["peer1"], "br1:port1");
        assert_eq!(desc.body_fields()["peer2"], "rt2:port2");

        assert_eq!(error(&["connect", "br1:port1"]), CONNECT_USAGE);
    }

    #[test]
    fn test_disconnect() {
        let (desc, _) = run(&["disconnect", "a", "b"]);
        assert_eq!(desc.path_segments(), ["disconnect"]);
        assert_eq!(desc.body_fields().len(), 2);
        assert_eq!(error(&["disconnect"]), DISCONNECT_USAGE);
    }

    #[test]
    fn test_help_pages_are_handled() {
        for tokens in [
            &["connect", "?"][..],
            &["disconnect", "?"],
            &["attach", "?"],
            &["detach", "?"],
            &["services", "?"],
            &["services", "add", "?"],
        ] {
            let (_, outcome) = run(tokens);
            assert!(matches!(outcome.unwrap(), AliasOutcome::Handled(_)), "{:?}", tokens);
        }
        assert_eq!(error(&["connect", "a", "?"]), CONNECT_USAGE);
    }

    #[test]
    fn test_services_without_help_is_sent() {
        let (desc, outcome) = run(&["services", "show"]);
        assert_eq!(outcome.unwrap(), proceed());
        assert_eq!(desc.path_segments(), ["services"]);
    }

    #[test]
    fn test_attach() {
        let (desc, _) = run(&["attach", "fw1", "br1:port1", "position=first"]);
        assert_eq!(desc.command(), CommandKind::Add);
        assert_eq!(desc.path_segments(), ["attach"]);
        assert_eq!(desc.body_fields()["cube"], "fw1");
        assert_eq!(desc.body_fields()["port"], "br1:port1");
        assert_eq!(desc.body_fields()["position"], "first");
    }

    #[test]
    fn test_attach_errors() {
        assert_eq!(error(&["attach", "fw1"]), ATTACH_USAGE);
        assert_eq!(
            error(&["attach", "fw1", "br1:p1", "before=a", "after=b"]),
            "Only one parameter is supported"
        );
        assert_eq!(error(&["attach", "fw1", "br1:p1", "x=1"]), "Parameter x is not valid");
        assert_eq!(
            error(&["attach", "fw1", "br1:p1", "position=middle"]),
            "middle is not valid for position argument"
        );
    }

    #[test]
    fn test_detach() {
        let (desc, _) = run(&["detach", "fw1", "br1:port1"]);
        assert_eq!(desc.path_segments(), ["detach"]);
        assert_eq!(desc.body_fields().len(), 2);
        assert_eq!(error(&["detach", "fw1"]), DETACH_USAGE);
    }
}
