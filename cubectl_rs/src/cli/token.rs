//! Token classification.
//!
//! Every raw argument falls into exactly one category. The categories are
//! tried in a fixed order, first match wins:
//!
//! 1. command keyword (`add`, `set`, `show`, `del`)
//! 2. flag (anything starting with `-`, including `-hide=a,b`)
//! 3. body pair (contains `=`)
//! 4. help marker (`?`)
//! 5. path segment (everything else)
//!
//! Flags are tested before body pairs so that `-hide=uuid` is a flag and not
//! a body field named `-hide`.

use super::command::CommandKind;

/// Category of a single command-line token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Command(CommandKind),
    Flag,
    BodyPair,
    Help,
    Path,
}

/// The help marker token.
pub const HELP_MARKER: &str = "?";

struct Rule {
    matches: fn(&str) -> bool,
    build: fn(&str) -> TokenKind,
}

const RULES: &[Rule] = &[
    Rule {
        matches: is_command,
        build: command_kind,
    },
    Rule {
        matches: is_flag,
        build: |_| TokenKind::Flag,
    },
    Rule {
        matches: is_body_pair,
        build: |_| TokenKind::BodyPair,
    },
    Rule {
        matches: is_help,
        build: |_| TokenKind::Help,
    },
];

fn command_kind(token: &str) -> TokenKind {
    CommandKind::from_keyword(token).map_or(TokenKind::Path, TokenKind::Command)
}

/// Classify one raw argument. Pure function of the token.
pub fn classify(token: &str) -> TokenKind {
    RULES
        .iter()
        .find(|rule| (rule.matches)(token))
        .map_or(TokenKind::Path, |rule| (rule.build)(token))
}

pub fn is_command(token: &str) -> bool {
    CommandKind::from_keyword(token).is_some()
}

pub fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

pub fn is_body_pair(token: &str) -> bool {
    token.contains('=')
}

pub fn is_help(token: &str) -> bool {
    token == HELP_MARKER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_keywords() {
        assert_eq!(classify("add"), TokenKind::Command(CommandKind::Add));
        assert_eq!(classify("set"), TokenKind::Command(CommandKind::Set));
        assert_eq!(classify("show"), TokenKind::Command(CommandKind::Show));
        assert_eq!(classify("del"), TokenKind::Command(CommandKind::Del));
        assert_eq!(classify("SHOW"), TokenKind::Path);
    }

    #[test]
    fn test_flags() {
        assert_eq!(classify("-json"), TokenKind::Flag);
        assert_eq!(classify("--help"), TokenKind::Flag);
        assert_eq!(classify("-"), TokenKind::Flag);
    }

    #[test]
    fn test_hide_flag_wins_over_body_pair() {
        assert_eq!(classify("-hide=uuid,name"), TokenKind::Flag);
        assert_eq!(classify("-x=1"), TokenKind::Flag);
    }

    #[test]
    fn test_body_pairs() {
        assert_eq!(classify("peer=veth1"), TokenKind::BodyPair);
        assert_eq!(classify("a=b=c"), TokenKind::BodyPair);
        assert_eq!(classify("name="), TokenKind::BodyPair);
        assert_eq!(classify("?=x"), TokenKind::BodyPair);
    }

    #[test]
    fn test_help_marker() {
        assert_eq!(classify("?"), TokenKind::Help);
        assert_eq!(classify("??"), TokenKind::Path);
    }

    #[test]
    fn test_everything_else_is_a_path_segment() {
        assert_eq!(classify("br1"), TokenKind::Path);
        assert_eq!(classify("ports"), TokenKind::Path);
        assert_eq!(classify(""), TokenKind::Path);
        assert_eq!(classify("a-b"), TokenKind::Path);
    }
}
