//! Helper functions for flag parsing.
//!
//! - Flag vocabulary
//! - `-hide=` key list parsing
//! - Flag suggestion via Levenshtein distance

use strsim::levenshtein;

use crate::cli::command::{HiddenFields, ShowMode};
use crate::error::SyntaxError;

/// Prefix of the field-suppression flag.
pub(crate) const HIDE_FLAG: &str = "-hide";

/// Flags that request the root help; only legal as the sole token.
pub(crate) const HELP_FLAGS: &[&str] = &["-h", "--help"];

const HIDE_USAGE: &str = "-hide usage: -hide=key0,key1,key";

/// Every flag spelling the parser knows, used for suggestions.
fn known_flags() -> impl Iterator<Item = &'static str> {
    ShowMode::FLAGS
        .into_iter()
        .map(|mode| mode.flag())
        .chain(std::iter::once(HIDE_FLAG))
        .chain(HELP_FLAGS.iter().copied())
}

/// `-hide`, `-hide=` and `-hide=a,b` are all the hide flag (the first two
/// are malformed and rejected by [`parse_hide_list`]).
pub(super) fn is_hide_flag(token: &str) -> bool {
    token.split('=').next() == Some(HIDE_FLAG)
}

/// Parse `-hide=k0,k1,...` into a set of dotted paths.
pub(super) fn parse_hide_list(token: &str) -> Result<HiddenFields, SyntaxError> {
    let mut parts = token.split('=');
    let _flag = parts.next();
    let (Some(list), None) = (parts.next(), parts.next()) else {
        return Err(SyntaxError::new(HIDE_USAGE));
    };

    let keys: HiddenFields = list
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        return Err(SyntaxError::new(HIDE_USAGE));
    }
    Ok(keys)
}

/// Suggest a similar flag using Levenshtein distance.
/// Returns Some(suggestion) if a close match is found (distance <= 2).
pub(super) fn suggest_similar_flag(input: &str) -> Option<&'static str> {
    let flag = input.split('=').next().unwrap_or(input).to_lowercase();
    let mut best_match: Option<(&str, usize)> = None;

    for candidate in known_flags() {
        let distance = levenshtein(&flag, candidate);
        if distance <= 2 && best_match.is_none_or(|(_, best)| distance < best) {
            best_match = Some((candidate, distance));
        }
    }

    best_match.map(|(flag, _)| flag)
}

// ============================================================================
// Tests
// ============================================================================
