//! Small shared types that don't belong to a single layer.

use serde::{Deserialize, Serialize};

/// When to emit ANSI colors on stdout/stderr.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Client version shown by the `version` alias.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client binary name, used in help examples and messages.
pub const CLIENT_NAME: &str = "cubectl";
