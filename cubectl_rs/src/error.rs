//! Error taxonomy.
//!
//! `SyntaxError` and `RenderError` belong to the core (argument compiler and
//! pretty-printer). The remaining types come from the collaborators around it:
//! request lowering (stdin), aliases and the HTTP transport.

use thiserror::Error;

/// The token stream violated an ordering, uniqueness or exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The response body could not be parsed as JSON.
#[derive(Debug, Error)]
#[error("invalid JSON response: {0}")]
pub struct RenderError(#[from] pub serde_json::Error);

/// Failure while synthesizing the request body from standard input.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read standard input: {0}")]
    Io(#[from] std::io::Error),

    #[error("standard input is not valid YAML or JSON: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot encode request body: {0}")]
    Json(#[from] serde_json::Error),
}

/// An alias matched the invocation but its arguments are malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AliasError(pub String);

/// The HTTP exchange itself failed (no status code was obtained).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Cannot contact the daemon at {url}. Please verify that the daemon is running.")]
    Unreachable { url: String },

    #[error("cannot read TLS material {path}: {source}")]
    TlsMaterial {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// Syntax, alias, configuration or input errors.
    pub const USAGE: i32 = 1;
    /// The HTTP request could not be performed.
    pub const REQUEST_FAILED: i32 = 2;
    /// The daemon answered with a status outside 2xx.
    pub const BAD_STATUS_CODE: i32 = 3;

    /// Maps an HTTP status code to the process exit code.
    pub fn from_status(status: u16) -> i32 {
        if (200..300).contains(&status) {
            SUCCESS
        } else {
            BAD_STATUS_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_displays_message_verbatim() {
        let err = SyntaxError::new("Multiple commands found: show and add");
        assert_eq!(err.to_string(), "Multiple commands found: show and add");
        assert_eq!(err.message(), "Multiple commands found: show and add");
    }

    #[test]
    fn status_bands_map_to_exit_codes() {
        assert_eq!(exit_code::from_status(200), exit_code::SUCCESS);
        assert_eq!(exit_code::from_status(204), exit_code::SUCCESS);
        assert_eq!(exit_code::from_status(299), exit_code::SUCCESS);
        assert_eq!(exit_code::from_status(199), exit_code::BAD_STATUS_CODE);
        assert_eq!(exit_code::from_status(404), exit_code::BAD_STATUS_CODE);
        assert_eq!(exit_code::from_status(500), exit_code::BAD_STATUS_CODE);
    }

    #[test]
    fn unreachable_message_names_the_url() {
        let err = TransportError::Unreachable {
            url: "http://localhost:9000/polycube/v1/".into(),
        };
        assert!(err.to_string().contains("http://localhost:9000/polycube/v1/"));
    }
}
