//! # cubectl
//!
//! Command-line client for a resource-oriented REST control plane. A command
//! line such as `cubectl br1 ports add port1 peer=veth1` is compiled into a
//! [`CommandDescriptor`], lowered into an HTTP request against the daemon,
//! and the JSON answer is printed as an indented, depth-limited table.
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use cubectl::{PatchPolicy, LowerConfig, compile, lower, render_json};
//!
//! let descriptor = compile(&["br1", "ports", "show"]).unwrap();
//! let config = LowerConfig {
//!     base_url: "http://localhost:9000/polycube/v1/",
//!     single_parameter_workaround: true,
//!     policy: &PatchPolicy,
//! };
//! let request = lower(&descriptor, &config, &mut std::io::empty()).unwrap();
//! assert_eq!(request.url, "http://localhost:9000/polycube/v1/br1/ports/");
//!
//! let body = br#"[{"name": "port1", "peer": "veth1"}]"#;
//! let table = render_json(body, &Default::default(), 2).unwrap();
//! println!("{table}");
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Command line grammar: token classes, the descriptor model and the compiler.
///
/// # Submodules
///
/// - [`cli::token`] - token classification
/// - [`cli::command`] - [`CommandDescriptor`] and its enums
/// - [`cli::parser`] - the argument compiler
/// - [`cli::entrypoint`] - the binary's main body
pub mod cli;

/// Typed scalars for `key=value` body fields.
pub mod coerce;

/// Descriptor to HTTP method, URL and JSON body.
pub mod request;

/// JSON to indented text and column tables.
pub mod render;

// ============================================================================
// Collaborators
// ============================================================================

pub mod alias;
pub mod help;
pub mod transport;

// ============================================================================
// Ambient
// ============================================================================

pub mod colors;
pub mod config;
pub mod error;
pub mod history;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::command::{CommandDescriptor, CommandKind, ShowMode, View};
pub use cli::parser::compile;
pub use error::{RenderError, RequestError, SyntaxError, TransportError};
pub use render::{Node, render, render_json};
pub use request::{HttpRequest, LowerConfig, Method, PatchPolicy, SetMethodPolicy, lower};
pub use types::ColorMode;
