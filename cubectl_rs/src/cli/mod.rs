//! CLI layer of `cubectl`.
//!
//! ```text
//!   argv ──► token::classify ──► parser::compile ──► CommandDescriptor
//!                                                          │
//!          alias::run_aliases ◄────────────────────────────┘
//!                 │
//!                 ▼
//!   request::lower ──► transport ──► entrypoint::respond ──► stdout
//! ```

pub mod command;
pub mod entrypoint;
pub mod parser;
pub mod token;

pub use command::{Action, CommandDescriptor, CommandKind, Detail, HiddenFields, ShowMode, View};
pub use token::{TokenKind, classify};
