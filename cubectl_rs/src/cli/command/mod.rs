//! Command descriptor data model.
//!
//! - `types`: command keyword, show mode, table detail and view enums
//! - `descriptor`: the [`CommandDescriptor`] produced by the parser
//! - `help_texts`: offline usage text of the binary

mod descriptor;
pub mod help_texts;
mod types;

pub use descriptor::{Action, CommandDescriptor};
pub use types::{CommandKind, Detail, HiddenFields, ShowMode, View};
