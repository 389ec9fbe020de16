//! Argument compiler for the `cubectl <path...> <command> <key=value...>`
//! grammar.
//!
//! # Module Structure
//!
//! - [`core`] - the single-pass compiler and its ordering rules
//! - [`helpers`] - `-hide` list parsing and flag suggestions
//!
//! # Usage
//!
//! ```ignore
//! use cubectl::cli::parser::compile;
//!
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! let descriptor = compile(&args)?;
//! ```

mod core;
mod helpers;

pub use core::compile;
pub(crate) use helpers::HELP_FLAGS;
