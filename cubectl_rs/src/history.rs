//! Append-only log of commands and what they printed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat};

pub fn format_entry(at: DateTime<Local>, argv: &[String], output: &str) -> String {
    format!(
        "[{}] {}\n{}\n",
        at.to_rfc3339_opts(SecondsFormat::Secs, false),
        argv.join(" "),
        output
    )
}

/// Append one entry stamped with the current local time.
pub fn append(path: &Path, argv: &[String], output: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(format_entry(Local::now(), argv, output).as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))
}
