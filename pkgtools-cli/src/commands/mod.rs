//! Subcommand implementations.
//!
//! Commands write their results to the given writer so they can be run
//! against a buffer in tests; diagnostics go through `tracing`.

pub mod compare;
pub mod config;
pub mod info;
pub mod ports;
pub mod query;
pub mod shell;

use std::fmt::Display;
use std::io::Write;

use crate::error::CliError;

/// Write one line of command output.
pub(crate) fn emit(out: &mut dyn Write, line: impl Display) -> Result<(), CliError> {
    writeln!(out, "{}", line).map_err(|e| CliError::io("<stdout>", e))
}

#[cfg(test)]
pub(crate) fn output_of<F>(run: F) -> String
where
    F: FnOnce(&mut dyn Write) -> Result<(), CliError>,
{
    let mut buf = Vec::new();
    run(&mut buf).expect("command succeeds");
    String::from_utf8(buf).expect("utf-8 output")
}
