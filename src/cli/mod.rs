//! CLI module for dynoschema
//!
//! Provides command-line interface for:
//! - inspect: print the resolved schema of a table definition
//! - validate: apply defaults and validate records read from stdin
//! - tables: list the table definitions in a directory

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{inspect, run, run_command, tables, validate, VALIDATION_FAILED};
pub use errors::{CliError, CliErrorCode, CliResult};
