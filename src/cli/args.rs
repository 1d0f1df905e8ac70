//! CLI argument definitions using clap
//!
//! Commands:
//! - dynoschema inspect --config <path>
//! - dynoschema validate --config <path> [--allow-unknown]
//! - dynoschema tables --dir <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dynoschema - table schema inspection and record checking
#[derive(Parser, Debug)]
#[command(name = "dynoschema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print keys, inferred types and indexes of a table definition
    Inspect {
        /// Path to the table definition
        #[arg(long, default_value = "./table.json")]
        config: PathBuf,
    },

    /// Apply defaults to and validate one JSON record per stdin line
    Validate {
        /// Path to the table definition
        #[arg(long, default_value = "./table.json")]
        config: PathBuf,

        /// Accept attributes the schema does not declare
        #[arg(long)]
        allow_unknown: bool,
    },

    /// List the tables defined in a directory of definitions
    Tables {
        /// Directory holding *.json table definitions
        #[arg(long, default_value = "./tables")]
        dir: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
