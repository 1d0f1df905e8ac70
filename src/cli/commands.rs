//! CLI command implementations
//!
//! Commands load table definitions through `SchemaLoader` and never touch a
//! store. `validate` writes one response line per input line; a bad record
//! produces an error line and processing continues.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::schema::{Schema, SchemaLoader, ValidationOptions};

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_requests, write_error, write_response};

/// Error code reported for records that fail validation
pub const VALIDATION_FAILED: &str = "DYNO_VALIDATION_FAILED";

pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cmd {
        Command::Inspect { config } => inspect(&config, &mut out),
        Command::Validate {
            config,
            allow_unknown,
        } => {
            let stdin = io::stdin();
            validate(&config, allow_unknown, stdin.lock(), &mut out)
        }
        Command::Tables { dir } => tables(&dir, &mut out),
    }
}

/// Prints the resolved schema summary
pub fn inspect<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let schema = SchemaLoader::load_file(config_path)?;
    write_response(out, schema.describe())
}

/// Applies defaults to and validates each input record
pub fn validate<R: BufRead, W: Write>(
    config_path: &Path,
    allow_unknown: bool,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let schema = SchemaLoader::load_file(config_path)?;
    let options = ValidationOptions {
        allow_unknown: allow_unknown || schema.validation_options().allow_unknown,
        ..*schema.validation_options()
    };

    for request in read_requests(input) {
        match request {
            Ok(record) => check_record(&schema, &options, &record, out)?,
            Err(e) => write_error(out, e.code().code(), e.message(), None)?,
        }
    }
    Ok(())
}

fn check_record<W: Write>(
    schema: &Schema,
    options: &ValidationOptions,
    record: &Value,
    out: &mut W,
) -> CliResult<()> {
    let filled = schema.apply_defaults(record);
    let result = schema.validate_with(&filled, options);
    match result.error {
        None => write_response(out, result.value),
        Some(err) => {
            let details = serde_json::to_value(err.details())?;
            write_error(out, VALIDATION_FAILED, &err.to_string(), Some(details))
        }
    }
}

/// Lists table names with their keys
pub fn tables<W: Write>(dir: &Path, out: &mut W) -> CliResult<()> {
    let mut loader = SchemaLoader::new(dir);
    loader.load_all()?;

    let listing: Vec<Value> = loader
        .table_names()
        .filter_map(|name| {
            let schema = loader.get(name)?;
            Some(json!({
                "name": name,
                "hashKey": schema.hash_key(),
                "rangeKey": schema.range_key(),
            }))
        })
        .collect();
    write_response(out, Value::Array(listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn users_definition(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("users.json");
        let definition = json!({
            "hashKey": "email",
            "tableName": "users",
            "schema": {
                "email": { "type": "string", "format": "email", "required": true },
                "name": { "type": "string", "default": "Foo Bar" },
                "tags": { "type": "stringSet" }
            }
        });
        fs::write(&path, definition.to_string()).unwrap();
        path
    }

    fn lines(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_inspect_outputs_datatypes() {
        let tmp = TempDir::new().unwrap();
        let path = users_definition(tmp.path());

        let mut out = Vec::new();
        inspect(&path, &mut out).unwrap();
        let response = &lines(out)[0];
        assert_eq!(response["status"], "ok");
        assert_eq!(
            response["data"]["datatypes"],
            json!({ "email": "S", "name": "S", "tags": "SS" })
        );
    }

    #[test]
    fn test_validate_reports_each_line() {
        let tmp = TempDir::new().unwrap();
        let path = users_definition(tmp.path());
        let input = Cursor::new(
            "{\"email\":\"foo@bar.com\"}\n{\"name\":\"x\"}\nnot json\n{\"email\":\"a@b.co\",\"extra\":1}\n",
        );

        let mut out = Vec::new();
        validate(&path, false, input, &mut out).unwrap();
        let responses = lines(out);

        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["data"], json!({ "email": "foo@bar.com", "name": "Foo Bar" }));
        assert_eq!(responses[1]["code"], VALIDATION_FAILED);
        assert_eq!(responses[1]["details"][0]["path"], "email");
        assert_eq!(responses[2]["status"], "error");
        assert_eq!(responses[3]["details"][0]["kind"], "unknown");
    }

    #[test]
    fn test_validate_allow_unknown_flag() {
        let tmp = TempDir::new().unwrap();
        let path = users_definition(tmp.path());
        let input = Cursor::new("{\"email\":\"a@b.co\",\"extra\":1}\n");

        let mut out = Vec::new();
        validate(&path, true, input, &mut out).unwrap();
        assert_eq!(lines(out)[0]["status"], "ok");
    }

    #[test]
    fn test_bad_definition_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{\"rangeKey\":\"x\"}").unwrap();

        let err = inspect(&path, &mut Vec::new()).unwrap_err();
        assert!(err.message().contains("DYNO_MISSING_HASH_KEY"));
    }

    #[test]
    fn test_tables_listing() {
        let tmp = TempDir::new().unwrap();
        users_definition(tmp.path());

        let mut out = Vec::new();
        tables(tmp.path(), &mut out).unwrap();
        assert_eq!(
            lines(out)[0]["data"],
            json!([{ "name": "users", "hashKey": "email", "rangeKey": null }])
        );
    }
}
