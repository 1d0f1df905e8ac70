//! Structured JSON logger
//!
//! - One log line = one event
//! - Keys after `event` and `severity` are sorted
//! - Synchronous, written to stderr so stdout stays free for command output
//! - Minimum severity from `DYNOSCHEMA_LOG` (trace|info|warn|error|fatal|off),
//!   default `warn`

use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;

use super::events::Event;

/// Environment variable holding the minimum severity
pub const LOG_LEVEL_ENV: &str = "DYNOSCHEMA_LOG";

static MIN_SEVERITY: OnceLock<Option<Severity>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parses a level name; `Ok(None)` means logging is off
    pub fn parse_level(raw: &str) -> Result<Option<Self>, String> {
        let level = match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Severity::Trace,
            "info" => Severity::Info,
            "warn" => Severity::Warn,
            "error" => Severity::Error,
            "fatal" => Severity::Fatal,
            "off" => return Ok(None),
            other => return Err(format!("unknown log level '{}'", other)),
        };
        Ok(Some(level))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Threshold used when `DYNOSCHEMA_LOG` is unset or unrecognized
pub const DEFAULT_SEVERITY: Severity = Severity::Warn;

fn threshold_from(raw: Option<&str>) -> Option<Severity> {
    raw.map_or(Some(DEFAULT_SEVERITY), |raw| {
        Severity::parse_level(raw).unwrap_or(Some(DEFAULT_SEVERITY))
    })
}

fn min_severity() -> Option<Severity> {
    *MIN_SEVERITY.get_or_init(|| threshold_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref()))
}

pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: Event, fields: &[(&str, &str)]) {
        match min_severity() {
            Some(min) if severity >= min => {
                Self::log_to_writer(severity, event.as_str(), fields, &mut io::stderr());
            }
            _ => {}
        }
    }

    pub(crate) fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut output = String::with_capacity(256);

        output.push_str("{\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");

        // Logging must never fail the caller
        let _ = writer.write_all(output.as_bytes());
        let _ = writer.flush();
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }

    pub fn trace(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

/// Capture logs to a buffer for testing
#[cfg(test)]
pub fn capture_log(severity: Severity, event: Event, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event.as_str(), fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
