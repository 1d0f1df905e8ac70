//! Observability for schema construction
//!
//! Structured JSON log lines for lifecycle events. Observational only:
//! nothing here changes a result.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_LEVEL_ENV};
