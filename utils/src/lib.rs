//! Shared utilities for the migration workspace.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, unix_to_rfc3339};
