//! Console logging for the redpipe client.
//!
//! Libraries in the workspace log through the `log` facade; [`init`] installs
//! a `tracing` subscriber that picks those records up and prints them with a
//! local timestamp.

mod error;
pub mod logger;

pub use error::TelemetryError;
pub use logger::init;
pub use logger::reload_log_level;
