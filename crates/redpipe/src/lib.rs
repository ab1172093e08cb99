//! A RESP client connection with pipelining and post-mortem diagnostics.
//!
//! [`Connection`] pairs the incremental decoder from the `resp` crate with a
//! [`Transport`] that tracks whether it has been closed or disposed. Every
//! round trip is bounded by the configured operation timeout; when it
//! expires the error carries the last command sent and the last decode step
//! reached.

pub mod config;
mod connection;
pub mod format;
mod transport;

pub use connection::Connection;
pub use transport::Transport;
