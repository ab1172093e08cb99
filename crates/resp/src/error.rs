//! Error types for RESP decoding, encoding and command execution.

use std::time::Duration;

use thiserror::Error;

/// Main error type seen by callers of the decoder and the connection layer.
#[derive(Error, Debug)]
pub enum RespError {
	/// The reply stream violated the protocol. The connection is
	/// desynchronised and must be discarded.
	#[error("Protocol error: {0}")]
	Protocol(#[from] ParseError),

	/// The server answered with an error line. The connection stays usable.
	#[error("Command failed: {message} (command: {command})")]
	CommandFailed { message: String, command: String },

	/// No complete reply arrived within the operation timeout.
	#[error("Operation timed out: {0}")]
	Timeout(Box<OperationTimeout>),

	/// The command could not be encoded.
	#[error("Encode error: {0}")]
	Encode(#[from] EncodeError),

	/// The transport has been closed.
	#[error("Connection is closed")]
	Closed,

	/// The transport has been disposed.
	#[error("Connection is disposed")]
	Disposed,

	/// The underlying transport failed.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl RespError {
	/// Whether the caller may retry on the same logical client.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, RespError::CommandFailed { .. } | RespError::Timeout(_))
	}

	/// Whether the connection that produced this error must be replaced.
	pub fn poisons_connection(&self) -> bool {
		matches!(
			self,
			RespError::Protocol(_) | RespError::Timeout(_) | RespError::Io(_)
		)
	}
}

impl From<OperationTimeout> for RespError {
	fn from(t: OperationTimeout) -> Self {
		RespError::Timeout(Box::new(t))
	}
}

/// Errors that can occur while decoding a reply.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
	/// The stream ended before any byte of the reply arrived
	#[error("Zero length response")]
	EmptyResponse,

	/// The stream ended before a line terminator was found
	#[error("Cannot find end of line")]
	MissingLineEnd,

	/// The reply type did not match what the decoder expected
	#[error("Unexpected reply: {0}")]
	UnexpectedReply(String),

	/// Invalid integer value
	#[error("Invalid integer: {0}")]
	InvalidInteger(String),

	/// Invalid bulk string length or array count
	#[error("Invalid length: {0}")]
	InvalidLength(String),

	/// Invalid floating point value
	#[error("Invalid float: {0}")]
	InvalidFloat(String),

	/// The bytes after a bulk payload were not CRLF
	#[error("Missing CRLF after bulk payload")]
	MissingTerminator,

	/// The stream ended before the advertised payload was received
	#[error("Truncated response: expected {expected} bytes, received {received}")]
	Truncated { expected: usize, received: usize },

	/// Advertised length exceeds the configured maximum
	#[error("Bulk length {len} exceeds limit of {max} bytes")]
	BulkTooLarge { len: usize, max: usize },

	/// Attempt to consume more bytes than are buffered
	#[error("Cannot advance {requested} bytes, only {available} buffered")]
	AdvancePastEnd { requested: usize, available: usize },
}

/// Errors that can occur while encoding a command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
	/// A command needs at least its name
	#[error("Command has no arguments")]
	EmptyCommand,

	/// A pipeline needs at least one command
	#[error("Pipeline has no commands")]
	EmptyPipeline,

	/// Every request needs exactly one expected reply kind
	#[error("{requests} request(s) but {kinds} reply kind(s)")]
	ReplyCountMismatch { requests: usize, kinds: usize },
}

/// Snapshot attached to a timeout so it can be diagnosed after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationTimeout {
	pub connection_id: u64,
	pub timeout: Duration,
	pub last_command: String,
	pub last_action: String,
	/// Opaque runtime statistics, included verbatim.
	pub runtime: String,
}

impl std::fmt::Display for OperationTimeout {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Client {} after {:?}\n{}\nLast Command: {}\nLast Action: {}",
			self.connection_id, self.timeout, self.runtime, self.last_command, self.last_action
		)
	}
}
