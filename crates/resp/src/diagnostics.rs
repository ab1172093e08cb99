//! Per-connection record of the last command sent and the last decode step.

use log::trace;

/// Labels for the steps a decode goes through.
pub mod action {
	pub const IDLE: &str = "Idle";
	pub const SENDING_COMMAND: &str = "Sending command";
	pub const PRIMING_BUFFER: &str = "Reading reply start";
	pub const FINDING_LINE_END: &str = "Finding end of line";
	pub const READING_UNTIL_LINE_END: &str = "Reading until end of line found";
	pub const ADVANCING_PAST_LINE: &str = "Advancing buffer to end of line";
	pub const READING_LENGTH_LINE: &str = "Reading length line";
	pub const READING_BULK_PAYLOAD: &str = "Reading bulk payload";
	pub const WAITING_FOR_PAYLOAD: &str = "Waiting for more bulk payload";
	pub const ADVANCING_PAST_TERMINATOR: &str = "Advancing past terminator";
	pub const PRIMING_ARRAY_ELEMENT: &str = "Reading array element";
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
	last_command: Option<String>,
	last_action: &'static str,
}

impl Default for Diagnostics {
	fn default() -> Self {
		Self {
			last_command: None,
			last_action: action::IDLE,
		}
	}
}

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_last_command(&mut self, rendered: impl Into<String>) {
		self.last_command = Some(rendered.into());
	}

	#[inline]
	pub fn set_last_action(&mut self, label: &'static str) {
		trace!("{}", label);
		self.last_action = label;
	}

	/// Rendered last command, or an empty string if nothing was sent yet.
	pub fn last_command(&self) -> &str {
		self.last_command.as_deref().unwrap_or_default()
	}

	pub fn last_action(&self) -> &'static str {
		self.last_action
	}

	/// Owned copies of the last command and last action.
	pub fn snapshot(&self) -> (String, String) {
		(self.last_command().to_string(), self.last_action.to_string())
	}
}
