//! Incremental reply decoders.
//!
//! A [`DecoderSession`] consumes whole replies from a [`ReadBuffer`], pulling
//! more bytes from the transport whenever the buffered view runs out. It never
//! consumes a byte beyond the reply it is decoding, so consecutive sessions on
//! the same buffer see exactly the bytes the previous one left behind.
//!
//! Every decoder shares the same toolkit: prime the view, scan for a line,
//! check the type marker, consume. An error line (`-...`) is reported as a
//! command failure whichever decoder runs into it.

use bytes::Bytes;
use bytes::BytesMut;
use log::debug;
use tokio::io::AsyncRead;

use crate::buffer::ReadBuffer;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::action;
use crate::error::ParseError;
use crate::error::RespError;
use crate::line::LineScanner;
use crate::types::Reply;
use crate::types::ReplyKind;
use crate::utils::*;

/// Largest bulk payload the server itself accepts (proto-max-bulk-len).
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	pub max_bulk_len: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_bulk_len: DEFAULT_MAX_BULK_LEN,
		}
	}
}

/// Transient state for decoding replies off one connection.
pub struct DecoderSession<'a, R> {
	source: &'a mut ReadBuffer<R>,
	diagnostics: &'a mut Diagnostics,
	options: DecodeOptions,
	scanner: LineScanner,
}

impl<'a, R: AsyncRead + Unpin> DecoderSession<'a, R> {
	pub fn new(
		source: &'a mut ReadBuffer<R>,
		diagnostics: &'a mut Diagnostics,
		options: DecodeOptions,
	) -> Self {
		Self {
			source,
			diagnostics,
			options,
			scanner: LineScanner::new(),
		}
	}

	/// Run the decoder named by `kind`.
	pub async fn decode(&mut self, kind: ReplyKind) -> Result<Reply, RespError> {
		match kind {
			ReplyKind::Success => self.expect_success().await.map(|_| Reply::Success),
			ReplyKind::Data => self.expect_data().await.map(Reply::Data),
			ReplyKind::Integer => self.expect_integer().await.map(Reply::Integer),
			ReplyKind::Float => self.expect_float().await.map(Reply::Float),
			ReplyKind::Word => self.expect_word().await.map(Reply::Word),
			ReplyKind::Array => self.expect_array().await.map(Reply::Array),
		}
	}

	/// Decode one reply per entry of `kinds`, in order.
	pub async fn decode_many(&mut self, kinds: &[ReplyKind]) -> Result<Vec<Reply>, RespError> {
		let mut replies = Vec::with_capacity(kinds.len());
		for &kind in kinds {
			replies.push(self.decode(kind).await?);
		}
		Ok(replies)
	}

	/// `+<anything>\r\n`
	pub async fn expect_success(&mut self) -> Result<(), RespError> {
		self.prime(action::PRIMING_BUFFER).await?;
		let end = self.marked_line(SIMPLE_STRING).await?;
		self.consume_line(end)
	}

	/// `+<word>\r\n`
	pub async fn expect_word(&mut self) -> Result<String, RespError> {
		self.prime(action::PRIMING_BUFFER).await?;
		let end = self.marked_line(SIMPLE_STRING).await?;
		let word = lossy(&self.source.view()[1..end]);
		self.consume_line(end)?;
		Ok(word)
	}

	/// `:<integer>\r\n`
	pub async fn expect_integer(&mut self) -> Result<i64, RespError> {
		self.prime(action::PRIMING_BUFFER).await?;
		let end = self.marked_line(INTEGER).await?;
		let number = parse_integer(&self.source.view()[1..end]);
		self.consume_line(end)?;
		Ok(number?)
	}

	/// `$<len>\r\n<bytes>\r\n`, or `$-1\r\n` for nil.
	pub async fn expect_data(&mut self) -> Result<Option<Bytes>, RespError> {
		self.prime(action::PRIMING_BUFFER).await?;
		self.read_bulk().await
	}

	/// A bulk string whose payload is a decimal float.
	pub async fn expect_float(&mut self) -> Result<f64, RespError> {
		match self.expect_data().await? {
			Some(payload) => Ok(parse_float(&payload)?),
			None => Err(ParseError::UnexpectedReply("nil where a float was expected".into()).into()),
		}
	}

	/// `*<count>\r\n` followed by `count` bulk strings.
	///
	/// A null array (`*-1\r\n`) decodes to an empty sequence.
	pub async fn expect_array(&mut self) -> Result<Vec<Option<Bytes>>, RespError> {
		self.prime(action::PRIMING_BUFFER).await?;
		let end = self.marked_line(ARRAY).await?;
		self.diagnostics.set_last_action(action::READING_LENGTH_LINE);
		let count = parse_length(&self.source.view()[1..end])?;
		self.consume_line(end)?;

		if count == -1 {
			return Ok(Vec::new());
		}
		if count < 0 {
			return Err(ParseError::InvalidLength(count.to_string()).into());
		}

		let count = count as usize;
		let mut elements = Vec::with_capacity(count.min(1024));
		let mut rejected = None;
		for _ in 0..count {
			// The previous element may have used up exactly the buffered chunk.
			self.prime(action::PRIMING_ARRAY_ELEMENT).await?;
			match self.read_bulk().await {
				Ok(element) => elements.push(element),
				// Keep reading so the rest of the array is not left behind.
				Err(e @ RespError::CommandFailed { .. }) => {
					if rejected.is_none() {
						rejected = Some(e);
					}
				}
				Err(e) => return Err(e),
			}
		}

		match rejected {
			Some(e) => Err(e),
			None => Ok(elements),
		}
	}

	pub async fn expect_success_many(&mut self, n: usize) -> Result<(), RespError> {
		for _ in 0..n {
			self.expect_success().await?;
		}
		Ok(())
	}

	pub async fn expect_word_many(&mut self, n: usize) -> Result<Vec<String>, RespError> {
		let mut words = Vec::with_capacity(n);
		for _ in 0..n {
			words.push(self.expect_word().await?);
		}
		Ok(words)
	}

	pub async fn expect_integer_many(&mut self, n: usize) -> Result<Vec<i64>, RespError> {
		let mut numbers = Vec::with_capacity(n);
		for _ in 0..n {
			numbers.push(self.expect_integer().await?);
		}
		Ok(numbers)
	}

	pub async fn expect_data_many(&mut self, n: usize) -> Result<Vec<Option<Bytes>>, RespError> {
		let mut values = Vec::with_capacity(n);
		for _ in 0..n {
			values.push(self.expect_data().await?);
		}
		Ok(values)
	}

	pub async fn expect_float_many(&mut self, n: usize) -> Result<Vec<f64>, RespError> {
		let mut numbers = Vec::with_capacity(n);
		for _ in 0..n {
			numbers.push(self.expect_float().await?);
		}
		Ok(numbers)
	}

	pub async fn expect_array_many(
		&mut self,
		n: usize,
	) -> Result<Vec<Vec<Option<Bytes>>>, RespError> {
		let mut arrays = Vec::with_capacity(n);
		for _ in 0..n {
			arrays.push(self.expect_array().await?);
		}
		Ok(arrays)
	}

	/// Make sure the view holds at least one byte, suspending only if the
	/// transport has nothing ready.
	async fn prime(&mut self, label: &'static str) -> Result<(), RespError> {
		self.diagnostics.set_last_action(label);
		if self.fill().await? {
			Ok(())
		} else {
			Err(ParseError::EmptyResponse.into())
		}
	}

	async fn fill(&mut self) -> Result<bool, RespError> {
		if self.source.try_read()? {
			return Ok(true);
		}
		Ok(self.source.read_more().await? > 0)
	}

	/// Find the next line terminator, reading until one arrives.
	async fn read_line(&mut self) -> Result<usize, RespError> {
		self.scanner.reset();
		self.diagnostics.set_last_action(action::FINDING_LINE_END);
		loop {
			if let Some(end) = self.scanner.scan(self.source.view()) {
				return Ok(end);
			}
			self.diagnostics.set_last_action(action::READING_UNTIL_LINE_END);
			if self.source.read_more().await? == 0 {
				return Err(ParseError::MissingLineEnd.into());
			}
		}
	}

	/// Read a line and check its type marker. Returns the line length
	/// (terminator excluded), the marker included.
	async fn marked_line(&mut self, marker: u8) -> Result<usize, RespError> {
		let end = self.read_line().await?;
		match self.source.view().first().copied() {
			Some(ERROR) if end > 0 => Err(self.command_failed(end)),
			Some(m) if m == marker && end > 0 => Ok(end),
			_ => {
				let line = lossy(&self.source.view()[..end]);
				self.consume_line(end)?;
				Err(ParseError::UnexpectedReply(line).into())
			}
		}
	}

	fn consume_line(&mut self, end: usize) -> Result<(), RespError> {
		self.diagnostics.set_last_action(action::ADVANCING_PAST_LINE);
		self.source.advance(end + CRLF.len())?;
		Ok(())
	}

	/// Consume an error line and turn it into a command failure.
	fn command_failed(&mut self, end: usize) -> RespError {
		let message = lossy(&self.source.view()[1..end]);
		if let Err(e) = self.consume_line(end) {
			return e;
		}
		let command = self.diagnostics.last_command().to_string();
		debug!("Server rejected '{}': {}", command, message);
		RespError::CommandFailed { message, command }
	}

	/// Decode a bulk string; the view is already primed.
	async fn read_bulk(&mut self) -> Result<Option<Bytes>, RespError> {
		let end = self.marked_line(BULK_STRING).await?;
		self.diagnostics.set_last_action(action::READING_LENGTH_LINE);
		let len = parse_length(&self.source.view()[1..end])?;
		self.consume_line(end)?;

		if len == -1 {
			return Ok(None);
		}
		if len < 0 {
			return Err(ParseError::InvalidLength(len.to_string()).into());
		}
		let len = len as usize;
		if len > self.options.max_bulk_len {
			return Err(ParseError::BulkTooLarge {
				len,
				max: self.options.max_bulk_len,
			}
			.into());
		}

		let payload = self.read_payload(len).await?;
		self.skip_terminator(len).await?;
		Ok(Some(payload))
	}

	/// Copy exactly `len` payload bytes out of the stream, however they are
	/// split across transport reads.
	async fn read_payload(&mut self, len: usize) -> Result<Bytes, RespError> {
		let mut payload = BytesMut::with_capacity(len);
		while payload.len() < len {
			self.diagnostics.set_last_action(action::READING_BULK_PAYLOAD);
			let view = self.source.view();
			if view.is_empty() {
				self.diagnostics.set_last_action(action::WAITING_FOR_PAYLOAD);
				if !self.fill().await? {
					return Err(ParseError::Truncated {
						expected: len,
						received: payload.len(),
					}
					.into());
				}
				continue;
			}

			let take = view.len().min(len - payload.len());
			payload.extend_from_slice(&view[..take]);
			self.source.advance(take)?;
		}
		Ok(payload.freeze())
	}

	/// Consume the CRLF after a payload, reading only if it is not buffered.
	async fn skip_terminator(&mut self, len: usize) -> Result<(), RespError> {
		self.diagnostics.set_last_action(action::ADVANCING_PAST_TERMINATOR);
		while self.source.view().len() < CRLF.len() {
			if self.source.read_more().await? == 0 {
				return Err(ParseError::Truncated {
					expected: len + CRLF.len(),
					received: len + self.source.view().len(),
				}
				.into());
			}
		}
		if &self.source.view()[..CRLF.len()] != CRLF {
			return Err(ParseError::MissingTerminator.into());
		}
		self.source.advance(CRLF.len())?;
		Ok(())
	}
}
