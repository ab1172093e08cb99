//! Buffered byte source over the read end of a transport.
//!
//! The buffer is the only owner of received bytes. Decoders look at the
//! unconsumed region through [`ReadBuffer::view`] and commit consumption with
//! [`ReadBuffer::advance`]; bytes past the committed point stay buffered for
//! the next look, however many times the view is inspected.

use bytes::Buf;
use bytes::BytesMut;
use futures::FutureExt;
use log::trace;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;

use crate::error::ParseError;

const DEFAULT_CAPACITY: usize = 4096;

pub struct ReadBuffer<R> {
	reader: R,
	buf: BytesMut,
	completed: bool,
}

impl<R: AsyncRead + Unpin> ReadBuffer<R> {
	pub fn new(reader: R) -> Self {
		Self {
			reader,
			buf: BytesMut::with_capacity(DEFAULT_CAPACITY),
			completed: false,
		}
	}

	/// Unconsumed bytes, in arrival order.
	#[inline]
	pub fn view(&self) -> &[u8] {
		&self.buf
	}

	/// Whether the transport reported end of stream.
	#[inline]
	pub fn is_completed(&self) -> bool {
		self.completed
	}

	/// Report whether bytes are available without suspending.
	///
	/// Already buffered bytes count. Otherwise a single read is attempted and
	/// abandoned if the transport has nothing ready.
	pub fn try_read(&mut self) -> std::io::Result<bool> {
		if !self.buf.is_empty() {
			return Ok(true);
		}
		if self.completed {
			return Ok(false);
		}

		match self.reader.read_buf(&mut self.buf).now_or_never() {
			Some(Ok(0)) => {
				self.completed = true;
				Ok(false)
			}
			Some(Ok(n)) => {
				trace!("try_read picked up {} bytes", n);
				Ok(true)
			}
			Some(Err(e)) => Err(e),
			None => Ok(false),
		}
	}

	/// Wait for the next chunk from the transport and append it to the view.
	///
	/// Returns the number of new bytes; `0` means the stream has ended.
	pub async fn read_more(&mut self) -> std::io::Result<usize> {
		if self.completed {
			return Ok(0);
		}
		if self.buf.capacity() == self.buf.len() {
			self.buf.reserve(DEFAULT_CAPACITY);
		}

		let n = self.reader.read_buf(&mut self.buf).await?;
		if n == 0 {
			self.completed = true;
		}
		trace!("read_more received {} bytes ({} buffered)", n, self.buf.len());
		Ok(n)
	}

	/// Mark the first `n` bytes of the view as consumed.
	pub fn advance(&mut self, n: usize) -> Result<(), ParseError> {
		if n > self.buf.len() {
			return Err(ParseError::AdvancePastEnd {
				requested: n,
				available: self.buf.len(),
			});
		}
		self.buf.advance(n);
		Ok(())
	}
}
