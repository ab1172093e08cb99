//! Write half of a connection, with monotonic closed/disposed flags.

use log::debug;
use log::warn;
use resp::RespError;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

pub struct Transport<W> {
	writer: W,
	closed: bool,
	disposed: bool,
}

impl<W: AsyncWrite + Unpin> Transport<W> {
	pub fn new(writer: W) -> Self {
		Self {
			writer,
			closed: false,
			disposed: false,
		}
	}

	#[inline]
	pub fn is_closed(&self) -> bool {
		self.closed
	}

	#[inline]
	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	/// Check the flags without touching the stream.
	pub fn ensure_open(&self) -> Result<(), RespError> {
		if self.disposed {
			return Err(RespError::Disposed);
		}
		if self.closed {
			return Err(RespError::Closed);
		}
		Ok(())
	}

	/// Write and flush `bytes` in full.
	pub async fn write(&mut self, bytes: &[u8]) -> Result<(), RespError> {
		self.ensure_open()?;
		self.writer.write_all(bytes).await?;
		self.writer.flush().await?;
		Ok(())
	}

	/// Shut the write side down. Closing twice is a no-op.
	pub async fn close(&mut self) -> Result<(), RespError> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;
		debug!("Closing transport");
		self.writer.shutdown().await?;
		Ok(())
	}

	/// Close, then mark the transport as released for good.
	pub async fn dispose(&mut self) {
		if self.disposed {
			return;
		}
		if let Err(e) = self.close().await {
			warn!("Error while closing transport: {}", e);
		}
		self.disposed = true;
	}
}

#[cfg(test)]
mod tests {
	use tokio::io::AsyncReadExt;

	use super::*;

	#[tokio::test]
	async fn test_write_reaches_peer() {
		let (client, mut server) = tokio::io::duplex(64);
		let mut transport = Transport::new(client);
		transport.write(b"*1\r\n$4\r\nPING\r\n").await.unwrap();

		let mut buf = [0u8; 14];
		server.read_exact(&mut buf).await.unwrap();
		assert_eq!(&buf, b"*1\r\n$4\r\nPING\r\n");
	}

	#[tokio::test]
	async fn test_closed_is_monotonic() {
		let (client, _server) = tokio::io::duplex(64);
		let mut transport = Transport::new(client);

		transport.close().await.unwrap();
		transport.close().await.unwrap();
		assert!(transport.is_closed());
		assert!(!transport.is_disposed());
		assert!(matches!(
			transport.write(b"x").await,
			Err(RespError::Closed)
		));
	}

	#[tokio::test]
	async fn test_dispose_implies_closed() {
		let (client, _server) = tokio::io::duplex(64);
		let mut transport = Transport::new(client);

		transport.dispose().await;
		assert!(transport.is_closed());
		assert!(transport.is_disposed());
		assert!(matches!(
			transport.write(b"x").await,
			Err(RespError::Disposed)
		));
	}
}
