//! One client connection: encode, send, decode, with a deadline.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::debug;
use log::warn;
use resp::Command;
use resp::DecodeOptions;
use resp::DecoderSession;
use resp::Diagnostics;
use resp::EncodeError;
use resp::OperationTimeout;
use resp::ReadBuffer;
use resp::Reply;
use resp::ReplyKind;
use resp::RespEncoder;
use resp::RespError;
use resp::diagnostics::action;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::io::ReadHalf;
use tokio::io::WriteHalf;
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::transport::Transport;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A single connection. At most one round trip is in flight at a time,
/// which `&mut self` enforces; share it behind a `tokio::sync::Mutex`.
pub struct Connection<S> {
	id: u64,
	source: ReadBuffer<ReadHalf<S>>,
	transport: Transport<WriteHalf<S>>,
	diagnostics: Diagnostics,
	options: DecodeOptions,
	timeout: Duration,
}

impl Connection<TcpStream> {
	/// Open a TCP connection to the configured server.
	pub async fn connect(config: &ClientConfig) -> Result<Self, RespError> {
		let addr = config.addr();
		let stream = tokio::time::timeout(config.connect_timeout(), TcpStream::connect(&addr))
			.await
			.map_err(|_| {
				std::io::Error::new(
					std::io::ErrorKind::TimedOut,
					format!("connecting to {} timed out", addr),
				)
			})??;
		stream.set_nodelay(true)?;
		debug!("Connected to {}", addr);
		Ok(Self::new(stream, config))
	}
}

impl<S: AsyncRead + AsyncWrite> Connection<S> {
	pub fn new(stream: S, config: &ClientConfig) -> Self {
		let (reader, writer) = tokio::io::split(stream);
		Self {
			id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
			source: ReadBuffer::new(reader),
			transport: Transport::new(writer),
			diagnostics: Diagnostics::new(),
			options: config.decode_options(),
			timeout: config.operation_timeout(),
		}
	}

	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn last_command(&self) -> &str {
		self.diagnostics.last_command()
	}

	pub fn last_action(&self) -> &'static str {
		self.diagnostics.last_action()
	}

	pub fn is_closed(&self) -> bool {
		self.transport.is_closed()
	}

	pub fn is_disposed(&self) -> bool {
		self.transport.is_disposed()
	}

	/// Write every request of `command` without reading any reply.
	pub async fn send(&mut self, command: &Command) -> Result<(), RespError> {
		self.transport.ensure_open()?;
		self.diagnostics.set_last_command(command.as_str());
		self.diagnostics.set_last_action(action::SENDING_COMMAND);
		if command.is_pipelined() {
			debug!("Connection {} pipelining {} requests: {}", self.id, command.len(), command);
		} else {
			debug!("Connection {} sending {}", self.id, command);
		}
		self.transport.write(&command.encode()).await
	}

	/// Send a single command and decode its reply as `kind`.
	pub async fn execute(&mut self, command: &Command, kind: ReplyKind) -> Result<Reply, RespError> {
		let mut replies = self.execute_pipeline(command, &[kind]).await?;
		replies.pop().ok_or_else(|| {
			EncodeError::ReplyCountMismatch {
				requests: command.len(),
				kinds: 0,
			}
			.into()
		})
	}

	/// Send every request of `command` and decode all replies as `kind`.
	pub async fn execute_many(
		&mut self,
		command: &Command,
		kind: ReplyKind,
	) -> Result<Vec<Reply>, RespError> {
		let kinds = vec![kind; command.len()];
		self.execute_pipeline(command, &kinds).await
	}

	/// Send every request of `command` and decode one reply per entry of
	/// `kinds`, in send order.
	///
	/// If the server rejects one of the pipelined commands, the remaining
	/// replies are still read so the connection stays in sync, and the first
	/// rejection is returned.
	pub async fn execute_pipeline(
		&mut self,
		command: &Command,
		kinds: &[ReplyKind],
	) -> Result<Vec<Reply>, RespError> {
		if kinds.len() != command.len() {
			return Err(EncodeError::ReplyCountMismatch {
				requests: command.len(),
				kinds: kinds.len(),
			}
			.into());
		}

		let outcome = tokio::time::timeout(self.timeout, self.round_trip(command, kinds)).await;
		let result = match outcome {
			Ok(result) => result,
			Err(_) => Err(self.timed_out().into()),
		};

		if let Err(e) = &result {
			if e.poisons_connection() {
				warn!("Connection {} closing after error: {}", self.id, e);
				if let Err(close_err) = self.transport.close().await {
					debug!("Connection {} close failed: {}", self.id, close_err);
				}
			}
		}
		result
	}

	/// Shut the write side down; later commands fail with `Closed`.
	pub async fn close(&mut self) -> Result<(), RespError> {
		self.transport.close().await
	}

	/// Close and release the connection for good.
	pub async fn dispose(&mut self) {
		self.transport.dispose().await;
	}

	/// Send, then decode each reply with its own session.
	async fn round_trip(
		&mut self,
		command: &Command,
		kinds: &[ReplyKind],
	) -> Result<Vec<Reply>, RespError> {
		self.send(command).await?;

		let mut replies = Vec::with_capacity(kinds.len());
		let mut rejected = None;
		for &kind in kinds {
			let mut session =
				DecoderSession::new(&mut self.source, &mut self.diagnostics, self.options);
			match session.decode(kind).await {
				Ok(reply) => replies.push(reply),
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
			None => Ok(replies),
		}
	}

	fn timed_out(&self) -> OperationTimeout {
		let (last_command, last_action) = self.diagnostics.snapshot();
		OperationTimeout {
			connection_id: self.id,
			timeout: self.timeout,
			last_command,
			last_action,
			runtime: runtime_stats(),
		}
	}
}

/// Scheduler statistics for timeout reports.
fn runtime_stats() -> String {
	match tokio::runtime::Handle::try_current() {
		Ok(handle) => {
			let metrics = handle.metrics();
			format!(
				"Runtime: workers={}, alive tasks={}, global queue depth={}",
				metrics.num_workers(),
				metrics.num_alive_tasks(),
				metrics.global_queue_depth()
			)
		}
		Err(_) => "Runtime: unavailable".to_string(),
	}
}
