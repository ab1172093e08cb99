use std::collections::VecDeque;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use resp::Command;
use resp::DecodeOptions;
use resp::DecoderSession;
use resp::Diagnostics;
use resp::ReadBuffer;
use resp::ReplyKind;
use resp::RespEncoder;
use tokio::io::AsyncRead;
use tokio::io::ReadBuf;

/// A transport that delivers the reply stream in fragments.
struct Fragments(VecDeque<&'static [u8]>);

impl AsyncRead for Fragments {
	fn poll_read(
		mut self: Pin<&mut Self>,
		_cx: &mut Context<'_>,
		buf: &mut ReadBuf<'_>,
	) -> Poll<std::io::Result<()>> {
		if let Some(chunk) = self.0.pop_front() {
			println!("[Stream] Received chunk: {:?}", String::from_utf8_lossy(chunk));
			buf.put_slice(chunk);
		}
		Poll::Ready(Ok(()))
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	println!("--- RESP Streaming Decode Example ---");

	let pipeline = Command::pipeline([
		Command::new(["SET", "key", "value"])?,
		Command::new(["INCR", "counter"])?,
		Command::new(["MGET", "key", "missing"])?,
	])?;
	println!("[Client] Sending {} ({} bytes)", pipeline, pipeline.encode().len());

	// Replies for the pipeline above, split at awkward places.
	let fragments = Fragments(VecDeque::from([
		b"+O".as_slice(),
		b"K\r\n:1".as_slice(),
		b"00".as_slice(),
		b"0\r\n*2\r\n$5\r\nva".as_slice(),
		b"lue\r\n$-".as_slice(),
		b"1\r\n".as_slice(),
	]));

	let mut source = ReadBuffer::new(fragments);
	let mut diagnostics = Diagnostics::new();
	diagnostics.set_last_command(pipeline.as_str());

	let mut session = DecoderSession::new(&mut source, &mut diagnostics, DecodeOptions::default());
	let replies = session
		.decode_many(&[ReplyKind::Success, ReplyKind::Integer, ReplyKind::Array])
		.await?;

	for reply in replies {
		println!("[Decoder] Complete: {:?}", reply);
	}
	Ok(())
}
