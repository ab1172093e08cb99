//! Request encoding: commands as RESP arrays of bulk strings.

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::EncodeError;
use crate::utils::ARRAY;
use crate::utils::BULK_STRING;
use crate::utils::CRLF;

/// Trait for encoding requests onto the wire.
pub trait RespEncoder {
	fn encode_to(&self, buf: &mut BytesMut);

	fn encode(&self) -> Bytes {
		let mut buf = BytesMut::new();
		self.encode_to(&mut buf);
		buf.freeze()
	}
}

/// One or more wire-ready requests.
///
/// A single command holds one encoded request. A pipelined command holds the
/// requests of every command it was built from, in send order; the server
/// replies in that same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	encoded: Vec<Bytes>,
	rendered: String,
}

impl Command {
	/// Encode a command name followed by its arguments.
	pub fn new<I, A>(args: I) -> Result<Self, EncodeError>
	where
		I: IntoIterator<Item = A>,
		A: AsRef<[u8]>,
	{
		let args: Vec<A> = args.into_iter().collect();
		if args.is_empty() {
			return Err(EncodeError::EmptyCommand);
		}

		let mut buf = BytesMut::with_capacity(encoded_len(&args));
		encode_length(&mut buf, ARRAY, args.len());
		for arg in &args {
			encode_bulk_string(&mut buf, arg.as_ref());
		}

		let rendered = args
			.iter()
			.map(|a| String::from_utf8_lossy(a.as_ref()))
			.collect::<Vec<_>>()
			.join(" ");

		Ok(Self {
			encoded: vec![buf.freeze()],
			rendered,
		})
	}

	/// Concatenate commands for pipelined dispatch, preserving order.
	pub fn pipeline<I>(commands: I) -> Result<Self, EncodeError>
	where
		I: IntoIterator<Item = Command>,
	{
		let mut encoded = Vec::new();
		let mut rendered = Vec::new();
		for cmd in commands {
			encoded.extend(cmd.encoded);
			rendered.push(cmd.rendered);
		}

		let pipeline = Self {
			encoded,
			rendered: rendered.join(" | "),
		};
		if pipeline.is_empty() {
			return Err(EncodeError::EmptyPipeline);
		}
		Ok(pipeline)
	}

	/// Number of requests, and so of replies to read.
	pub fn len(&self) -> usize {
		self.encoded.len()
	}

	pub fn is_empty(&self) -> bool {
		self.encoded.is_empty()
	}

	pub fn is_pipelined(&self) -> bool {
		self.encoded.len() > 1
	}

	pub fn as_str(&self) -> &str {
		&self.rendered
	}
}

impl std::fmt::Display for Command {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.rendered)
	}
}

impl RespEncoder for Command {
	fn encode_to(&self, buf: &mut BytesMut) {
		buf.reserve(self.encoded.iter().map(Bytes::len).sum());
		for request in &self.encoded {
			buf.put_slice(request);
		}
	}

	fn encode(&self) -> Bytes {
		match self.encoded.as_slice() {
			[single] => single.clone(),
			_ => {
				let mut buf = BytesMut::new();
				self.encode_to(&mut buf);
				buf.freeze()
			}
		}
	}
}

fn encoded_len<A: AsRef<[u8]>>(args: &[A]) -> usize {
	// marker + up to 20 digits + CRLF per header
	let headers = (args.len() + 1) * 23;
	headers + args.iter().map(|a| a.as_ref().len() + 2).sum::<usize>()
}

#[inline]
fn encode_length(buf: &mut BytesMut, marker: u8, length: usize) {
	buf.put_u8(marker);
	buf.put_slice(length.to_string().as_bytes());
	buf.put_slice(CRLF);
}

#[inline]
fn encode_bulk_string(buf: &mut BytesMut, s: &[u8]) {
	encode_length(buf, BULK_STRING, s.len());
	buf.put_slice(s);
	buf.put_slice(CRLF);
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(vec!["PING"], b"*1\r\n$4\r\nPING\r\n")]
	#[case(vec!["GET", "key"], b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n")]
	#[case(vec!["SET", "a", ""], b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$0\r\n\r\n")]
	fn test_encode_command(#[case] args: Vec<&str>, #[case] expected: &[u8]) {
		let cmd = Command::new(args).unwrap();
		assert_eq!(cmd.encode(), expected);
	}

	#[test]
	fn test_length_is_bytes_not_chars() {
		let cmd = Command::new(["SET", "k", "héllo"]).unwrap();
		assert_eq!(
			cmd.encode(),
			"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$6\r\nhéllo\r\n".as_bytes()
		);
	}

	#[test]
	fn test_empty_command() {
		let args: Vec<&str> = vec![];
		assert_eq!(Command::new(args), Err(EncodeError::EmptyCommand));
	}

	#[test]
	fn test_pipeline_preserves_order() {
		let pipeline = Command::pipeline([
			Command::new(["SET", "a", "1"]).unwrap(),
			Command::new(["GET", "a"]).unwrap(),
		])
		.unwrap();

		assert_eq!(pipeline.len(), 2);
		assert!(pipeline.is_pipelined());
		assert_eq!(pipeline.to_string(), "SET a 1 | GET a");
		assert_eq!(
			pipeline.encode(),
			b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n*2\r\n$3\r\nGET\r\n$1\r\na\r\n".as_slice()
		);
	}

	#[test]
	fn test_nested_pipeline_flattens() {
		let inner = Command::pipeline([
			Command::new(["INCR", "n"]).unwrap(),
			Command::new(["INCR", "n"]).unwrap(),
		])
		.unwrap();
		let outer = Command::pipeline([inner, Command::new(["GET", "n"]).unwrap()]).unwrap();
		assert_eq!(outer.len(), 3);
		assert_eq!(outer.to_string(), "INCR n | INCR n | GET n");
	}

	#[test]
	fn test_empty_pipeline() {
		assert_eq!(Command::pipeline([]), Err(EncodeError::EmptyPipeline));
	}
}
