//! Decoded reply values.

use bytes::Bytes;

/// The decoded result of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
	/// Status reply carrying no payload: `+OK\r\n`
	Success,

	/// Bulk string: `$6\r\nfoobar\r\n`, `None` for `$-1\r\n`
	Data(Option<Bytes>),

	/// Integer: `:1000\r\n`
	Integer(i64),

	/// Bulk string holding a number: `$4\r\n3.14\r\n`
	Float(f64),

	/// Status text: `+PONG\r\n`
	Word(String),

	/// Array of bulk strings: `*2\r\n$3\r\nfoo\r\n$-1\r\n`
	Array(Vec<Option<Bytes>>),
}

/// Which decoder to run for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyKind {
	Success,
	Data,
	Integer,
	Float,
	Word,
	Array,
}

impl Reply {
	/// Check if the value is a nil bulk string
	pub fn is_nil(&self) -> bool {
		matches!(self, Reply::Data(None))
	}

	/// Try to convert to a string slice
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Reply::Data(Some(b)) => std::str::from_utf8(b).ok(),
			Reply::Word(w) => Some(w),
			_ => None,
		}
	}

	/// Try to convert to bytes
	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			Reply::Data(Some(b)) => Some(b),
			_ => None,
		}
	}

	/// Try to convert to integer
	pub fn as_integer(&self) -> Option<i64> {
		match self {
			Reply::Integer(i) => Some(*i),
			_ => None,
		}
	}

	/// Try to convert to float
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Reply::Float(f) => Some(*f),
			_ => None,
		}
	}

	pub fn as_word(&self) -> Option<&str> {
		match self {
			Reply::Word(w) => Some(w),
			_ => None,
		}
	}

	/// Try to convert to array
	pub fn as_array(&self) -> Option<&[Option<Bytes>]> {
		match self {
			Reply::Array(a) => Some(a),
			_ => None,
		}
	}

	/// Convert to String with lossy UTF-8 conversion
	pub fn to_string_lossy(&self) -> Option<String> {
		match self {
			Reply::Data(Some(b)) => Some(String::from_utf8_lossy(b).into_owned()),
			Reply::Word(w) => Some(w.clone()),
			_ => None,
		}
	}

	/// Try to consume and convert to the array elements
	pub fn into_array(self) -> Option<Vec<Option<Bytes>>> {
		match self {
			Reply::Array(a) => Some(a),
			_ => None,
		}
	}
}
