//! Printing replies the way redis-cli does, and guessing which reply a
//! command produces.

use bytes::Bytes;
use resp::Reply;
use resp::ReplyKind;

/// Reply kind for a command name, by well-known command.
pub fn infer_kind(name: &str) -> ReplyKind {
	match name.to_ascii_uppercase().as_str() {
		"SET" | "MSET" | "FLUSHDB" | "FLUSHALL" | "SELECT" | "RENAME" | "AUTH" | "LSET"
		| "HMSET" => ReplyKind::Success,
		"PING" | "TYPE" => ReplyKind::Word,
		"DEL" | "EXISTS" | "INCR" | "DECR" | "INCRBY" | "DECRBY" | "APPEND" | "STRLEN"
		| "EXPIRE" | "TTL" | "PTTL" | "LPUSH" | "RPUSH" | "LLEN" | "SADD" | "SREM" | "SCARD"
		| "SISMEMBER" | "HSET" | "HDEL" | "HLEN" | "ZADD" | "ZREM" | "ZCARD" | "DBSIZE" => {
			ReplyKind::Integer
		}
		"INCRBYFLOAT" | "HINCRBYFLOAT" | "ZSCORE" | "ZINCRBY" => ReplyKind::Float,
		"KEYS" | "MGET" | "LRANGE" | "SMEMBERS" | "HKEYS" | "HVALS" | "HGETALL" | "HMGET"
		| "ZRANGE" => ReplyKind::Array,
		_ => ReplyKind::Data,
	}
}

/// Render a reply for the terminal.
pub fn format_reply(reply: &Reply) -> String {
	match reply {
		Reply::Success => "OK".to_string(),
		Reply::Word(word) => word.clone(),
		Reply::Integer(i) => format!("(integer) {}", i),
		Reply::Float(f) => format!("(double) {}", f),
		Reply::Data(value) => format_bulk(value.as_ref()),
		Reply::Array(items) if items.is_empty() => "(empty array)".to_string(),
		Reply::Array(items) => {
			let width = items.len().to_string().len();
			items
				.iter()
				.enumerate()
				.map(|(i, item)| format!("{:>width$}) {}", i + 1, format_bulk(item.as_ref())))
				.collect::<Vec<_>>()
				.join("\n")
		}
	}
}

/// `(nil)` or a quoted, escaped string.
fn format_bulk(value: Option<&Bytes>) -> String {
	let Some(bytes) = value else {
		return "(nil)".to_string();
	};

	let mut out = String::with_capacity(bytes.len() + 2);
	out.push('"');
	for &b in bytes.iter() {
		match b {
			b'"' => out.push_str("\\\""),
			b'\\' => out.push_str("\\\\"),
			b'\n' => out.push_str("\\n"),
			b'\r' => out.push_str("\\r"),
			b'\t' => out.push_str("\\t"),
			0x20..=0x7e => out.push(b as char),
			_ => out.push_str(&format!("\\x{:02x}", b)),
		}
	}
	out.push('"');
	out
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("set", ReplyKind::Success)]
	#[case("GET", ReplyKind::Data)]
	#[case("Del", ReplyKind::Integer)]
	#[case("INCR", ReplyKind::Integer)]
	#[case("PING", ReplyKind::Word)]
	#[case("KEYS", ReplyKind::Array)]
	#[case("mget", ReplyKind::Array)]
	#[case("LRANGE", ReplyKind::Array)]
	#[case("INCRBYFLOAT", ReplyKind::Float)]
	#[case("ZSCORE", ReplyKind::Float)]
	#[case("GETRANGE", ReplyKind::Data)]
	#[case("ECHO", ReplyKind::Data)]
	fn test_infer_kind(#[case] name: &str, #[case] expected: ReplyKind) {
		assert_eq!(infer_kind(name), expected);
	}

	#[rstest]
	#[case(Reply::Success, "OK")]
	#[case(Reply::Word("PONG".into()), "PONG")]
	#[case(Reply::Integer(-3), "(integer) -3")]
	#[case(Reply::Float(2.5), "(double) 2.5")]
	#[case(Reply::Data(None), "(nil)")]
	#[case(Reply::Data(Some(Bytes::from("hello"))), "\"hello\"")]
	#[case(Reply::Data(Some(Bytes::from_static(b"a\"b\n\xff"))), "\"a\\\"b\\n\\xff\"")]
	#[case(Reply::Array(vec![]), "(empty array)")]
	#[case(
		Reply::Array(vec![Some(Bytes::from("a")), None]),
		"1) \"a\"\n2) (nil)"
	)]
	fn test_format_reply(#[case] reply: Reply, #[case] expected: &str) {
		assert_eq!(format_reply(&reply), expected);
	}

	#[test]
	fn test_array_indices_are_aligned() {
		let items = (0..10).map(|i| Some(Bytes::from(i.to_string()))).collect();
		let out = format_reply(&Reply::Array(items));
		let lines: Vec<&str> = out.lines().collect();
		assert_eq!(lines[0], " 1) \"0\"");
		assert_eq!(lines[9], "10) \"9\"");
	}
}
