//! Utility functions and constants for RESP protocol.

use crate::error::ParseError;

/// CRLF line ending
pub const CRLF: &[u8] = b"\r\n";

/// Reply type markers
pub const SIMPLE_STRING: u8 = b'+';
pub const ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK_STRING: u8 = b'$';
pub const ARRAY: u8 = b'*';

/// Render a raw line for error messages.
#[inline]
pub fn lossy(line: &[u8]) -> String {
	String::from_utf8_lossy(line).into_owned()
}

/// Parse the numeric part of a length or count line (marker excluded).
///
/// A single digit is read directly; anything else goes through the general
/// signed parse. Both paths agree for every one-digit value.
#[inline]
pub fn parse_length(digits: &[u8]) -> Result<i64, ParseError> {
	match digits {
		[d @ b'0'..=b'9'] => Ok((d - b'0') as i64),
		_ => parse_signed(digits).ok_or_else(|| ParseError::InvalidLength(lossy(digits))),
	}
}

/// Parse an integer reply payload (marker excluded).
#[inline]
pub fn parse_integer(digits: &[u8]) -> Result<i64, ParseError> {
	match digits {
		[d @ b'0'..=b'9'] => Ok((d - b'0') as i64),
		_ => parse_signed(digits).ok_or_else(|| ParseError::InvalidInteger(lossy(digits))),
	}
}

/// Parse a float from a byte slice
#[inline]
pub fn parse_float(buf: &[u8]) -> Result<f64, ParseError> {
	let s = std::str::from_utf8(buf).map_err(|_| ParseError::InvalidFloat(lossy(buf)))?;

	match s {
		"inf" | "+inf" => Ok(f64::INFINITY),
		"-inf" => Ok(f64::NEG_INFINITY),
		_ => s
			.parse::<f64>()
			.map_err(|e| ParseError::InvalidFloat(format!("{s}: {e}"))),
	}
}

fn parse_signed(digits: &[u8]) -> Option<i64> {
	std::str::from_utf8(digits).ok()?.parse::<i64>().ok()
}
