//! Line terminator scanning over buffered reply bytes.

use memchr::memchr_iter;

/// Find the position of CRLF in a byte slice
#[inline]
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
	memchr_iter(b'\r', buf).find(|&pos| buf.get(pos + 1) == Some(&b'\n'))
}

/// Incremental CRLF search that remembers how far it has already looked.
///
/// The view handed to [`LineScanner::scan`] must only grow between calls
/// (new bytes appended, nothing consumed); call [`LineScanner::reset`] after
/// advancing the underlying buffer.
#[derive(Debug, Default)]
pub struct LineScanner {
	scanned: usize,
}

impl LineScanner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Return the offset of the CR of the first terminator in `view`.
	pub fn scan(&mut self, view: &[u8]) -> Option<usize> {
		// Back up one byte so a CR left at the previous end is re-examined.
		let start = self.scanned.saturating_sub(1).min(view.len());
		match find_crlf(&view[start..]) {
			Some(pos) => Some(start + pos),
			None => {
				self.scanned = view.len();
				None
			}
		}
	}

	pub fn reset(&mut self) {
		self.scanned = 0;
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(b"hello\r\n", Some(5))]
	#[case(b"hello", None)]
	#[case(b"\r\n", Some(0))]
	#[case(b"a\rb\r\n", Some(3))]
	#[case(b"trailing\r", None)]
	fn test_find_crlf(#[case] input: &[u8], #[case] expected: Option<usize>) {
		assert_eq!(find_crlf(input), expected);
	}

	#[test]
	fn test_scanner_resumes_across_growth() {
		let mut scanner = LineScanner::new();
		let mut view = b"$12".to_vec();
		assert_eq!(scanner.scan(&view), None);

		view.extend_from_slice(b"\r");
		assert_eq!(scanner.scan(&view), None);

		view.extend_from_slice(b"\nabc");
		assert_eq!(scanner.scan(&view), Some(3));
	}

	#[test]
	fn test_scanner_reset() {
		let mut scanner = LineScanner::new();
		assert_eq!(scanner.scan(b"abcdef"), None);
		scanner.reset();
		assert_eq!(scanner.scan(b"\r\n"), Some(0));
	}
}
