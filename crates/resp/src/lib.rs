//! # RESP - client side of the Redis Serialization Protocol
//!
//! Encodes commands into the request format a server expects and decodes the
//! server's replies incrementally, straight off an async byte stream, without
//! waiting for a whole reply to be buffered.
//!
//! ## Features
//!
//! - **Incremental decoding**: a reply may span any number of transport reads
//! - **Pipelining**: several commands encoded back to back, replies decoded in
//!   send order
//! - **Typed decoders**: status, bulk string, integer, float, word, array of
//!   bulk strings
//! - **Diagnostics**: the last command and the last decode step are recorded
//!   for error reports
//!
//! ## Example
//!
//! ```rust
//! use resp::{Command, DecodeOptions, DecoderSession, Diagnostics, ReadBuffer, RespEncoder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cmd = Command::new(["SET", "a", "1"]).unwrap();
//! assert_eq!(&cmd.encode()[..], b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n");
//!
//! let mut source = ReadBuffer::new(&b"+OK\r\n"[..]);
//! let mut diagnostics = Diagnostics::new();
//! diagnostics.set_last_command(cmd.as_str());
//! let mut session = DecoderSession::new(&mut source, &mut diagnostics, DecodeOptions::default());
//! session.expect_success().await.unwrap();
//! # }
//! ```

mod buffer;
mod decoder;
pub mod diagnostics;
mod encode;
mod error;
pub mod line;
mod types;
mod utils;

pub use buffer::ReadBuffer;
pub use decoder::DEFAULT_MAX_BULK_LEN;
pub use decoder::DecodeOptions;
pub use decoder::DecoderSession;
pub use diagnostics::Diagnostics;
pub use encode::Command;
pub use encode::RespEncoder;
pub use error::EncodeError;
pub use error::OperationTimeout;
pub use error::ParseError;
pub use error::RespError;
pub use types::Reply;
pub use types::ReplyKind;
