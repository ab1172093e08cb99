//! Client configuration: file, then command-line overrides.
//!
//! # Example
//!
//! ```no_run
//! use redpipe::config::{Cli, Parser, load};
//!
//! let cli = Cli::parse();
//! let config = load(&cli).unwrap();
//! println!("Connecting to {}", config.addr());
//! ```

use std::path::Path;
use std::time::Duration;

pub use clap::Parser;
use resp::DEFAULT_MAX_BULK_LEN;
use resp::DecodeOptions;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Configuration file used when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "conf/redpipe.toml";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Failed to read configuration file '{path}': {source}")]
	Io {
		source: std::io::Error,
		path: String,
	},

	#[error("Failed to parse TOML configuration: {0}")]
	TomlParse(#[from] toml::de::Error),

	#[error("Failed to parse JSON configuration: {0}")]
	JsonParse(#[from] serde_json::Error),

	#[error("Failed to parse YAML configuration: {0}")]
	YamlParse(#[from] serde_yaml::Error),

	#[error("Unsupported configuration format: {0}")]
	UnsupportedFormat(String),

	#[error("Configuration file has no extension")]
	NoExtension,
}

/// Send a command (or a pipeline of commands) and print the replies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// Configuration file path (TOML, JSON, or YAML).
	/// Defaults to conf/redpipe.toml if it exists.
	#[arg(short, long)]
	pub config: Option<String>,

	/// Server host
	#[arg(long)]
	pub host: Option<String>,

	/// Server port
	#[arg(short, long)]
	pub port: Option<u16>,

	/// Per-operation timeout in milliseconds
	#[arg(short, long)]
	pub timeout_ms: Option<u64>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long)]
	pub log_level: Option<String>,

	/// Treat `;` as a separator and send the commands pipelined
	#[arg(long)]
	pub pipeline: bool,

	/// Command name and arguments
	#[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
	pub words: Vec<String>,
}

impl Cli {
	/// The argument lists of the commands to send, in order.
	///
	/// Without `--pipeline` all words form a single command.
	pub fn command_words(&self) -> Vec<&[String]> {
		if !self.pipeline {
			return vec![self.words.as_slice()];
		}
		self.words
			.split(|w| w == ";")
			.filter(|group| !group.is_empty())
			.collect()
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
	pub host: String,
	pub port: u16,
	pub connect_timeout_ms: u64,
	pub operation_timeout_ms: u64,
	pub max_bulk_len: usize,
	pub log_level: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".into(),
			port: 6379,
			connect_timeout_ms: 5000,
			operation_timeout_ms: 5000,
			max_bulk_len: DEFAULT_MAX_BULK_LEN,
			log_level: "info".into(),
		}
	}
}

impl ClientConfig {
	pub fn addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}

	pub fn connect_timeout(&self) -> Duration {
		Duration::from_millis(self.connect_timeout_ms)
	}

	pub fn operation_timeout(&self) -> Duration {
		Duration::from_millis(self.operation_timeout_ms)
	}

	pub fn decode_options(&self) -> DecodeOptions {
		DecodeOptions {
			max_bulk_len: self.max_bulk_len,
		}
	}
}

/// Build the effective configuration for `cli`.
pub fn load(cli: &Cli) -> Result<ClientConfig, ConfigError> {
	let mut config = match cli.config.as_deref() {
		Some(p) => load_from_file(p)?,
		None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from_file(DEFAULT_CONFIG_PATH)?,
		None => ClientConfig::default(),
	};

	// Explicit CLI arguments win over the file
	if let Some(host) = &cli.host {
		config.host = host.clone();
	}
	if let Some(port) = cli.port {
		config.port = port;
	}
	if let Some(ms) = cli.timeout_ms {
		config.operation_timeout_ms = ms;
	}
	if let Some(level) = &cli.log_level {
		config.log_level = level.clone();
	}
	Ok(config)
}

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
	let path_ref = path.as_ref();
	let content = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
		path: path_ref.display().to_string(),
		source,
	})?;

	let extension = path_ref
		.extension()
		.and_then(|ext| ext.to_str())
		.ok_or(ConfigError::NoExtension)?;

	match extension.to_lowercase().as_str() {
		"toml" => Ok(toml::from_str(&content)?),
		"json" => Ok(serde_json::from_str(&content)?),
		"yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
		_ => Err(ConfigError::UnsupportedFormat(extension.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn write_config(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
		let dir = tempfile::tempdir().unwrap();
		let file_path = dir.path().join(name);
		std::fs::write(&file_path, content).unwrap();
		(dir, file_path)
	}

	#[test]
	fn test_defaults() {
		let config = ClientConfig::default();
		assert_eq!(config.addr(), "127.0.0.1:6379");
		assert_eq!(config.operation_timeout(), Duration::from_secs(5));
		assert_eq!(config.decode_options(), DecodeOptions::default());
	}

	#[rstest]
	#[case(
		"config.toml",
		"host = \"10.0.0.5\"\nport = 7000\noperation_timeout_ms = 250\nlog_level = \"debug\"\n"
	)]
	#[case(
		"config.json",
		r#"{"host": "10.0.0.5", "port": 7000, "operation_timeout_ms": 250, "log_level": "debug"}"#
	)]
	#[case(
		"config.yaml",
		"host: \"10.0.0.5\"\nport: 7000\noperation_timeout_ms: 250\nlog_level: \"debug\"\n"
	)]
	fn test_parse_formats(#[case] name: &str, #[case] content: &str) {
		let (_dir, path) = write_config(name, content);
		let config = load_from_file(&path).unwrap();
		assert_eq!(config.addr(), "10.0.0.5:7000");
		assert_eq!(config.operation_timeout(), Duration::from_millis(250));
		assert_eq!(config.log_level, "debug");
		// Unset fields keep their defaults
		assert_eq!(config.connect_timeout_ms, 5000);
		assert_eq!(config.max_bulk_len, DEFAULT_MAX_BULK_LEN);
	}

	#[test]
	fn test_unsupported_extension() {
		let (_dir, path) = write_config("config.ini", "port = 1");
		assert!(matches!(
			load_from_file(&path),
			Err(ConfigError::UnsupportedFormat(ext)) if ext == "ini"
		));

		let (_dir, path) = write_config("config", "port = 1");
		assert!(matches!(load_from_file(&path), Err(ConfigError::NoExtension)));
	}

	#[test]
	fn test_missing_file() {
		assert!(matches!(
			load_from_file("/nonexistent/redpipe.toml"),
			Err(ConfigError::Io { .. })
		));
	}

	#[test]
	fn test_cli_overrides_file() {
		let (_dir, path) = write_config("config.toml", "host = \"10.0.0.5\"\nport = 7000\n");
		let cli = Cli::try_parse_from([
			"redpipe",
			"--config",
			path.to_str().unwrap(),
			"--port",
			"7001",
			"--timeout-ms",
			"100",
			"GET",
			"a",
		])
		.unwrap();

		let config = load(&cli).unwrap();
		assert_eq!(config.addr(), "10.0.0.5:7001");
		assert_eq!(config.operation_timeout_ms, 100);
	}

	#[rstest]
	#[case(&["redpipe", "GET", "a"], vec![vec!["GET", "a"]])]
	#[case(&["redpipe", "SET", "a", ";", "b"], vec![vec!["SET", "a", ";", "b"]])]
	#[case(
		&["redpipe", "--pipeline", "SET", "a", "1", ";", "GET", "a", ";"],
		vec![vec!["SET", "a", "1"], vec!["GET", "a"]]
	)]
	#[case(&["redpipe", "--pipeline", "INCRBY", "n", "-5"], vec![vec!["INCRBY", "n", "-5"]])]
	fn test_command_words(#[case] args: &[&str], #[case] expected: Vec<Vec<&str>>) {
		let cli = Cli::try_parse_from(args).unwrap();
		let words: Vec<Vec<&str>> = cli
			.command_words()
			.into_iter()
			.map(|group| group.iter().map(String::as_str).collect())
			.collect();
		assert_eq!(words, expected);
	}

	#[test]
	fn test_command_is_required() {
		assert!(Cli::try_parse_from(["redpipe", "--port", "7000"]).is_err());
	}
}
