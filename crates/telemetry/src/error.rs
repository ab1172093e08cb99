use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
	#[error("Invalid log level: {0}. Valid levels: trace, debug, info, warn, error")]
	InvalidLogLevel(String),

	#[error("Logger not initialized")]
	NotInitialized,

	#[error("Logger already initialized")]
	AlreadyInitialized,

	#[error("Failed to reload log level: {0}")]
	ReloadFailed(String),
}
