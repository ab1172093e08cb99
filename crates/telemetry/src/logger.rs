use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TelemetryError;

/// Timestamps as "[YYYY-MM-DD HH:MM:SS.micros]" in local time.
struct LocalTime;

impl FormatTime for LocalTime {
	fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
		let now: chrono::DateTime<chrono::Local> = std::time::SystemTime::now().into();
		write!(w, "{}", now.format("[%Y-%m-%d %H:%M:%S%.6f]"))
	}
}

type ReloadHandle = reload::Handle<EnvFilter, Registry>;

static RELOAD_HANDLE: OnceLock<ReloadHandle> = OnceLock::new();

const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check a level name and return it lowercased.
fn normalize_level(level: &str) -> Result<String, TelemetryError> {
	let lower = level.to_lowercase();
	if VALID_LEVELS.contains(&lower.as_str()) {
		Ok(lower)
	} else {
		Err(TelemetryError::InvalidLogLevel(level.to_string()))
	}
}

/// Install the console logger at `level`.
///
/// `RUST_LOG`, when set, takes precedence so individual modules can be
/// turned up (e.g. `RUST_LOG=resp=trace` to follow every decode step).
///
/// # Example
///
/// ```no_run
/// telemetry::init("info").unwrap();
/// tracing::info!("Connected");
/// ```
pub fn init(level: &str) -> Result<(), TelemetryError> {
	let level = normalize_level(level)?;
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

	let (filter_layer, reload_handle) = reload::Layer::new(env_filter);

	tracing_subscriber::registry()
		.with(filter_layer)
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_timer(LocalTime)
				.with_target(true)
				.with_thread_ids(true)
				.with_line_number(false)
				.with_file(false),
		)
		.try_init()
		.map_err(|_| TelemetryError::AlreadyInitialized)?;

	RELOAD_HANDLE
		.set(reload_handle)
		.map_err(|_| TelemetryError::AlreadyInitialized)
}

/// Change the log level of an initialized logger.
///
/// # Errors
///
/// Fails if the level is not one of trace, debug, info, warn or error
/// (case-insensitive), or if [`init`] has not run.
pub fn reload_log_level(level: &str) -> Result<(), TelemetryError> {
	let level = normalize_level(level)?;
	let handle = RELOAD_HANDLE.get().ok_or(TelemetryError::NotInitialized)?;

	handle
		.reload(EnvFilter::new(&level))
		.map_err(|e| TelemetryError::ReloadFailed(e.to_string()))?;
	tracing::info!("Log level changed to {}", level);
	Ok(())
}
