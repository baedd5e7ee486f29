//! Tracing subscriber setup shared by both binaries.

use crate::config::DEFAULT_LOG_LEVEL;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. The verbosity is taken from the
/// `LOG_LEVEL` environment variable and defaults to `info`.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_env("LOG_LEVEL")
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.init();
}
