use std::time::Duration;

use dingbridge_domain::DingBridgeError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`; defaults to `info`. Output goes to stderr so command
/// results on stdout stay machine-readable. Calling this twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"messaging::send_ding_message"`).
/// * `elapsed` - Duration the command execution took.
/// * `error` - The failure, if the command did not succeed.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&DingBridgeError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Convert a `DingBridgeError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &DingBridgeError) -> &'static str {
    error.kind()
}
