//! Shared tracing setup for fleetgate binaries.

/// Initialize process-wide tracing, choosing the format from
/// `FLEETGATE_LOG_FORMAT` (`json` when unset).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Initialize with an explicit format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::LogFormat;
