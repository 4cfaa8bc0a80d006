//! Failure reporting collaborator.

use crate::{Error, TRACING_TARGET};

/// Log channel used when the dispatcher is not given one.
pub const DEFAULT_CHANNEL: &str = "rest_post";

/// Receives dispatch failures.
///
/// The dispatcher calls [`log`](DispatchLogger::log) exactly once for every
/// transport fault or unexpected status. Configuration errors are returned to
/// the caller without being logged.
pub trait DispatchLogger: Send + Sync {
    /// Records a failed dispatch on the given channel.
    fn log(&self, channel: &str, error: &Error);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl DispatchLogger for TracingLogger {
    fn log(&self, channel: &str, error: &Error) {
        tracing::error!(
            target: TRACING_TARGET,
            channel,
            kind = error.kind_str(),
            status = ?error.status,
            error = %error,
            "Dispatch failed"
        );
    }
}
