//! Developer-facing diagnostics for browser builds.

use native_bridge::{ContinuationFailure, DiagnosticsSink, TracingDiagnostics};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Sink that surfaces continuation failures in a blocking alert dialog.
///
/// Intrusive on purpose and meant for development builds. Every failure is also traced, and
/// targets without a DOM fall back to tracing alone.
pub struct AlertDiagnostics;

impl DiagnosticsSink for AlertDiagnostics {
    fn continuation_failed(&self, failure: &ContinuationFailure) {
        TracingDiagnostics.continuation_failed(failure);
        let message = format!(
            "Bridge callback for `{}` (call {}) failed: {}",
            failure.function, failure.call_id, failure.error
        );
        if let Err(err) = bridge::alert(&message) {
            tracing::debug!(error = %err, "alert diagnostics unavailable");
        }
    }
}
