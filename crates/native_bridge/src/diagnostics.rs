//! Diagnostics sinks receiving continuation failures isolated at the delivery boundary.

use std::{cell::RefCell, rc::Rc};

use crate::call_id::CallId;
use crate::results::ContinuationError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A continuation that failed while handling delivered results.
pub struct ContinuationFailure {
    /// Identifier the host delivered to.
    pub call_id: CallId,
    /// Function the original call targeted.
    pub function: String,
    /// Failure reported by the continuation.
    pub error: ContinuationError,
}

/// Sink for failures that must not propagate back to the host's delivery call site.
pub trait DiagnosticsSink {
    /// Records one continuation failure.
    fn continuation_failed(&self, failure: &ContinuationFailure);
}

#[derive(Debug, Clone, Copy, Default)]
/// Sink emitting failures as `tracing` error events.
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn continuation_failed(&self, failure: &ContinuationFailure) {
        tracing::error!(
            call_id = %failure.call_id,
            function = %failure.function,
            error = %failure.error,
            "bridge continuation failed"
        );
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory sink keeping every reported failure.
pub struct MemoryDiagnostics {
    failures: Rc<RefCell<Vec<ContinuationFailure>>>,
}

impl MemoryDiagnostics {
    /// Returns a copy of every recorded failure.
    pub fn failures(&self) -> Vec<ContinuationFailure> {
        self.failures.borrow().clone()
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn continuation_failed(&self, failure: &ContinuationFailure) {
        self.failures.borrow_mut().push(failure.clone());
    }
}
