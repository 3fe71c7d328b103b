//! Host-side dispatch failures.

use native_bridge::SignalError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure to turn an intercepted signal into a delivery.
///
/// None of these are sent back to the script; the pending continuation, if any, stays unresolved.
pub enum HostError {
    /// The intercepted URL carried the bridge scheme but was malformed.
    #[error("malformed bridge signal: {0}")]
    Signal(#[from] SignalError),
    /// No native handler is registered under the requested name.
    #[error("no native handler registered for `{0}`")]
    UnknownFunction(String),
    /// The native handler reported a failure.
    #[error("native handler `{function}` failed: {reason}")]
    Handler {
        /// Function that failed.
        function: String,
        /// Handler diagnostic.
        reason: String,
    },
}
