//! Script-side correlation bridge for embedded webviews that can only signal their host through
//! fire-and-forget channels.
//!
//! [`BridgeRegistry::invoke_with`] encodes a call into a signal string, registers a continuation
//! under a fresh [`CallId`], and hands the signal to a [`Transport`]. The host later answers by
//! calling [`BridgeRegistry::deliver`] with the same identifier. Browser transports and the
//! JavaScript-facing entry point live in `native_bridge_web`; host-side decoding and dispatch live
//! in `native_bridge_host`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod call_id;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod registry;
pub mod results;
pub mod signal;
pub mod transport;

pub use call_id::CallId;
pub use config::{
    BridgeConfig, DEFAULT_DELIVER_METHOD, DEFAULT_GLOBAL_NAME, DEFAULT_PENDING_WARN_THRESHOLD,
};
pub use diagnostics::{ContinuationFailure, DiagnosticsSink, MemoryDiagnostics, TracingDiagnostics};
pub use error::{CallError, ConfigError, InvokeError, SignalError};
pub use registry::{BridgeRegistry, Continuation, DeliveryOutcome};
pub use results::{ContinuationError, ResultValues};
pub use signal::{
    format_signal, is_bridge_signal, validate_function_name, CallSignal, EncodedArgs,
    DEFAULT_SCHEME, SIGNAL_DELIMITER,
};
pub use transport::{ChannelTransport, NoopTransport, RecordingTransport, Transport};
