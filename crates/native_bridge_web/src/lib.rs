//! Browser (`wasm32`) implementations of the [`native_bridge`] transport and diagnostics
//! contracts, plus the JavaScript-facing `NativeBridge` class.
//!
//! DOM access stays inside `bridge`, which routes to the wasm implementation or a non-wasm
//! fallback reporting the capability as unavailable.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time transport selection and registry factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod diagnostics;
#[cfg(target_arch = "wasm32")]
pub mod js_api;
pub mod transport;
pub mod values;

pub use adapters::{
    build_registry, default_diagnostics, selected_transport_strategy, transport_strategy_name,
    TransportAdapter, TransportStrategy,
};
pub use diagnostics::AlertDiagnostics;
#[cfg(target_arch = "wasm32")]
pub use js_api::{install_native_bridge, JsNativeBridge};
pub use transport::IframeTransport;
