use std::rc::Rc;

use native_bridge::{
    BridgeConfig, BridgeRegistry, ConfigError, DiagnosticsSink, RecordingTransport, Transport,
};

use crate::IframeTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected transport strategy for browser registries.
pub enum TransportStrategy {
    /// Signals are loaded in a throwaway child frame for the host to intercept.
    Iframe,
    /// Signals are kept in memory; used off `wasm32` and in headless test builds.
    Recording,
}

/// Returns the compile-time selected transport strategy for the active build.
pub const fn selected_transport_strategy() -> TransportStrategy {
    #[cfg(any(feature = "recording-transport", not(target_arch = "wasm32")))]
    {
        TransportStrategy::Recording
    }

    #[cfg(all(not(feature = "recording-transport"), target_arch = "wasm32"))]
    {
        TransportStrategy::Iframe
    }
}

/// Returns the selected transport strategy as a stable string token.
pub fn transport_strategy_name() -> &'static str {
    match selected_transport_strategy() {
        TransportStrategy::Iframe => "iframe",
        TransportStrategy::Recording => "recording",
    }
}

/// Adapter enum that erases the concrete signal transport behind [`Transport`].
#[derive(Debug, Clone)]
pub enum TransportAdapter {
    /// Child-frame navigation transport.
    Iframe(IframeTransport),
    /// In-memory transport.
    Recording(RecordingTransport),
}

impl TransportAdapter {
    /// Builds the adapter for [`selected_transport_strategy`].
    pub fn selected() -> Self {
        match selected_transport_strategy() {
            TransportStrategy::Iframe => Self::Iframe(IframeTransport),
            TransportStrategy::Recording => Self::Recording(RecordingTransport::default()),
        }
    }
}

impl Transport for TransportAdapter {
    fn send(&self, signal: &str) -> Result<(), String> {
        match self {
            Self::Iframe(transport) => transport.send(signal),
            Self::Recording(transport) => transport.send(signal),
        }
    }
}

/// Returns the diagnostics sink for the active build: alert dialogs in debug browser builds,
/// `tracing` everywhere else.
pub fn default_diagnostics() -> Rc<dyn DiagnosticsSink> {
    #[cfg(all(target_arch = "wasm32", debug_assertions))]
    {
        Rc::new(crate::AlertDiagnostics)
    }

    #[cfg(not(all(target_arch = "wasm32", debug_assertions)))]
    {
        Rc::new(native_bridge::TracingDiagnostics)
    }
}

/// Builds a registry wired to the selected transport and default diagnostics.
///
/// # Errors
///
/// Returns an error when `config` fails validation.
pub fn build_registry(config: BridgeConfig) -> Result<BridgeRegistry, ConfigError> {
    config.validate()?;
    Ok(BridgeRegistry::with_config(
        config,
        Rc::new(TransportAdapter::selected()),
        default_diagnostics(),
    ))
}
