//! Signal interception and native dispatch.

use native_bridge::{is_bridge_signal, BridgeConfig, CallSignal};

use crate::delivery::Delivery;
use crate::error::HostError;
use crate::handlers::HandlerRegistry;

#[derive(Debug, Clone, PartialEq)]
/// Result of inspecting one navigation request.
pub enum Interception {
    /// Not a bridge signal; the navigation should proceed.
    Ignored,
    /// A bridge signal was handled; the navigation should be cancelled. Fire-and-forget calls
    /// carry no delivery.
    Handled(Option<Delivery>),
}

#[derive(Debug, Clone, PartialEq)]
/// What a webview navigation hook should do with one request.
pub struct NavigationDecision {
    /// Whether the navigation may proceed. Bridge signals are always cancelled.
    pub allow: bool,
    /// Script to evaluate in the signalling webview, if the call expects results.
    pub delivery: Option<Delivery>,
}

#[derive(Debug, Clone)]
/// Decodes intercepted signals and runs the matching native handler.
pub struct HostDispatcher {
    config: BridgeConfig,
    handlers: HandlerRegistry,
}

impl HostDispatcher {
    /// Creates a dispatcher for signals encoded under `config`.
    pub fn new(config: BridgeConfig, handlers: HandlerRegistry) -> Self {
        Self { config, handlers }
    }

    /// Returns the wire config shared with the script side.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Inspects a navigation URL and dispatches it when it is a bridge signal.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] for malformed signals, unknown functions, and handler failures.
    /// The navigation should be cancelled in those cases too.
    pub fn intercept(&self, url: &str) -> Result<Interception, HostError> {
        if !is_bridge_signal(url, &self.config.scheme) {
            return Ok(Interception::Ignored);
        }
        let signal = CallSignal::decode(url, &self.config.scheme)?;
        self.dispatch(signal).map(Interception::Handled)
    }

    /// Decides a webview navigation request. Regular URLs proceed; bridge signals are cancelled
    /// whether or not they could be dispatched, and failures are logged.
    pub fn decide_navigation(&self, url: &str) -> NavigationDecision {
        match self.intercept(url) {
            Ok(Interception::Ignored) => NavigationDecision {
                allow: true,
                delivery: None,
            },
            Ok(Interception::Handled(delivery)) => NavigationDecision {
                allow: false,
                delivery,
            },
            Err(err) => {
                tracing::warn!(error = %err, "rejected bridge signal");
                NavigationDecision {
                    allow: false,
                    delivery: None,
                }
            }
        }
    }

    /// Runs the native handler for an already decoded signal.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] when no handler matches or the handler fails.
    pub fn dispatch(&self, signal: CallSignal) -> Result<Option<Delivery>, HostError> {
        let CallSignal {
            function,
            call_id,
            args,
        } = signal;
        let handler = self
            .handlers
            .get(&function)
            .ok_or_else(|| HostError::UnknownFunction(function.clone()))?;

        tracing::debug!(function = %function, %call_id, "dispatching bridge call");
        let results =
            handler(args).map_err(|reason| HostError::Handler { function, reason })?;

        if call_id.is_fire_and_forget() {
            return Ok(None);
        }
        Ok(Some(Delivery::new(call_id, results)))
    }
}

#[cfg(test)]
mod tests {
    use native_bridge::{CallId, SignalError};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;

    fn dispatcher() -> HostDispatcher {
        let handlers = HandlerRegistry::default()
            .with("readFile", |args| match args.first().and_then(Value::as_str) {
                Some(path) => Ok(vec![json!(format!("contents of {path}"))]),
                None => Err("readFile expects a path".to_string()),
            })
            .with("log", |_| Ok(Vec::new()));
        HostDispatcher::new(BridgeConfig::default(), handlers)
    }

    #[test]
    fn ignores_regular_navigation() {
        assert_eq!(
            dispatcher().intercept("https://example.com/index.html"),
            Ok(Interception::Ignored)
        );
    }

    #[test]
    fn dispatches_call_with_continuation() {
        assert_eq!(
            dispatcher().intercept("js-frame:readFile:1:%5B%22%2Ftmp%2Fx%22%5D"),
            Ok(Interception::Handled(Some(Delivery::new(
                CallId(1),
                vec![json!("contents of /tmp/x")]
            ))))
        );
    }

    #[test]
    fn fire_and_forget_produces_no_delivery() {
        assert_eq!(
            dispatcher().intercept("js-frame:log:0:%5B%22a%22%5D"),
            Ok(Interception::Handled(None))
        );
    }

    #[test]
    fn reports_unknown_functions_and_handler_failures() {
        assert_eq!(
            dispatcher().intercept("js-frame:deleteAll:3:%5B%5D"),
            Err(HostError::UnknownFunction("deleteAll".to_string()))
        );
        assert_eq!(
            dispatcher().intercept("js-frame:readFile:4:%5B%5D"),
            Err(HostError::Handler {
                function: "readFile".to_string(),
                reason: "readFile expects a path".to_string(),
            })
        );
    }

    #[test]
    fn navigation_decisions_cancel_every_bridge_signal() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.decide_navigation("https://example.com/index.html"),
            NavigationDecision {
                allow: true,
                delivery: None,
            }
        );
        assert_eq!(
            dispatcher.decide_navigation("js-frame:readFile:2:%5B%22%2Ftmp%2Fx%22%5D"),
            NavigationDecision {
                allow: false,
                delivery: Some(Delivery::new(
                    CallId(2),
                    vec![json!("contents of /tmp/x")]
                )),
            }
        );
        for rejected in [
            "js-frame:log:0:%5B%22a%22%5D",
            "js-frame:deleteAll:3:%5B%5D",
            "js-frame:readFile:one:%5B%5D",
        ] {
            assert_eq!(
                dispatcher.decide_navigation(rejected),
                NavigationDecision {
                    allow: false,
                    delivery: None,
                },
                "{rejected}"
            );
        }
    }

    #[test]
    fn reports_malformed_signals() {
        assert_eq!(
            dispatcher().intercept("js-frame:readFile:one:%5B%5D"),
            Err(HostError::Signal(SignalError::InvalidCallId("one".to_string())))
        );
    }
}
