//! Result deliveries rendered as scripts for the webview to evaluate.

use native_bridge::{BridgeConfig, CallId};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
/// Results the host owes one pending script-side call.
pub struct Delivery {
    /// Identifier copied from the intercepted signal.
    pub call_id: CallId,
    /// Positional results handed to the continuation.
    pub results: Vec<Value>,
}

impl Delivery {
    /// Creates a delivery for `call_id`.
    pub fn new(call_id: CallId, results: Vec<Value>) -> Self {
        Self { call_id, results }
    }

    /// Renders the script that invokes the delivery entry point named by `config`.
    ///
    /// The results are embedded as a JSON array literal with U+2028/U+2029 escaped, since older
    /// engines reject them inside string literals.
    pub fn to_script(&self, config: &BridgeConfig) -> String {
        let results = Value::from(self.results.as_slice())
            .to_string()
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029");
        format!(
            "window.{}.{}({},{});",
            config.global_name, config.deliver_method, self.call_id, results
        )
    }
}
