//! Bridge configuration shared by the script-side registry and host interceptors.
//!
//! Both sides must agree on the scheme tag and the global entry point name, so hosts usually
//! load the same JSON document the script side was built with.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signal::DEFAULT_SCHEME;

/// Global object name the host calls back into.
pub const DEFAULT_GLOBAL_NAME: &str = "NativeBridge";
/// Method on the global object the host calls to deliver results.
pub const DEFAULT_DELIVER_METHOD: &str = "resultForCallback";
/// Pending-table size above which the registry emits a warning.
pub const DEFAULT_PENDING_WARN_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Wire-level settings for one bridge instance.
pub struct BridgeConfig {
    /// Scheme tag prefixed to every encoded call signal.
    pub scheme: String,
    /// Name of the script global exposing the delivery entry point.
    pub global_name: String,
    /// Method name of the delivery entry point on [`BridgeConfig::global_name`].
    pub deliver_method: String,
    /// Warn once the number of unresolved calls grows past this size; `None` disables it.
    pub pending_warn_threshold: Option<usize>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            global_name: DEFAULT_GLOBAL_NAME.to_string(),
            deliver_method: DEFAULT_DELIVER_METHOD.to_string(),
            pending_warn_threshold: Some(DEFAULT_PENDING_WARN_THRESHOLD),
        }
    }
}

impl BridgeConfig {
    /// Parses and validates a JSON config document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or a field fails [`BridgeConfig::validate`].
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field can be used on the wire.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_url_scheme(&self.scheme) {
            return Err(ConfigError::Invalid {
                field: "scheme",
                reason: format!(
                    "`{}` must start with an ASCII letter followed by letters, digits, `+`, `-`, or `.`",
                    self.scheme
                ),
            });
        }
        if !is_js_identifier(&self.global_name) {
            return Err(ConfigError::Invalid {
                field: "globalName",
                reason: format!("`{}` is not a JavaScript identifier", self.global_name),
            });
        }
        if !is_js_identifier(&self.deliver_method) {
            return Err(ConfigError::Invalid {
                field: "deliverMethod",
                reason: format!("`{}` is not a JavaScript identifier", self.deliver_method),
            });
        }
        Ok(())
    }
}

fn is_url_scheme(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_js_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || matches!(first, '_' | '$'))
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$'))
}
