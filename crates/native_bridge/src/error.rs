//! Typed errors raised by the script-side bridge.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Synchronous failure of [`crate::BridgeRegistry::invoke`] and friends.
///
/// Every variant leaves the pending table exactly as it was before the call.
pub enum InvokeError {
    /// Arguments could not be serialized into a JSON array.
    #[error("failed to encode arguments for `{function}`: {reason}")]
    Encoding {
        /// Function the caller attempted to invoke.
        function: String,
        /// Serializer diagnostic.
        reason: String,
    },
    /// Function name is empty or contains characters that cannot cross the signal boundary.
    #[error("invalid bridge function name `{function}`: {reason}")]
    InvalidFunctionName {
        /// Rejected function name.
        function: String,
        /// Validation diagnostic.
        reason: String,
    },
    /// The registry handed out every identifier representable on the script side.
    #[error("bridge call identifiers exhausted")]
    CallIdsExhausted,
    /// The transport refused to make the signal observable to the host.
    #[error("transport rejected call to `{function}`: {reason}")]
    Transport {
        /// Function the caller attempted to invoke.
        function: String,
        /// Transport diagnostic.
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure to decode an encoded call signal on the host side.
pub enum SignalError {
    /// The signal does not start with the configured scheme tag.
    #[error("signal does not use the `{expected}` scheme")]
    SchemeMismatch {
        /// Scheme tag the decoder was configured with.
        expected: String,
    },
    /// A mandatory positional field is missing.
    #[error("signal is missing the {0} field")]
    MissingField(&'static str),
    /// The call identifier field is not a non-negative integer.
    #[error("signal call id `{0}` is not a non-negative integer")]
    InvalidCallId(String),
    /// The argument payload is not valid percent-encoded UTF-8.
    #[error("signal arguments are not valid percent-encoded UTF-8: {0}")]
    InvalidEncoding(String),
    /// The argument payload is not a JSON array.
    #[error("signal arguments are not a JSON array: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Bridge configuration rejected while loading or validating.
pub enum ConfigError {
    /// Raw configuration text is not valid JSON for [`crate::BridgeConfig`].
    #[error("failed to parse bridge config: {0}")]
    Parse(String),
    /// A field holds a value the bridge cannot operate with.
    #[error("invalid bridge config field `{field}`: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Validation diagnostic.
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure of the future returned by [`crate::BridgeRegistry::call`].
pub enum CallError {
    /// The registry was dropped before the host delivered a result.
    #[error("bridge registry dropped before the call was resolved")]
    Dropped,
    /// Delivered results did not match the shape the caller expected.
    #[error("failed to decode call results: {0}")]
    Decode(String),
}
