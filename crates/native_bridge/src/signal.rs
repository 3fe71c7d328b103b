//! Encoded call signal format.
//!
//! A signal has the form `<scheme>:<function>:<call id>:<arguments>` where `<arguments>` is a
//! JSON array escaped exactly like JavaScript's `encodeURIComponent`. All four fields are
//! positional and mandatory; fire-and-forget calls carry the literal id `0`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;

use crate::call_id::CallId;
use crate::error::SignalError;

/// Scheme tag recognized by host interceptors unless configured otherwise.
pub const DEFAULT_SCHEME: &str = "js-frame";
/// Separator between the positional signal fields.
pub const SIGNAL_DELIMITER: char = ':';

// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Checks that `function` can be embedded in a signal unchanged.
///
/// Names must be non-empty and made of ASCII letters, digits, `_`, `-`, `.`, or `$`, so they
/// survive URL parsing on the host untouched and never contain the delimiter.
///
/// # Errors
///
/// Returns a diagnostic describing the first problem found.
pub fn validate_function_name(function: &str) -> Result<(), String> {
    if function.is_empty() {
        return Err("function name must not be empty".to_string());
    }
    match function
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '$')))
    {
        Some(c) => Err(format!("character `{c}` is not allowed")),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Percent-encoded JSON argument array ready to be placed in a signal.
pub struct EncodedArgs(String);

impl EncodedArgs {
    /// Serializes `args` and escapes the resulting JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error when `args` fails to serialize or does not serialize to an array.
    pub fn from_serialize<A: Serialize + ?Sized>(args: &A) -> Result<Self, String> {
        match serde_json::to_value(args).map_err(|err| err.to_string())? {
            array @ Value::Array(_) => Ok(Self::escape(&array.to_string())),
            other => Err(format!(
                "arguments must serialize to a JSON array, got {}",
                json_kind(&other)
            )),
        }
    }

    /// Escapes an already materialized argument list.
    pub fn from_values(values: &[Value]) -> Self {
        Self::escape(&Value::from(values).to_string())
    }

    fn escape(json: &str) -> Self {
        Self(utf8_percent_encode(json, URI_COMPONENT).to_string())
    }

    /// Returns the escaped payload.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Joins the positional fields into the signal string handed to a transport.
pub fn format_signal(scheme: &str, function: &str, call_id: CallId, args: &EncodedArgs) -> String {
    format!(
        "{scheme}{d}{function}{d}{call_id}{d}{args}",
        d = SIGNAL_DELIMITER,
        args = args.as_str()
    )
}

/// Returns `true` when `raw` carries the `scheme` tag, compared case-insensitively since URL
/// parsers lowercase schemes.
pub fn is_bridge_signal(raw: &str, scheme: &str) -> bool {
    strip_scheme(raw, scheme).is_some()
}

fn strip_scheme<'a>(raw: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix = raw.get(..scheme.len())?;
    if !prefix.eq_ignore_ascii_case(scheme) {
        return None;
    }
    raw[scheme.len()..].strip_prefix(SIGNAL_DELIMITER)
}

#[derive(Debug, Clone, PartialEq)]
/// Decoded form of a call signal.
pub struct CallSignal {
    /// Host-side function name.
    pub function: String,
    /// Correlation identifier, [`CallId::FIRE_AND_FORGET`] when no result is expected.
    pub call_id: CallId,
    /// Positional arguments.
    pub args: Vec<Value>,
}

impl CallSignal {
    /// Creates a signal from its parts.
    pub fn new(function: impl Into<String>, call_id: CallId, args: Vec<Value>) -> Self {
        Self {
            function: function.into(),
            call_id,
            args,
        }
    }

    /// Renders the signal string under `scheme`.
    pub fn encode(&self, scheme: &str) -> String {
        format_signal(
            scheme,
            &self.function,
            self.call_id,
            &EncodedArgs::from_values(&self.args),
        )
    }

    /// Parses a signal string previously produced under `scheme`.
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] naming the first malformed field.
    pub fn decode(raw: &str, scheme: &str) -> Result<Self, SignalError> {
        let rest = strip_scheme(raw, scheme).ok_or_else(|| SignalError::SchemeMismatch {
            expected: scheme.to_string(),
        })?;
        let mut fields = rest.splitn(3, SIGNAL_DELIMITER);
        let function = fields
            .next()
            .filter(|function| !function.is_empty())
            .ok_or(SignalError::MissingField("function"))?;
        let call_id = fields.next().ok_or(SignalError::MissingField("call id"))?;
        let payload = fields.next().ok_or(SignalError::MissingField("arguments"))?;

        let call_id = call_id
            .parse::<u64>()
            .map(CallId)
            .map_err(|_| SignalError::InvalidCallId(call_id.to_string()))?;
        let json = percent_decode_str(payload)
            .decode_utf8()
            .map_err(|err| SignalError::InvalidEncoding(err.to_string()))?;
        let args = serde_json::from_str::<Vec<Value>>(&json)
            .map_err(|err| SignalError::InvalidArguments(err.to_string()))?;

        Ok(Self::new(function, call_id, args))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
