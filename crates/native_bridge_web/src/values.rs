//! Value lists crossing the script boundary.
//!
//! Script values are turned into JSON with the page's own `JSON.stringify`, which rejects cyclic
//! structures and drops `undefined` and functions. The text is then parsed here, so this half
//! stays testable off `wasm32`.

use native_bridge::InvokeError;
use serde_json::Value;

/// Output of `JSON.stringify` on one script value: `Ok(None)` when the value has no JSON form
/// (`undefined`, functions), `Err` with the thrown message when serialization failed.
pub type Stringified = Result<Option<String>, String>;

/// Parses a stringified script value into an ordered value list.
///
/// `undefined` and `null` become an empty list. Anything other than an array is rejected.
///
/// # Errors
///
/// Returns a diagnostic when serialization failed or the value is not an array.
pub fn value_list(stringified: Stringified) -> Result<Vec<Value>, String> {
    let Some(text) = stringified? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&text).map_err(|err| err.to_string())? {
        Value::Null => Ok(Vec::new()),
        Value::Array(values) => Ok(values),
        _ => Err("expected an array of values".to_string()),
    }
}

/// Parses call arguments, reporting failures the way the registry does.
///
/// # Errors
///
/// Returns [`InvokeError::Encoding`] for cyclic or otherwise unserializable arguments and for
/// arguments that are not an array.
pub fn call_args(function: &str, stringified: Stringified) -> Result<Vec<Value>, InvokeError> {
    value_list(stringified).map_err(|reason| InvokeError::Encoding {
        function: function.to_string(),
        reason,
    })
}
