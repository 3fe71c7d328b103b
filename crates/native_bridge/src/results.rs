//! Result envelopes handed to continuations and the errors continuations may report.

use std::any::Any;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// Ordered result values delivered by the host for one call.
///
/// The host decides the arity; the call site destructures with [`ResultValues::decode`] into the
/// tuple or record shape it expects.
pub struct ResultValues(Vec<Value>);

impl ResultValues {
    /// Wraps delivered values.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of delivered values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the host delivered no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value at `index`, if delivered.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Borrows all values in delivery order.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Deserializes the whole sequence positionally, typically into a tuple.
    ///
    /// # Errors
    ///
    /// Returns an error when arity or value types do not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Array(self.0))
    }

    /// Deserializes the single value at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error when the value is missing or does not match `T`.
    pub fn decode_at<T: DeserializeOwned>(&self, index: usize) -> Result<T, serde_json::Error> {
        let value = self.get(index).ok_or_else(|| {
            <serde_json::Error as serde::de::Error>::custom(format!(
                "no result value at index {index} (delivered {})",
                self.len()
            ))
        })?;
        T::deserialize(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
/// Failure reported by a continuation while handling delivered results.
pub struct ContinuationError {
    message: String,
}

impl ContinuationError {
    /// Creates an error from a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Builds an error from a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new(format!("continuation panicked: {detail}"))
    }

    /// Returns the diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for ContinuationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}
