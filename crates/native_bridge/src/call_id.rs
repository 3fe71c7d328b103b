//! Call identifiers correlating outbound calls with host deliveries.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier correlating one outbound call with its eventual delivery.
///
/// `0` is reserved for fire-and-forget calls and is never allocated to a pending call.
pub struct CallId(pub u64);

impl CallId {
    /// Reserved identifier carried by calls that requested no continuation.
    pub const FIRE_AND_FORGET: Self = Self(0);
    /// First identifier handed out by a fresh registry.
    pub const FIRST: Self = Self(1);
    /// Largest identifier that survives a round trip through a JavaScript number (`2^53 - 1`).
    pub const MAX: Self = Self((1 << 53) - 1);

    /// Returns the raw integer value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` for the reserved fire-and-forget identifier.
    pub const fn is_fire_and_forget(self) -> bool {
        self.0 == 0
    }

    /// Converts a JavaScript number handed back by the host into an identifier.
    ///
    /// Returns `None` for non-finite, negative, fractional, or out-of-range values.
    pub fn from_js_number(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > Self::MAX.0 as f64 {
            return None;
        }
        Some(Self(value as u64))
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
