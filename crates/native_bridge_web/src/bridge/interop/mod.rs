//! Target-specific DOM access for the browser bridge.
//!
//! Calls route to the `wasm32` implementation when compiled for the browser and to a fallback
//! that reports the capability as unavailable everywhere else.

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub fn attach_signal_frame(signal: &str) -> Result<(), String> {
    imp::attach_signal_frame(signal)
}

pub fn alert(message: &str) -> Result<(), String> {
    imp::alert(message)
}

#[cfg(target_arch = "wasm32")]
pub fn install_global(name: &str, value: &wasm_bindgen::JsValue) -> Result<(), String> {
    imp::install_global(name, value)
}
