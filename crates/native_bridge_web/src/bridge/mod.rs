//! Browser capability bridge used by the web transport and diagnostics adapters.
//!
//! Keeps DOM interop behind one module so adapters stay target-agnostic.

mod interop;

/// Points a throwaway child frame at `signal`, then detaches it immediately.
pub fn attach_signal_frame(signal: &str) -> Result<(), String> {
    interop::attach_signal_frame(signal)
}

/// Shows a blocking alert dialog.
pub fn alert(message: &str) -> Result<(), String> {
    interop::alert(message)
}

#[cfg(target_arch = "wasm32")]
/// Assigns `value` to `globalThis[name]`.
pub fn install_global(name: &str, value: &wasm_bindgen::JsValue) -> Result<(), String> {
    interop::install_global(name, value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn dom_bridge_non_wasm_parity() {
        let expected = "browser DOM APIs are only available when compiled for wasm32".to_string();
        assert_eq!(
            attach_signal_frame("js-frame:log:0:%5B%5D").expect_err("frame should fail"),
            expected
        );
        assert_eq!(alert("hello").expect_err("alert should fail"), expected);
    }
}
