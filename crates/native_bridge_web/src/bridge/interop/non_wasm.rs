fn unsupported() -> String {
    "browser DOM APIs are only available when compiled for wasm32".to_string()
}

pub fn attach_signal_frame(_signal: &str) -> Result<(), String> {
    Err(unsupported())
}

pub fn alert(_message: &str) -> Result<(), String> {
    Err(unsupported())
}
