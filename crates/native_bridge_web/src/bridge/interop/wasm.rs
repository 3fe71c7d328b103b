use wasm_bindgen::JsValue;
use web_sys::{Document, Window};

fn js_error(context: &str, err: JsValue) -> String {
    format!("{context}: {err:?}")
}

fn window() -> Result<Window, String> {
    web_sys::window().ok_or_else(|| "window is unavailable in this context".to_string())
}

fn document() -> Result<Document, String> {
    window()?
        .document()
        .ok_or_else(|| "document is unavailable in this context".to_string())
}

pub fn attach_signal_frame(signal: &str) -> Result<(), String> {
    let document = document()?;
    let root = document
        .document_element()
        .ok_or_else(|| "document has no root element".to_string())?;
    let frame = document
        .create_element("iframe")
        .map_err(|err| js_error("failed to create signal frame", err))?;
    frame
        .set_attribute("src", signal)
        .map_err(|err| js_error("failed to point signal frame at signal", err))?;
    root.append_child(&frame)
        .map_err(|err| js_error("failed to attach signal frame", err))?;
    frame.remove();
    Ok(())
}

pub fn alert(message: &str) -> Result<(), String> {
    window()?
        .alert_with_message(message)
        .map_err(|err| js_error("alert failed", err))
}

pub fn install_global(name: &str, value: &JsValue) -> Result<(), String> {
    js_sys::Reflect::set(&js_sys::global(), &JsValue::from_str(name), value)
        .map_err(|err| js_error("failed to install bridge global", err))?;
    Ok(())
}
