//! JavaScript-facing `NativeBridge` class.
//!
//! Page scripts call `NativeBridge.call(name, args, callback)`; the host answers by evaluating
//! `NativeBridge.resultForCallback(id, results)`, which spreads `results` into `callback`.

use js_sys::{Array, Function, Promise, JSON};
use native_bridge::{BridgeConfig, BridgeRegistry, CallId, ContinuationError, ResultValues};
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

use crate::adapters::build_registry;
use crate::bridge;
use crate::values::{self, Stringified};

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js_value(value: &Value) -> Result<JsValue, String> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| err.to_string())
}

fn to_js_array(items: &[Value]) -> Result<Array, String> {
    let array = Array::new();
    for value in items {
        array.push(&to_js_value(value)?);
    }
    Ok(array)
}

fn thrown_message(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

fn stringify(value: &JsValue) -> Stringified {
    JSON::stringify(value)
        .map(|text| JsValue::from(text).as_string())
        .map_err(|err| thrown_message(&err))
}

fn apply_callback(callback: &Function, results: ResultValues) -> Result<(), ContinuationError> {
    let args = to_js_array(results.as_slice()).map_err(ContinuationError::new)?;
    callback
        .apply(&JsValue::NULL, &args)
        .map(|_| ())
        .map_err(|err| ContinuationError::new(format!("{err:?}")))
}

#[wasm_bindgen(js_name = NativeBridge)]
/// Script-side bridge handle exported to JavaScript.
pub struct JsNativeBridge {
    registry: BridgeRegistry,
}

#[wasm_bindgen(js_class = NativeBridge)]
impl JsNativeBridge {
    /// Creates a bridge with the default wire config.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<JsNativeBridge, JsValue> {
        let registry = build_registry(BridgeConfig::default()).map_err(to_js_error)?;
        Ok(Self { registry })
    }

    /// Sends a call; `callback`, when it is a function, receives the host's results as
    /// positional arguments. Any other `callback` makes the call fire-and-forget.
    pub fn call(
        &self,
        function_name: &str,
        args: JsValue,
        callback: JsValue,
    ) -> Result<(), JsValue> {
        let args = values::call_args(function_name, stringify(&args)).map_err(to_js_error)?;
        let sent = match callback.dyn_into::<Function>().ok() {
            Some(callback) => self
                .registry
                .invoke_with(function_name, &args, move |results| {
                    apply_callback(&callback, results)
                }),
            None => self.registry.invoke(function_name, &args),
        };
        sent.map(|_| ()).map_err(to_js_error)
    }

    /// Sends a call and returns a promise resolving to the array of results.
    #[wasm_bindgen(js_name = callAsync)]
    pub fn call_async(&self, function_name: &str, args: JsValue) -> Result<Promise, JsValue> {
        let args = values::call_args(function_name, stringify(&args)).map_err(to_js_error)?;
        let pending = self
            .registry
            .call::<_, Vec<Value>>(function_name, &args)
            .map_err(to_js_error)?;
        Ok(future_to_promise(async move {
            let results = pending.await.map_err(to_js_error)?;
            to_js_array(&results)
                .map(JsValue::from)
                .map_err(to_js_error)
        }))
    }

    /// Host entry point delivering `result_array` to the callback registered under
    /// `callback_id`. Never throws back into the host.
    #[wasm_bindgen(js_name = resultForCallback)]
    pub fn result_for_callback(&self, callback_id: f64, result_array: JsValue) {
        let Some(call_id) = CallId::from_js_number(callback_id) else {
            tracing::debug!(callback_id, "ignoring delivery with invalid callback id");
            return;
        };
        let results = match values::value_list(stringify(&result_array)) {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(%call_id, error = %err, "ignoring delivery with unreadable results");
                return;
            }
        };
        self.registry.deliver(call_id, results);
    }

    /// Number of calls still waiting for the host.
    #[wasm_bindgen(js_name = pendingCount)]
    pub fn pending_count(&self) -> usize {
        self.registry.pending_count()
    }
}

/// Creates a bridge from a JSON config and installs it as `globalThis[config.globalName]` so the
/// host can reach the delivery entry point. Returns a handle sharing the installed registry.
#[wasm_bindgen(js_name = installNativeBridge)]
pub fn install_native_bridge(config_json: Option<String>) -> Result<JsNativeBridge, JsValue> {
    let config = match config_json {
        Some(raw) => BridgeConfig::from_json_str(&raw).map_err(to_js_error)?,
        None => BridgeConfig::default(),
    };
    let global_name = config.global_name.clone();
    let registry = build_registry(config).map_err(to_js_error)?;
    let installed = JsNativeBridge {
        registry: registry.clone(),
    };
    bridge::install_global(&global_name, &JsValue::from(installed)).map_err(to_js_error)?;
    Ok(JsNativeBridge { registry })
}
