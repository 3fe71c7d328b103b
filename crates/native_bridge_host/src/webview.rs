//! Tauri webview wiring: bridge signals are caught in the navigation hook and answered by
//! evaluating the delivery script in the same window.

use std::sync::Arc;

use tauri::{AppHandle, Manager, Runtime, WebviewWindowBuilder};

use crate::delivery::Delivery;
use crate::dispatcher::HostDispatcher;

/// Installs `dispatcher` as the navigation hook of the window built by `builder`.
///
/// `label` must be the label `builder` was created with; deliveries are evaluated in that window.
/// Bridge navigations are always cancelled so the page never leaves its current state.
pub fn intercept_navigation<'a, R, M>(
    builder: WebviewWindowBuilder<'a, R, M>,
    app: AppHandle<R>,
    label: impl Into<String>,
    dispatcher: Arc<HostDispatcher>,
) -> WebviewWindowBuilder<'a, R, M>
where
    R: Runtime,
    M: Manager<R>,
{
    let label = label.into();
    builder.on_navigation(move |url| {
        let decision = dispatcher.decide_navigation(url.as_str());
        if let Some(delivery) = &decision.delivery {
            deliver(&app, &label, delivery, &dispatcher);
        }
        decision.allow
    })
}

fn deliver<R: Runtime>(
    app: &AppHandle<R>,
    label: &str,
    delivery: &Delivery,
    dispatcher: &HostDispatcher,
) {
    let Some(window) = app.get_webview_window(label) else {
        tracing::warn!(label, call_id = %delivery.call_id, "bridge window is gone; dropping delivery");
        return;
    };
    let script = delivery.to_script(dispatcher.config());
    if let Err(err) = window.eval(script.as_str()) {
        tracing::warn!(label, call_id = %delivery.call_id, error = %err, "failed to evaluate bridge delivery");
    }
}
