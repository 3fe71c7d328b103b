//! Host-side half of the native bridge.
//!
//! The webview makes call signals observable (for example by pointing a throwaway frame at a
//! `js-frame:` URL). The host intercepts them here, runs the registered native function, and
//! answers with a [`Delivery`] script that invokes the script-side entry point. Enable the `tauri`
//! feature to wire this into a Tauri webview's navigation hook.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod delivery;
mod dispatcher;
mod error;
mod handlers;
#[cfg(feature = "tauri")]
mod webview;

pub use delivery::Delivery;
pub use dispatcher::{HostDispatcher, Interception, NavigationDecision};
pub use error::HostError;
pub use handlers::{HandlerRegistry, NativeHandler};
#[cfg(feature = "tauri")]
pub use webview::intercept_navigation;
