//! Navigation-frame transport for webviews whose host intercepts frame loads.

use native_bridge::Transport;

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Transport that makes a signal observable by loading it in a child frame that is discarded
/// right away, leaving the visible page untouched.
pub struct IframeTransport;

impl Transport for IframeTransport {
    fn send(&self, signal: &str) -> Result<(), String> {
        bridge::attach_signal_frame(signal)
    }
}
