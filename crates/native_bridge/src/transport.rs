//! Transport contracts that make encoded signals observable to the host.

use std::{cell::RefCell, rc::Rc};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Out-of-band carrier for encoded call signals.
///
/// Implementations must return without waiting for the host; the host answers later through
/// [`crate::BridgeRegistry::deliver`].
pub trait Transport {
    /// Makes `signal` observable to the host interceptor.
    fn send(&self, signal: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Transport that discards every signal.
pub struct NoopTransport;

impl Transport for NoopTransport {
    fn send(&self, _signal: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory transport recording signals in send order.
pub struct RecordingTransport {
    sent: Rc<RefCell<Vec<String>>>,
}

impl RecordingTransport {
    /// Returns a copy of every recorded signal.
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, signal: &str) -> Result<(), String> {
        self.sent.borrow_mut().push(signal.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Transport forwarding signals over an unbounded message channel.
///
/// Suited to hosts that expose a native message primitive instead of navigation interception.
pub struct ChannelTransport {
    sender: UnboundedSender<String>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver the host drains.
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded();
        (Self { sender }, receiver)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, signal: &str) -> Result<(), String> {
        self.sender
            .unbounded_send(signal.to_string())
            .map_err(|err| format!("signal channel closed: {err}"))
    }
}
