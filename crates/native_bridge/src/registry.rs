//! Call correlation registry: the script-facing `invoke` and host-facing `deliver` entry points.
//!
//! The registry owns the identifier counter and the pending continuation table. It is a
//! single-threaded handle (`Rc` state, cheap to clone); every clone shares the same table, and
//! separate registries never collide, which lets one process host several script environments.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use futures::{
    channel::oneshot,
    future::{FutureExt, LocalBoxFuture},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::call_id::CallId;
use crate::config::BridgeConfig;
use crate::diagnostics::{ContinuationFailure, DiagnosticsSink, TracingDiagnostics};
use crate::error::{CallError, InvokeError};
use crate::results::{ContinuationError, ResultValues};
use crate::signal::{format_signal, validate_function_name, EncodedArgs};
use crate::transport::Transport;

/// Boxed continuation run once with the host's results.
pub type Continuation = Box<dyn FnOnce(ResultValues) -> Result<(), ContinuationError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happened to one host delivery.
pub enum DeliveryOutcome {
    /// The continuation ran and returned successfully.
    Resolved,
    /// No pending call had that identifier; nothing ran.
    Unknown,
    /// The continuation failed; the failure went to the diagnostics sink.
    Failed,
}

struct PendingCall {
    function: String,
    continuation: Continuation,
}

struct RegistryState {
    next_id: CallId,
    pending: HashMap<CallId, PendingCall>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            next_id: CallId::FIRST,
            pending: HashMap::new(),
        }
    }
}

#[derive(Clone)]
/// Script-side bridge correlating outbound calls with host deliveries.
pub struct BridgeRegistry {
    config: Rc<BridgeConfig>,
    state: Rc<RefCell<RegistryState>>,
    transport: Rc<dyn Transport>,
    diagnostics: Rc<dyn DiagnosticsSink>,
}

impl fmt::Debug for BridgeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("BridgeRegistry")
            .field("config", &self.config)
            .field("next_id", &state.next_id)
            .field("pending", &state.pending.len())
            .finish_non_exhaustive()
    }
}

impl BridgeRegistry {
    /// Creates a registry with the default config, reporting failures through `tracing`.
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self::with_config(BridgeConfig::default(), transport, Rc::new(TracingDiagnostics))
    }

    /// Creates a registry from explicit collaborators.
    pub fn with_config(
        config: BridgeConfig,
        transport: Rc<dyn Transport>,
        diagnostics: Rc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            config: Rc::new(config),
            state: Rc::new(RefCell::new(RegistryState::default())),
            transport,
            diagnostics,
        }
    }

    /// Returns the wire config this registry encodes signals with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Sends a fire-and-forget call. The signal carries [`CallId::FIRE_AND_FORGET`] and nothing
    /// is registered.
    ///
    /// # Errors
    ///
    /// Returns an [`InvokeError`] when the name or arguments cannot be encoded or the transport
    /// rejects the signal.
    pub fn invoke<A: Serialize + ?Sized>(
        &self,
        function: &str,
        args: &A,
    ) -> Result<CallId, InvokeError> {
        self.send_call(function, args, None)
    }

    /// Sends a call whose results are handed to `continuation` once the host delivers them.
    ///
    /// # Errors
    ///
    /// Returns an [`InvokeError`] when the name or arguments cannot be encoded, identifiers are
    /// exhausted, or the transport rejects the signal. The pending table is left unchanged.
    pub fn invoke_with<A, F>(
        &self,
        function: &str,
        args: &A,
        continuation: F,
    ) -> Result<CallId, InvokeError>
    where
        A: Serialize + ?Sized,
        F: FnOnce(ResultValues) -> Result<(), ContinuationError> + 'static,
    {
        self.send_call(function, args, Some(Box::new(continuation)))
    }

    /// Sends a call and returns a future resolving to the decoded results.
    ///
    /// `T` describes the whole result sequence, e.g. `(String,)` for a single string result.
    /// The future borrows neither the registry nor `args`.
    ///
    /// # Errors
    ///
    /// Returns an [`InvokeError`] synchronously under the same conditions as
    /// [`BridgeRegistry::invoke_with`].
    pub fn call<A, T>(
        &self,
        function: &str,
        args: &A,
    ) -> Result<LocalBoxFuture<'static, Result<T, CallError>>, InvokeError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.invoke_with(function, args, move |values| {
            // The caller may have dropped the future; nobody is left to notify.
            let _ = sender.send(values);
            Ok(())
        })?;
        Ok(async move {
            let values = receiver.await.map_err(|_| CallError::Dropped)?;
            values
                .decode()
                .map_err(|err| CallError::Decode(err.to_string()))
        }
        .boxed_local())
    }

    /// Delivers host results to the continuation registered under `call_id`.
    ///
    /// Unknown identifiers (including `0` and already resolved ones) are ignored. Continuation
    /// failures, returned or panicked, are reported to the diagnostics sink and never escape.
    ///
    /// Panics are only caught where they unwind. Targets built with `panic = "abort"`, which
    /// includes `wasm32-unknown-unknown` by default, abort on a panicking continuation; there a
    /// continuation must report failures by returning a [`ContinuationError`].
    pub fn deliver(&self, call_id: CallId, results: Vec<Value>) -> DeliveryOutcome {
        let pending = self.state.borrow_mut().pending.remove(&call_id);
        let Some(PendingCall {
            function,
            continuation,
        }) = pending
        else {
            tracing::debug!(%call_id, "ignoring delivery for unknown bridge call");
            return DeliveryOutcome::Unknown;
        };

        let values = ResultValues::new(results);
        let error = match panic::catch_unwind(AssertUnwindSafe(move || continuation(values))) {
            Ok(Ok(())) => {
                tracing::debug!(%call_id, function = %function, "bridge call resolved");
                return DeliveryOutcome::Resolved;
            }
            Ok(Err(error)) => error,
            Err(payload) => ContinuationError::from_panic(payload.as_ref()),
        };
        self.diagnostics.continuation_failed(&ContinuationFailure {
            call_id,
            function,
            error,
        });
        DeliveryOutcome::Failed
    }

    /// Returns `true` while `call_id` waits for a delivery.
    pub fn is_pending(&self, call_id: CallId) -> bool {
        self.state.borrow().pending.contains_key(&call_id)
    }

    /// Number of calls waiting for a delivery.
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Identifier the next call with a continuation will receive.
    pub fn next_call_id(&self) -> CallId {
        self.state.borrow().next_id
    }

    fn send_call<A: Serialize + ?Sized>(
        &self,
        function: &str,
        args: &A,
        continuation: Option<Continuation>,
    ) -> Result<CallId, InvokeError> {
        validate_function_name(function).map_err(|reason| InvokeError::InvalidFunctionName {
            function: function.to_string(),
            reason,
        })?;
        let args = EncodedArgs::from_serialize(args).map_err(|reason| InvokeError::Encoding {
            function: function.to_string(),
            reason,
        })?;

        let call_id = match continuation {
            Some(continuation) => self.register(function, continuation)?,
            None => CallId::FIRE_AND_FORGET,
        };
        let signal = format_signal(&self.config.scheme, function, call_id, &args);

        tracing::debug!(function, %call_id, "sending bridge call");
        if let Err(reason) = self.transport.send(&signal) {
            if !call_id.is_fire_and_forget() {
                self.state.borrow_mut().pending.remove(&call_id);
            }
            return Err(InvokeError::Transport {
                function: function.to_string(),
                reason,
            });
        }
        Ok(call_id)
    }

    fn register(&self, function: &str, continuation: Continuation) -> Result<CallId, InvokeError> {
        let mut state = self.state.borrow_mut();
        let call_id = state.next_id;
        if call_id > CallId::MAX {
            return Err(InvokeError::CallIdsExhausted);
        }
        state.next_id = CallId(call_id.get() + 1);
        state.pending.insert(
            call_id,
            PendingCall {
                function: function.to_string(),
                continuation,
            },
        );
        let pending = state.pending.len();
        drop(state);

        if let Some(threshold) = self.config.pending_warn_threshold {
            if pending == threshold.saturating_add(1) {
                tracing::warn!(
                    pending,
                    threshold,
                    "bridge pending call table exceeded warning threshold"
                );
            }
        }
        Ok(call_id)
    }

    #[cfg(test)]
    fn set_next_id(&self, call_id: CallId) {
        self.state.borrow_mut().next_id = call_id;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeMap;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::diagnostics::MemoryDiagnostics;
    use crate::transport::{NoopTransport, RecordingTransport};

    const NO_ARGS: [u8; 0] = [];

    fn recording_registry() -> (BridgeRegistry, RecordingTransport, MemoryDiagnostics) {
        let transport = RecordingTransport::default();
        let diagnostics = MemoryDiagnostics::default();
        let registry = BridgeRegistry::with_config(
            BridgeConfig::default(),
            Rc::new(transport.clone()),
            Rc::new(diagnostics.clone()),
        );
        (registry, transport, diagnostics)
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send(&self, _signal: &str) -> Result<(), String> {
            Err("frame detached".to_string())
        }
    }

    #[test]
    fn read_file_round_trip() {
        let (registry, transport, _) = recording_registry();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);

        let call_id = registry
            .invoke_with("readFile", &("/tmp/x",), move |values| {
                let (contents,): (String,) = values.decode()?;
                sink.borrow_mut().push(contents);
                Ok(())
            })
            .expect("invoke readFile");

        assert_eq!(call_id, CallId(1));
        assert_eq!(
            transport.sent(),
            vec!["js-frame:readFile:1:%5B%22%2Ftmp%2Fx%22%5D".to_string()]
        );
        assert!(registry.is_pending(call_id));

        assert_eq!(
            registry.deliver(call_id, vec![json!("file contents")]),
            DeliveryOutcome::Resolved
        );
        assert_eq!(*received.borrow(), vec!["file contents".to_string()]);
        assert!(!registry.is_pending(call_id));

        assert_eq!(
            registry.deliver(call_id, vec![json!("again")]),
            DeliveryOutcome::Unknown
        );
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn fire_and_forget_calls_use_reserved_id() {
        let (registry, transport, _) = recording_registry();

        assert_eq!(
            registry.invoke("log", &["a"]).expect("log a"),
            CallId::FIRE_AND_FORGET
        );
        assert_eq!(
            registry.invoke("log", &["b"]).expect("log b"),
            CallId::FIRE_AND_FORGET
        );

        assert_eq!(
            transport.sent(),
            vec![
                "js-frame:log:0:%5B%22a%22%5D".to_string(),
                "js-frame:log:0:%5B%22b%22%5D".to_string()
            ]
        );
        assert_eq!(registry.pending_count(), 0);
        assert_eq!(registry.next_call_id(), CallId::FIRST);
    }

    #[test]
    fn unknown_deliveries_are_ignored() {
        let (registry, _, diagnostics) = recording_registry();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let call_id = registry
            .invoke_with("ping", &NO_ARGS, move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            })
            .expect("invoke ping");

        for unknown in [CallId::FIRE_AND_FORGET, CallId(call_id.get() + 1), CallId(999)] {
            assert_eq!(registry.deliver(unknown, Vec::new()), DeliveryOutcome::Unknown);
        }
        assert_eq!(hits.get(), 0);
        assert!(registry.is_pending(call_id));
        assert!(diagnostics.failures().is_empty());
    }

    #[test]
    fn out_of_order_delivery_keeps_other_calls_pending() {
        let (registry, _, _) = recording_registry();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first_order = Rc::clone(&order);
        let first = registry
            .invoke_with("a", &[1], move |_| {
                first_order.borrow_mut().push("a");
                Ok(())
            })
            .expect("invoke a");
        let second_order = Rc::clone(&order);
        let second = registry
            .invoke_with("b", &[2], move |_| {
                second_order.borrow_mut().push("b");
                Ok(())
            })
            .expect("invoke b");

        assert_eq!(registry.deliver(second, Vec::new()), DeliveryOutcome::Resolved);
        assert_eq!(*order.borrow(), vec!["b"]);
        assert!(registry.is_pending(first));
        assert!(!registry.is_pending(second));

        assert_eq!(registry.deliver(first, Vec::new()), DeliveryOutcome::Resolved);
        assert_eq!(*order.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn encoding_failure_leaves_table_untouched() {
        let (registry, transport, _) = recording_registry();
        let mut bad = BTreeMap::new();
        bad.insert((1_u8, 2_u8), "value");

        let err = registry
            .invoke_with("store", &(bad,), |_| Ok(()))
            .expect_err("tuple keys cannot be encoded");
        assert!(matches!(err, InvokeError::Encoding { ref function, .. } if function == "store"));

        let err = registry
            .invoke_with("store", &json!({"not": "an array"}), |_| Ok(()))
            .expect_err("object arguments cannot be encoded");
        assert!(matches!(err, InvokeError::Encoding { .. }));

        assert_eq!(registry.pending_count(), 0);
        assert_eq!(registry.next_call_id(), CallId::FIRST);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn invalid_function_names_are_rejected() {
        let (registry, transport, _) = recording_registry();
        let err = registry
            .invoke_with("read:file", &["x"], |_| Ok(()))
            .expect_err("delimiter in name");
        assert_eq!(
            err,
            InvokeError::InvalidFunctionName {
                function: "read:file".to_string(),
                reason: "character `:` is not allowed".to_string(),
            }
        );
        assert!(matches!(
            registry.invoke("", &["x"]),
            Err(InvokeError::InvalidFunctionName { .. })
        ));
        assert_eq!(registry.pending_count(), 0);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn transport_failure_rolls_back_registration() {
        let registry = BridgeRegistry::new(Rc::new(FailingTransport));
        let err = registry
            .invoke_with("readFile", &["/tmp/x"], |_| Ok(()))
            .expect_err("transport failure");
        assert_eq!(
            err,
            InvokeError::Transport {
                function: "readFile".to_string(),
                reason: "frame detached".to_string(),
            }
        );
        assert_eq!(registry.pending_count(), 0);
        assert!(!registry.is_pending(CallId(1)));
    }

    #[test]
    fn continuation_errors_are_isolated_and_reported() {
        let (registry, _, diagnostics) = recording_registry();
        let call_id = registry
            .invoke_with("readFile", &["/tmp/x"], |values| {
                let (_size,): (u64,) = values.decode()?;
                Ok(())
            })
            .expect("invoke");

        assert_eq!(
            registry.deliver(call_id, vec![json!("not a number")]),
            DeliveryOutcome::Failed
        );
        let failures = diagnostics.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].call_id, call_id);
        assert_eq!(failures[0].function, "readFile");
        assert!(!registry.is_pending(call_id));
    }

    #[cfg(panic = "unwind")]
    #[test]
    fn continuation_panics_are_isolated_and_reported() {
        let (registry, _, diagnostics) = recording_registry();
        let call_id = registry
            .invoke_with("explode", &NO_ARGS, |_| panic!("kaboom"))
            .expect("invoke");

        assert_eq!(registry.deliver(call_id, Vec::new()), DeliveryOutcome::Failed);
        let failures = diagnostics.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].error.message(), "continuation panicked: kaboom");

        // The registry stays usable after a panicking continuation.
        let next = registry.invoke_with("ping", &NO_ARGS, |_| Ok(())).expect("invoke");
        assert_eq!(registry.deliver(next, Vec::new()), DeliveryOutcome::Resolved);
    }

    #[test]
    fn continuations_may_reenter_the_registry() {
        let (registry, transport, _) = recording_registry();
        let inner_registry = registry.clone();
        let inner_id = Rc::new(Cell::new(CallId::FIRE_AND_FORGET));
        let inner_slot = Rc::clone(&inner_id);

        let outer = registry
            .invoke_with("stat", &["/tmp"], move |_| {
                let id = inner_registry
                    .invoke_with("readFile", &["/tmp/x"], |_| Ok(()))
                    .map_err(|err| ContinuationError::new(err.to_string()))?;
                inner_slot.set(id);
                Ok(())
            })
            .expect("invoke stat");

        assert_eq!(registry.deliver(outer, Vec::new()), DeliveryOutcome::Resolved);
        assert_eq!(inner_id.get(), CallId(2));
        assert!(registry.is_pending(CallId(2)));
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn async_call_resolves_with_decoded_results() {
        let (registry, _, _) = recording_registry();
        let pending = registry
            .call::<_, (String, u64)>("readFile", &["/tmp/x"])
            .expect("call");

        assert_eq!(
            registry.deliver(CallId(1), vec![json!("contents"), json!(8)]),
            DeliveryOutcome::Resolved
        );
        assert_eq!(
            block_on(pending).expect("resolved"),
            ("contents".to_string(), 8)
        );
    }

    #[test]
    fn async_call_outlives_borrowed_arguments() {
        let (registry, _, _) = recording_registry();
        let pending = {
            let path = String::from("/tmp/x");
            registry
                .call::<_, (String,)>("readFile", &[path.as_str()])
                .expect("call")
        };

        registry.deliver(CallId(1), vec![json!("contents")]);
        assert_eq!(
            block_on(pending).expect("resolved"),
            ("contents".to_string(),)
        );
    }

    #[test]
    fn async_call_reports_shape_mismatch_and_drop() {
        let (registry, _, _) = recording_registry();
        let mismatched = registry.call::<_, (u64,)>("size", &["/tmp/x"]).expect("call");
        registry.deliver(CallId(1), vec![json!("large")]);
        assert!(matches!(block_on(mismatched), Err(CallError::Decode(_))));

        let registry = BridgeRegistry::new(Rc::new(NoopTransport));
        let orphaned = registry.call::<_, (u64,)>("size", &["/tmp/x"]).expect("call");
        drop(registry);
        assert_eq!(block_on(orphaned), Err(CallError::Dropped));
    }

    #[test]
    fn exhausted_identifiers_fail_without_registering() {
        let (registry, transport, _) = recording_registry();
        registry.set_next_id(CallId::MAX);

        let last = registry.invoke_with("ping", &NO_ARGS, |_| Ok(())).expect("last id");
        assert_eq!(last, CallId::MAX);
        assert_eq!(
            registry.invoke_with("ping", &NO_ARGS, |_| Ok(())),
            Err(InvokeError::CallIdsExhausted)
        );
        assert_eq!(registry.pending_count(), 1);
        assert_eq!(transport.sent().len(), 1);

        // Fire-and-forget calls never consume identifiers.
        assert_eq!(
            registry.invoke("log", &["still works"]),
            Ok(CallId::FIRE_AND_FORGET)
        );
    }

    #[test]
    fn separate_registries_allocate_independently() {
        let (first, _, _) = recording_registry();
        let (second, _, _) = recording_registry();
        assert_eq!(first.invoke_with("a", &NO_ARGS, |_| Ok(())), Ok(CallId(1)));
        assert_eq!(second.invoke_with("a", &NO_ARGS, |_| Ok(())), Ok(CallId(1)));
        assert_eq!(first.deliver(CallId(1), Vec::new()), DeliveryOutcome::Resolved);
        assert!(second.is_pending(CallId(1)));
    }
}
