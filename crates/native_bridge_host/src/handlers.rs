//! Native function table consulted when a bridge signal arrives.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Native implementation of one bridge function: positional arguments in, positional results out.
pub type NativeHandler = Arc<dyn Fn(Vec<Value>) -> Result<Vec<Value>, String> + Send + Sync>;

#[derive(Clone, Default)]
/// Native functions addressable by bridge signals, keyed by function name.
pub struct HandlerRegistry {
    handlers: HashMap<String, NativeHandler>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

impl HandlerRegistry {
    /// Registers `handler` under `name`, replacing any previous handler.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Result<Vec<Value>, String> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Builder-style variant of [`HandlerRegistry::register`].
    pub fn with<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Vec<Value>, String> + Send + Sync + 'static,
    {
        self.register(name, handler);
        self
    }

    /// Looks up the handler for `name`.
    pub fn get(&self, name: &str) -> Option<&NativeHandler> {
        self.handlers.get(name)
    }

    /// Returns registered function names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
