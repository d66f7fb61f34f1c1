//! Function Registry Module
//!
//! Process-wide mapping from function name to handler, shared by every
//! connection task of one server. Names are only ever added or
//! overwritten, never removed.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::Result;
use crate::protocol::CallParams;

/// Boxed future returned by handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

// == Handler Trait ==
/// A remotely callable function.
///
/// Implemented for any `Fn(CallParams) -> HandlerFuture` closure, so async
/// handlers can be registered directly; synchronous functions go through
/// [`FunctionRegistry::register_fn`].
pub trait Handler: Send + Sync + 'static {
    fn call(&self, params: CallParams) -> HandlerFuture;
}

impl<F> Handler for F
where
    F: Fn(CallParams) -> HandlerFuture + Send + Sync + 'static,
{
    fn call(&self, params: CallParams) -> HandlerFuture {
        (self)(params)
    }
}

// == Function Registry ==
/// Registry mapping function names to handlers.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: RwLock<HashMap<String, Arc<dyn Handler>>>,
}

impl FunctionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `name`, overwriting any previous one.
    ///
    /// Registration is valid before or after the server starts.
    pub fn register<H: Handler>(&self, name: &str, handler: H) {
        self.functions
            .write()
            .expect("function registry lock poisoned")
            .insert(name.to_string(), Arc::new(handler));
    }

    /// Registers a synchronous function under `name`.
    pub fn register_fn<F>(&self, name: &str, function: F)
    where
        F: Fn(CallParams) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(name, move |params: CallParams| -> HandlerFuture {
            let result = function(params);
            Box::pin(async move { result })
        });
    }

    /// Looks up a handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.functions
            .read()
            .expect("function registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Returns the number of registered functions.
    pub fn len(&self) -> usize {
        self.functions
            .read()
            .expect("function registry lock poisoned")
            .len()
    }

    /// Returns true if nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
