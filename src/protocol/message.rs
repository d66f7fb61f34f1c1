//! Message Module
//!
//! The envelope exchanged between client and server, plus helpers for
//! reading call arguments and reporting lookups across the boundary.
//!
//! Control messages (`Goodbye`, `Shutdown`) are variants of the tagged
//! enum rather than reserved string payloads, so they can never collide
//! with legitimate cached data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// == Message Envelope ==
/// One message on the wire, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Remote call request: function name, positional args, keyword args
    Call {
        function: String,
        args: Vec<Value>,
        kwargs: HashMap<String, Value>,
    },
    /// Single-value response to a call
    Reply { value: Value },
    /// Server-reported failure for a call
    Fault { message: String },
    /// Graceful client disconnect request
    Goodbye,
    /// Server acknowledgement of a goodbye
    Bye,
    /// Server self-termination request (harakiri)
    Shutdown,
}

// == Call Parameters ==
/// Accessor over a call's positional and keyword arguments.
///
/// Arguments are filled positionally; a keyword of the same name takes
/// precedence.
pub struct CallParams {
    args: Vec<Value>,
    kwargs: HashMap<String, Value>,
}

impl CallParams {
    pub fn new(args: Vec<Value>, kwargs: HashMap<String, Value>) -> Self {
        Self { args, kwargs }
    }

    fn lookup(&self, index: usize, name: &str) -> Option<&Value> {
        self.kwargs.get(name).or_else(|| self.args.get(index))
    }

    /// Required string argument.
    pub fn str_arg(&self, index: usize, name: &str) -> Result<String> {
        match self.lookup(index, name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(Error::Protocol(format!(
                "Argument '{}' must be a string, got {}",
                name, other
            ))),
            None => Err(Error::Protocol(format!("Missing argument '{}'", name))),
        }
    }

    /// Required argument of any shape.
    pub fn value_arg(&self, index: usize, name: &str) -> Result<Value> {
        self.lookup(index, name)
            .cloned()
            .ok_or_else(|| Error::Protocol(format!("Missing argument '{}'", name)))
    }

    /// Optional unsigned integer argument.
    pub fn opt_u64_arg(&self, index: usize, name: &str) -> Result<Option<u64>> {
        match self.lookup(index, name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                Error::Protocol(format!(
                    "Argument '{}' must be a non-negative integer, got {}",
                    name, value
                ))
            }),
        }
    }

    /// Optional boolean argument.
    pub fn opt_bool_arg(&self, index: usize, name: &str) -> Result<Option<bool>> {
        match self.lookup(index, name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_bool().ok_or_else(|| {
                Error::Protocol(format!(
                    "Argument '{}' must be a boolean, got {}",
                    name, value
                ))
            }).map(Some),
        }
    }
}

// == Lookup Record ==
/// Result of a remote cache lookup.
///
/// `get` cannot raise across the RPC boundary, and a reserved sentinel
/// value could collide with real cached data, so absence is carried as an
/// explicit tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub found: bool,
    pub value: Value,
}

impl Lookup {
    /// A successful lookup holding the cached value.
    pub fn hit(value: Value) -> Self {
        Self { found: true, value }
    }

    /// A lookup that found nothing.
    pub fn miss() -> Self {
        Self {
            found: false,
            value: Value::Null,
        }
    }

    /// Converts into the value-or-absent form used by client wrappers.
    pub fn into_option(self) -> Option<Value> {
        if self.found {
            Some(self.value)
        } else {
            None
        }
    }
}
