//! Native callbacks and function registration entries
//!
//! A callback's arity is part of its type: `Callback::Arity1` can only hold a
//! function taking the receiver plus one argument. The declared arity of a
//! [`FunctionEntry`] is read off the variant, so it always agrees with the
//! pointer it describes.
//!
//! `Arity*` variants hold Rust callbacks linked into the host; `Extern*`
//! variants hold C callbacks registered by a loaded extension through
//! [`HostApi`](crate::abi::HostApi).

use crate::abi::{ExternFn0, ExternFn1, ExternFn2, RawValue};
use crate::error::RuntimeError;
use crate::value::Value;

/// Callback taking only the receiver
pub type Arity0Fn = fn(Value) -> Value;
/// Callback taking the receiver and one argument
pub type Arity1Fn = fn(Value, Value) -> Value;
/// Callback taking the receiver and two arguments
pub type Arity2Fn = fn(Value, Value, Value) -> Value;

/// Typed native callback
///
/// The receiver is always the leading parameter and is not counted in the arity.
#[derive(Debug, Clone, Copy)]
pub enum Callback {
    Arity0(Arity0Fn),
    Arity1(Arity1Fn),
    Arity2(Arity2Fn),
    Extern0(ExternFn0),
    Extern1(ExternFn1),
    Extern2(ExternFn2),
}

impl Callback {
    /// Number of explicit arguments, excluding the receiver
    pub fn arity(&self) -> usize {
        match self {
            Callback::Arity0(_) | Callback::Extern0(_) => 0,
            Callback::Arity1(_) | Callback::Extern1(_) => 1,
            Callback::Arity2(_) | Callback::Extern2(_) => 2,
        }
    }
}

/// A function registered in a namespace: (name, callback, declared arity)
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    name: String,
    callback: Callback,
}

impl FunctionEntry {
    pub fn new(name: impl Into<String>, callback: Callback) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callback(&self) -> Callback {
        self.callback
    }

    /// Declared arity
    pub fn arity(&self) -> usize {
        self.callback.arity()
    }

    /// Invoke the callback
    ///
    /// The argument count is checked against the declared arity before the
    /// callback runs; a mismatch never reaches native code. Integer results
    /// are normalised, so the host only ever sees canonical values.
    pub fn invoke(
        &self,
        module: &str,
        receiver: Value,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let result = match (self.callback, args) {
            (Callback::Arity0(f), []) => f(receiver),
            (Callback::Arity1(f), [a]) => f(receiver, *a),
            (Callback::Arity2(f), [a, b]) => f(receiver, *a, *b),
            (Callback::Extern0(f), []) => Value::try_from(f(raw(receiver)?))?,
            (Callback::Extern1(f), [a]) => Value::try_from(f(raw(receiver)?, raw(*a)?))?,
            (Callback::Extern2(f), [a, b]) => {
                Value::try_from(f(raw(receiver)?, raw(*a)?, raw(*b)?))?
            }
            _ => {
                return Err(RuntimeError::ArgumentError {
                    module: module.to_string(),
                    name: self.name.clone(),
                    given: args.len(),
                    expected: self.arity(),
                })
            }
        };
        Ok(result.normalize())
    }
}

fn raw(value: Value) -> Result<RawValue, RuntimeError> {
    Ok(RawValue::try_from(value)?)
}
