//! Type conversion between native integers and host values
//!
//! Provides traits and implementations for bidirectional conversion:
//! - `ToHost` - Convert native integers to a host `Value`
//! - `FromHost` - Convert a host `Value` back to a native integer
//!
//! # Examples
//!
//! ```
//! use host_runtime::conversion::{FromHost, ToHost};
//! use host_runtime::Value;
//!
//! let boxed: Value = 42i32.to_host();
//! let unboxed: i32 = FromHost::from_host(&boxed).unwrap();
//! assert_eq!(unboxed, 42);
//! ```

use crate::value::Value;
use thiserror::Error;

/// Error type for value conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Type mismatch during conversion
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Integer does not fit the requested native type
    #[error("Integer {value} out of range for {target}")]
    OutOfRange { value: i128, target: &'static str },
}

/// Trait for converting a host `Value` to a native type
pub trait FromHost: Sized {
    /// Convert from host `Value` to native type
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` if the value is not an integer or does not fit.
    fn from_host(value: &Value) -> Result<Self, ConversionError>;
}

/// Trait for converting native types to a host `Value`
pub trait ToHost {
    /// Convert from native type to host `Value`
    fn to_host(self) -> Value;
}

impl FromHost for i32 {
    fn from_host(value: &Value) -> Result<Self, ConversionError> {
        let wide = value.to_i128()?;
        i32::try_from(wide).map_err(|_| ConversionError::OutOfRange {
            value: wide,
            target: "i32",
        })
    }
}

impl ToHost for i32 {
    fn to_host(self) -> Value {
        Value::from(self)
    }
}

impl FromHost for i64 {
    fn from_host(value: &Value) -> Result<Self, ConversionError> {
        value.to_i64()
    }
}

impl ToHost for i64 {
    fn to_host(self) -> Value {
        Value::from_i64(self)
    }
}

impl FromHost for i128 {
    fn from_host(value: &Value) -> Result<Self, ConversionError> {
        value.to_i128()
    }
}

impl ToHost for i128 {
    fn to_host(self) -> Value {
        Value::from_i128(self)
    }
}
