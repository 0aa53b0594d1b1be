//! Host runtime errors

use crate::conversion::ConversionError;
use thiserror::Error;

/// Errors raised by the host runtime while loading extensions or calling functions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The artifact's file name does not yield a module name
    #[error("cannot derive module name from artifact file name '{0}'")]
    InvalidArtifactName(String),

    /// The dynamic library could not be opened
    #[error("cannot load {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// The derived `Init_<name>` symbol is not exported by the artifact
    #[error("{artifact}: undefined symbol: {symbol}")]
    EntryPointNotFound { artifact: String, symbol: String },

    /// Module names must be constant names
    #[error("wrong constant name {0}")]
    InvalidModuleName(String),

    /// A function name passed through the C API is not valid UTF-8
    #[error("invalid function name {0}")]
    InvalidFunctionName(String),

    /// A function name was registered twice under the `reject` policy
    #[error("function '{name}' already defined in {module}")]
    DuplicateFunction { module: String, name: String },

    /// No module with this name exists
    #[error("uninitialized constant {0}")]
    UninitializedConstant(String),

    /// The module has no function with this name
    #[error("undefined method '{name}' for module {module}")]
    UndefinedFunction { module: String, name: String },

    /// Argument count does not match the declared arity
    #[error("wrong number of arguments (given {given}, expected {expected}) calling {module}.{name}")]
    ArgumentError {
        module: String,
        name: String,
        given: usize,
        expected: usize,
    },

    /// The namespace handle does not belong to this runtime
    #[error("invalid namespace handle {0}")]
    InvalidHandle(usize),

    /// Value conversion failed
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
