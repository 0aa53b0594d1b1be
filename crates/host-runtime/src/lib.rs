//! Host runtime - embedding surface for native extensions
//!
//! This library provides the parts of the host a native extension links against:
//! - The tagged host value representation and integer boxing
//! - Namespaces and their name-keyed function tables
//! - Typed native callbacks with declared arity
//! - Extension loading through `Init_<name>` entry points, from shared
//!   libraries over a C ABI or from an in-process table

/// Host runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod abi;
pub mod conversion;
pub mod error;
pub mod function;
pub mod init;
pub mod loader;
pub mod namespace;
pub mod runtime;
pub mod value;

// Re-export commonly used types
pub use abi::{HostApi, RawValue};
pub use conversion::{ConversionError, FromHost, ToHost};
pub use error::RuntimeError;
pub use function::{Callback, FunctionEntry};
pub use init::InitContext;
pub use loader::{Artifact, DylibArtifact, EntryPoint, StaticArtifact};
pub use namespace::{ModuleDef, Namespace};
pub use runtime::Runtime;
pub use value::{ModuleId, Value, FIXNUM_MAX, FIXNUM_MIN};
