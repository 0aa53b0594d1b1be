//! The `foo` extension
//!
//! Built as a shared library. Loading `foo.so` runs [`Init_foo`], which
//! defines the `Foo` module and registers one zero-arity function per native
//! function:
//!
//! | host name              | native symbol     |
//! |------------------------|-------------------|
//! | `Foo.return_3`         | `return_3`        |
//! | `Foo.return_i32_max`   | `return_i32_max`  |
//! | `Foo.return_i64_max`   | `return_i64_max`  |

pub mod adapter;

// Links the native archive that provides the extern symbols.
use foo_native as _;

use host_runtime::abi::ExternFn0;
use host_runtime::{EntryPoint, HostApi, StaticArtifact};
use std::ffi::CStr;

/// File name the extension is loaded as
pub const ARTIFACT_FILE_NAME: &str = "foo.so";

/// Module the functions are registered under
pub const MODULE_NAME: &str = "Foo";

const FUNCTIONS: [(&CStr, ExternFn0); 3] = [
    (c"return_3", adapter::foo_return_3),
    (c"return_i32_max", adapter::foo_return_i32_max),
    (c"return_i64_max", adapter::foo_return_i64_max),
];

/// Entry point run by the host when `foo.so` is loaded
///
/// Stops at the first registration the host rejects; the host then fails
/// the load and discards everything defined so far.
///
/// # Safety
///
/// `api` must be null or point to a [`HostApi`] that is valid for the
/// duration of the call. The host guarantees this when it calls the entry
/// point.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn Init_foo(api: *const HostApi) {
    let Some(api) = api.as_ref() else {
        return;
    };
    let Some(foo) = api.define_module(c"Foo") else {
        return;
    };
    for (name, f) in FUNCTIONS {
        if !api.define_module_function0(foo, name, f) {
            return;
        }
    }
}

/// The extension served from the host process instead of a shared library
pub fn artifact() -> StaticArtifact {
    StaticArtifact::new(ARTIFACT_FILE_NAME)
        .with_export("Init_foo", EntryPoint::Extern(Init_foo))
}
