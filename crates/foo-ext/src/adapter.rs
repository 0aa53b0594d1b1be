//! Adapters from the native C ABI to host callbacks
//!
//! Each adapter takes the module receiver, calls one native function and
//! boxes its result. Nothing else happens here. The host widens results
//! outside the fixnum range when it converts them back.

use host_runtime::RawValue;

extern "C" {
    fn return_3() -> i32;
    fn return_i32_max() -> i32;
    fn return_i64_max() -> i64;
}

pub extern "C" fn foo_return_3(_module: RawValue) -> RawValue {
    // SAFETY: no arguments, returns by value
    let three = unsafe { return_3() };
    RawValue::from(three)
}

pub extern "C" fn foo_return_i32_max(_module: RawValue) -> RawValue {
    // SAFETY: no arguments, returns by value
    let max = unsafe { return_i32_max() };
    RawValue::from(max)
}

/// Becomes a bignum on the host side
pub extern "C" fn foo_return_i64_max(_module: RawValue) -> RawValue {
    // SAFETY: no arguments, returns by value
    let max = unsafe { return_i64_max() };
    RawValue::from_i64(max)
}
