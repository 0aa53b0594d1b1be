//! Native functions behind the `foo` extension
//!
//! Every function here is exported under its own name with the C calling
//! convention and takes and returns fixed-width integers only. The crate
//! builds to `libfoo_native.a` for linking into the extension.

/// Always returns 3
#[no_mangle]
pub extern "C" fn return_3() -> i32 {
    3
}

/// Largest `i32`
#[no_mangle]
pub extern "C" fn return_i32_max() -> i32 {
    i32::MAX
}

/// Largest `i64`, beyond the host's immediate integer range
#[no_mangle]
pub extern "C" fn return_i64_max() -> i64 {
    i64::MAX
}
