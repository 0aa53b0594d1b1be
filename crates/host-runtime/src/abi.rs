//! C ABI between the host and dynamically loaded extensions
//!
//! An extension exports `Init_<name>` as
//! `unsafe extern "C" fn(api: *const HostApi)`. The host passes a [`HostApi`]
//! whose function pointers register modules and functions in the load's
//! [`InitContext`]. Values cross the boundary as [`RawValue`], a `#[repr(C)]`
//! tagged pair that the host converts to and from [`Value`].
//!
//! Registration calls return [`STATUS_OK`] or [`STATUS_ERROR`]. After the
//! first error the host records it in the context, ignores every further
//! call and fails the load once the entry point returns.

use crate::conversion::ConversionError;
use crate::error::RuntimeError;
use crate::init::InitContext;
use crate::namespace::Namespace;
use crate::function::Callback;
use crate::value::{ModuleId, Value};
use std::ffi::{c_char, c_int, c_void, CStr};

pub const STATUS_OK: c_int = 0;
pub const STATUS_ERROR: c_int = -1;

pub const TAG_NIL: u32 = 0;
pub const TAG_INTEGER: u32 = 1;
pub const TAG_MODULE: u32 = 2;

/// Host value as passed through the C ABI
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue {
    pub tag: u32,
    pub bits: i64,
}

impl RawValue {
    pub const NIL: RawValue = RawValue {
        tag: TAG_NIL,
        bits: 0,
    };

    /// Box a native integer for the host
    pub const fn from_i64(n: i64) -> Self {
        RawValue {
            tag: TAG_INTEGER,
            bits: n,
        }
    }

    /// Module id carried by this value, if it is a module
    pub fn module_id(&self) -> Option<ModuleId> {
        if self.tag != TAG_MODULE {
            return None;
        }
        usize::try_from(self.bits).ok().map(ModuleId)
    }

    fn module(id: ModuleId) -> Self {
        RawValue {
            tag: TAG_MODULE,
            bits: id.index() as i64,
        }
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::from_i64(i64::from(n))
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::from_i64(n)
    }
}

impl TryFrom<RawValue> for Value {
    type Error = ConversionError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        match raw.tag {
            TAG_INTEGER => Ok(Value::from_i64(raw.bits)),
            TAG_MODULE => raw.module_id().map(Value::Module).ok_or_else(|| {
                ConversionError::TypeMismatch {
                    expected: "Module".to_string(),
                    found: format!("module id {}", raw.bits),
                }
            }),
            tag => Err(ConversionError::TypeMismatch {
                expected: "Integer or Module".to_string(),
                found: format!("raw tag {}", tag),
            }),
        }
    }
}

impl TryFrom<Value> for RawValue {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Module(id) => Ok(RawValue::module(id)),
            integer => integer.to_i64().map(RawValue::from_i64),
        }
    }
}

/// C callback taking only the receiver
pub type ExternFn0 = extern "C" fn(RawValue) -> RawValue;
/// C callback taking the receiver and one argument
pub type ExternFn1 = extern "C" fn(RawValue, RawValue) -> RawValue;
/// C callback taking the receiver and two arguments
pub type ExternFn2 = extern "C" fn(RawValue, RawValue, RawValue) -> RawValue;

/// Signature of an exported `Init_<name>`
pub type ExternInitFn = unsafe extern "C" fn(api: *const HostApi);

type DefineModuleFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut RawValue) -> c_int;
type DefineFunction0Fn =
    unsafe extern "C" fn(*mut c_void, RawValue, *const c_char, ExternFn0) -> c_int;
type DefineFunction1Fn =
    unsafe extern "C" fn(*mut c_void, RawValue, *const c_char, ExternFn1) -> c_int;
type DefineFunction2Fn =
    unsafe extern "C" fn(*mut c_void, RawValue, *const c_char, ExternFn2) -> c_int;

/// Registration table handed to an extension entry point
///
/// Only the host constructs one, and only for the duration of an entry
/// point call. The extension uses the safe wrapper methods.
#[repr(C)]
pub struct HostApi {
    ctx: *mut c_void,
    define_module: DefineModuleFn,
    define_module_function0: DefineFunction0Fn,
    define_module_function1: DefineFunction1Fn,
    define_module_function2: DefineFunction2Fn,
}

impl HostApi {
    pub(crate) fn new(ctx: &mut InitContext) -> Self {
        Self {
            ctx: (ctx as *mut InitContext).cast(),
            define_module: host_define_module,
            define_module_function0: host_define_module_function0,
            define_module_function1: host_define_module_function1,
            define_module_function2: host_define_module_function2,
        }
    }

    /// Define or fetch a module; `None` if the host rejected it
    pub fn define_module(&self, name: &CStr) -> Option<RawValue> {
        let mut out = RawValue::NIL;
        // SAFETY: ctx points to the InitContext of the running load
        let status = unsafe { (self.define_module)(self.ctx, name.as_ptr(), &mut out) };
        (status == STATUS_OK).then_some(out)
    }

    /// Register an arity-0 function; `false` if the host rejected it
    pub fn define_module_function0(&self, module: RawValue, name: &CStr, f: ExternFn0) -> bool {
        // SAFETY: as above
        unsafe { (self.define_module_function0)(self.ctx, module, name.as_ptr(), f) == STATUS_OK }
    }

    /// Register an arity-1 function; `false` if the host rejected it
    pub fn define_module_function1(&self, module: RawValue, name: &CStr, f: ExternFn1) -> bool {
        // SAFETY: as above
        unsafe { (self.define_module_function1)(self.ctx, module, name.as_ptr(), f) == STATUS_OK }
    }

    /// Register an arity-2 function; `false` if the host rejected it
    pub fn define_module_function2(&self, module: RawValue, name: &CStr, f: ExternFn2) -> bool {
        // SAFETY: as above
        unsafe { (self.define_module_function2)(self.ctx, module, name.as_ptr(), f) == STATUS_OK }
    }
}

/// Run `f` against the context behind `ctx`, recording its error
unsafe fn with_context(
    ctx: *mut c_void,
    f: impl FnOnce(&mut InitContext) -> Result<(), RuntimeError>,
) -> c_int {
    let Some(ctx) = ctx.cast::<InitContext>().as_mut() else {
        return STATUS_ERROR;
    };
    if ctx.has_failed() {
        return STATUS_ERROR;
    }
    match f(ctx) {
        Ok(()) => STATUS_OK,
        Err(err) => {
            ctx.fail(err);
            STATUS_ERROR
        }
    }
}

/// Borrow a C string as UTF-8
unsafe fn c_str<'a>(ptr: *const c_char) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err("(null)".to_string());
    }
    let s = CStr::from_ptr(ptr);
    s.to_str().map_err(|_| s.to_string_lossy().into_owned())
}

fn namespace_of(module: RawValue) -> Result<Namespace, RuntimeError> {
    module.module_id().map(Namespace::from_id).ok_or_else(|| {
        RuntimeError::Conversion(ConversionError::TypeMismatch {
            expected: "Module".to_string(),
            found: format!("raw tag {}", module.tag),
        })
    })
}

unsafe fn define_function(
    ctx: *mut c_void,
    module: RawValue,
    name: *const c_char,
    callback: Callback,
) -> c_int {
    with_context(ctx, |ctx| {
        let ns = namespace_of(module)?;
        let name = c_str(name).map_err(RuntimeError::InvalidFunctionName)?;
        ctx.define_module_function(ns, name, callback)
    })
}

unsafe extern "C" fn host_define_module(
    ctx: *mut c_void,
    name: *const c_char,
    out: *mut RawValue,
) -> c_int {
    with_context(ctx, |ctx| {
        let name = c_str(name).map_err(RuntimeError::InvalidModuleName)?;
        let ns = ctx.define_module(name)?;
        if let Some(out) = out.as_mut() {
            *out = RawValue::module(ns.id());
        }
        Ok(())
    })
}

unsafe extern "C" fn host_define_module_function0(
    ctx: *mut c_void,
    module: RawValue,
    name: *const c_char,
    f: ExternFn0,
) -> c_int {
    define_function(ctx, module, name, Callback::Extern0(f))
}

unsafe extern "C" fn host_define_module_function1(
    ctx: *mut c_void,
    module: RawValue,
    name: *const c_char,
    f: ExternFn1,
) -> c_int {
    define_function(ctx, module, name, Callback::Extern1(f))
}

unsafe extern "C" fn host_define_module_function2(
    ctx: *mut c_void,
    module: RawValue,
    name: *const c_char,
    f: ExternFn2,
) -> c_int {
    define_function(ctx, module, name, Callback::Extern2(f))
}
