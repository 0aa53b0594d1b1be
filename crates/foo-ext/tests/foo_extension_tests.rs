//! End-to-end tests for the foo extension
//!
//! Loads `foo.so` into a host runtime and calls the registered functions,
//! comparing against the native functions called directly. The shared
//! library tests open the `cdylib` cargo built next to this test binary.

use foo_ext::{adapter, artifact, Init_foo, ARTIFACT_FILE_NAME, MODULE_NAME};
use host_config::{HostConfig, RedefinitionPolicy};
use host_runtime::{
    EntryPoint, FromHost, RawValue, Runtime, RuntimeError, StaticArtifact, Value, FIXNUM_MAX,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn loaded() -> Runtime {
    let mut runtime = Runtime::new();
    assert!(runtime.require(&artifact()).unwrap());
    runtime
}

/// The built `foo-ext` shared library
fn built_library() -> PathBuf {
    let name = format!("{}foo_ext{}", DLL_PREFIX, DLL_SUFFIX);
    let exe = std::env::current_exe().unwrap();
    let deps = exe.parent().unwrap();
    [deps.join(&name), deps.join("..").join(&name)]
        .into_iter()
        .find(|path| path.exists())
        .unwrap_or_else(|| panic!("{} not found next to {}", name, exe.display()))
}

/// Copy the shared library into `dir` under `file_name`
fn install(dir: &TempDir, file_name: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    fs::copy(built_library(), &path).unwrap();
    path
}

// ============================================================================
// Load And Registration
// ============================================================================

#[test]
fn test_load_defines_foo() {
    let runtime = loaded();

    assert!(runtime.is_loaded("foo"));
    assert_eq!(runtime.module_names(), vec![MODULE_NAME]);

    let ns = runtime.namespace(MODULE_NAME).unwrap();
    let module = runtime.module(ns).unwrap();
    assert_eq!(
        module.function_names(),
        vec!["return_3", "return_i32_max", "return_i64_max"]
    );
    for name in module.function_names() {
        assert_eq!(module.function(name).unwrap().arity(), 0);
    }
}

#[test]
fn test_artifact_exports_init_foo() {
    let artifact = artifact();
    assert_eq!(ARTIFACT_FILE_NAME, "foo.so");
    assert_eq!(artifact.symbols().collect::<Vec<_>>(), vec!["Init_foo"]);
}

#[test]
fn test_renamed_artifact_fails_to_load() {
    let mut runtime = Runtime::new();
    let renamed =
        StaticArtifact::new("bar.so").with_export("Init_foo", EntryPoint::Extern(Init_foo));

    let err = runtime.require(&renamed).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::EntryPointNotFound {
            artifact: "bar.so".to_string(),
            symbol: "Init_bar".to_string(),
        }
    );
    assert!(runtime.namespace(MODULE_NAME).is_none());
    assert!(runtime.module_names().is_empty());
}

#[test]
fn test_second_copy_conflicts_under_reject() {
    let mut runtime = loaded();
    let copy = StaticArtifact::new("foo_copy.so")
        .with_export("Init_foo_copy", EntryPoint::Extern(Init_foo));

    let err = runtime.require(&copy).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::DuplicateFunction {
            module: "Foo".to_string(),
            name: "return_3".to_string(),
        }
    );
    assert!(!runtime.is_loaded("foo_copy"));
    assert_eq!(runtime.call(MODULE_NAME, "return_3", &[]).unwrap(), Value::Fixnum(3));
}

#[test]
fn test_second_copy_replaces_under_replace() {
    let mut config = HostConfig::default();
    config.set_redefinition(RedefinitionPolicy::Replace);

    let mut runtime = Runtime::with_config(&config);
    runtime.require(&artifact()).unwrap();
    let copy = StaticArtifact::new("foo_copy.so")
        .with_export("Init_foo_copy", EntryPoint::Extern(Init_foo));

    assert!(runtime.require(&copy).unwrap());
    assert_eq!(runtime.module_names(), vec![MODULE_NAME]);
    assert_eq!(runtime.call(MODULE_NAME, "return_3", &[]).unwrap(), Value::Fixnum(3));
}

// ============================================================================
// Shared Library
// ============================================================================

#[test]
fn test_dylib_load_and_call() {
    let dir = TempDir::new().unwrap();
    let path = install(&dir, ARTIFACT_FILE_NAME);
    let mut runtime = Runtime::new();

    assert!(runtime.require_path(&path).unwrap());
    assert!(runtime.is_loaded("foo"));
    assert_eq!(runtime.call(MODULE_NAME, "return_3", &[]).unwrap(), Value::Fixnum(3));
    assert_eq!(
        runtime.call(MODULE_NAME, "return_i64_max", &[]).unwrap(),
        Value::Bignum(i128::from(i64::MAX))
    );

    // Second require is a no-op and does not reopen the library
    assert!(!runtime.require_path(&path).unwrap());
}

#[test]
fn test_renamed_dylib_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = install(&dir, "bar.so");
    let mut runtime = Runtime::new();

    let err = runtime.require_path(&path).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::EntryPointNotFound {
            artifact: "bar.so".to_string(),
            symbol: "Init_bar".to_string(),
        }
    );
    assert!(!runtime.is_loaded("bar"));
    assert!(runtime.namespace(MODULE_NAME).is_none());
    assert!(runtime.module_names().is_empty());
}

#[test]
fn test_dylib_arity_checked() {
    let dir = TempDir::new().unwrap();
    let path = install(&dir, ARTIFACT_FILE_NAME);
    let mut runtime = Runtime::new();
    runtime.require_path(&path).unwrap();

    let err = runtime
        .call(MODULE_NAME, "return_3", &[Value::from(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ArgumentError {
            given: 1,
            expected: 0,
            ..
        }
    ));
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_return_3() {
    let runtime = loaded();
    let result = runtime.call("Foo", "return_3", &[]).unwrap();
    assert_eq!(result, Value::Fixnum(3));
}

#[rstest]
#[case("return_3", i64::from(foo_native::return_3()))]
#[case("return_i32_max", i64::from(foo_native::return_i32_max()))]
#[case("return_i64_max", foo_native::return_i64_max())]
fn test_round_trip_matches_native(#[case] name: &str, #[case] native: i64) {
    let runtime = loaded();
    let result = runtime.call(MODULE_NAME, name, &[]).unwrap();
    assert_eq!(i64::from_host(&result).unwrap(), native);
}

#[test]
fn test_i32_max_stays_fixnum() {
    let runtime = loaded();
    let result = runtime.call(MODULE_NAME, "return_i32_max", &[]).unwrap();
    assert_eq!(result, Value::Fixnum(i64::from(i32::MAX)));
}

#[test]
fn test_i64_max_is_widened() {
    let runtime = loaded();
    let result = runtime.call(MODULE_NAME, "return_i64_max", &[]).unwrap();

    assert!(i64::MAX > FIXNUM_MAX);
    assert_eq!(result, Value::Bignum(i128::from(i64::MAX)));
    assert_eq!(result.to_i64().unwrap(), i64::MAX);
}

#[rstest]
#[case(1)]
#[case(2)]
fn test_arity_mismatch(#[case] given: usize) {
    let runtime = loaded();
    let args = vec![Value::from(0); given];

    let err = runtime.call(MODULE_NAME, "return_3", &args).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::ArgumentError {
            module: "Foo".to_string(),
            name: "return_3".to_string(),
            given,
            expected: 0,
        }
    );
}

#[test]
fn test_adapter_ignores_receiver() {
    let runtime = loaded();
    let ns = runtime.namespace(MODULE_NAME).unwrap();

    let receiver = RawValue::try_from(ns.receiver()).unwrap();

    assert_eq!(adapter::foo_return_3(receiver), RawValue::from(3));
    assert_eq!(adapter::foo_return_3(RawValue::from(99)), RawValue::from(3));
    assert_eq!(adapter::foo_return_3(RawValue::NIL), RawValue::from(3));
}
