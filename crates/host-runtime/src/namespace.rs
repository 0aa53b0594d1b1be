//! Namespaces (modules) and the module table
//!
//! The module table maps module names to [`ModuleDef`]s, each holding its own
//! name-keyed function table. Both mappings are built during extension load
//! and only read afterwards.

use crate::error::RuntimeError;
use crate::function::{Callback, FunctionEntry};
use crate::value::{ModuleId, Value};
use host_config::RedefinitionPolicy;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Handle to a module in the runtime's module table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace(ModuleId);

impl Namespace {
    pub(crate) fn from_id(id: ModuleId) -> Self {
        Namespace(id)
    }

    pub fn id(self) -> ModuleId {
        self.0
    }

    /// The module object, passed as receiver to its functions
    pub fn receiver(self) -> Value {
        Value::Module(self.0)
    }
}

/// A defined module and its functions
#[derive(Debug, Clone)]
pub struct ModuleDef {
    name: String,
    functions: HashMap<String, FunctionEntry>,
}

impl ModuleDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.get(name)
    }

    /// Function names, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Name-indexed table of modules
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: Vec<ModuleDef>,
    by_name: HashMap<String, ModuleId>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a module, or fetch it if it already exists
    pub fn define_module(&mut self, name: &str) -> Result<Namespace, RuntimeError> {
        if !is_constant_name(name) {
            return Err(RuntimeError::InvalidModuleName(name.to_string()));
        }

        if let Some(&id) = self.by_name.get(name) {
            return Ok(Namespace(id));
        }

        let id = ModuleId(self.modules.len());
        self.modules.push(ModuleDef {
            name: name.to_string(),
            functions: HashMap::new(),
        });
        self.by_name.insert(name.to_string(), id);
        debug!(module = name, id = id.index(), "defined module");
        Ok(Namespace(id))
    }

    /// Register a function in a module
    pub fn define_function(
        &mut self,
        ns: Namespace,
        name: &str,
        callback: Callback,
        policy: RedefinitionPolicy,
        verbose: bool,
    ) -> Result<(), RuntimeError> {
        let module = self
            .modules
            .get_mut(ns.0.index())
            .ok_or(RuntimeError::InvalidHandle(ns.0.index()))?;

        if module.functions.contains_key(name) {
            match policy {
                RedefinitionPolicy::Reject => {
                    return Err(RuntimeError::DuplicateFunction {
                        module: module.name.clone(),
                        name: name.to_string(),
                    });
                }
                RedefinitionPolicy::Replace if verbose => {
                    warn!(module = %module.name, function = name, "method redefined");
                }
                RedefinitionPolicy::Replace => {}
            }
        }

        debug!(
            module = %module.name,
            function = name,
            arity = callback.arity(),
            "registered function"
        );
        module
            .functions
            .insert(name.to_string(), FunctionEntry::new(name, callback));
        Ok(())
    }

    pub fn get(&self, ns: Namespace) -> Result<&ModuleDef, RuntimeError> {
        self.modules
            .get(ns.0.index())
            .ok_or(RuntimeError::InvalidHandle(ns.0.index()))
    }

    pub fn lookup(&self, name: &str) -> Option<Namespace> {
        self.by_name.get(name).copied().map(Namespace)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }
}

/// `[A-Z][A-Za-z0-9_]*`
fn is_constant_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a warn-level subscriber and return what it logged
    fn capture_warnings(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn define_twice(policy: RedefinitionPolicy, verbose: bool) -> Result<(), RuntimeError> {
        let mut table = ModuleTable::new();
        let ns = table.define_module("Foo").unwrap();
        table.define_function(ns, "f", Callback::Arity0(one), policy, verbose)?;
        table.define_function(ns, "f", Callback::Arity0(two), policy, verbose)
    }

    fn one(_recv: Value) -> Value {
        Value::Fixnum(1)
    }

    fn two(_recv: Value) -> Value {
        Value::Fixnum(2)
    }

    #[test]
    fn test_define_or_fetch() {
        let mut table = ModuleTable::new();
        let a = table.define_module("Foo").unwrap();
        let b = table.define_module("Foo").unwrap();
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[rstest]
    #[case("foo")]
    #[case("")]
    #[case("Foo-Bar")]
    #[case("1Foo")]
    fn test_invalid_module_name(#[case] name: &str) {
        let mut table = ModuleTable::new();
        let err = table.define_module(name).unwrap_err();
        assert_eq!(err, RuntimeError::InvalidModuleName(name.to_string()));
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table = ModuleTable::new();
        let ns = table.define_module("Foo").unwrap();
        table
            .define_function(ns, "f", Callback::Arity0(one), RedefinitionPolicy::Reject, false)
            .unwrap();

        let err = table
            .define_function(ns, "f", Callback::Arity0(two), RedefinitionPolicy::Reject, false)
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::DuplicateFunction {
                module: "Foo".to_string(),
                name: "f".to_string(),
            }
        );

        let entry = table.get(ns).unwrap().function("f").unwrap();
        assert_eq!(entry.invoke("Foo", ns.receiver(), &[]).unwrap(), Value::Fixnum(1));
    }

    #[test]
    fn test_duplicate_replaced() {
        let mut table = ModuleTable::new();
        let ns = table.define_module("Foo").unwrap();
        table
            .define_function(ns, "f", Callback::Arity0(one), RedefinitionPolicy::Replace, true)
            .unwrap();
        table
            .define_function(ns, "f", Callback::Arity0(two), RedefinitionPolicy::Replace, true)
            .unwrap();

        let module = table.get(ns).unwrap();
        assert_eq!(module.function_names(), vec!["f"]);
        let entry = module.function("f").unwrap();
        assert_eq!(entry.invoke("Foo", ns.receiver(), &[]).unwrap(), Value::Fixnum(2));
    }

    #[test]
    fn test_verbose_replace_warns() {
        let logs = capture_warnings(|| define_twice(RedefinitionPolicy::Replace, true).unwrap());
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("method redefined"), "{logs}");
        assert!(logs.contains("module=Foo"), "{logs}");
    }

    #[rstest]
    #[case(RedefinitionPolicy::Replace, false)]
    #[case(RedefinitionPolicy::Reject, true)]
    fn test_redefinition_without_warning(
        #[case] policy: RedefinitionPolicy,
        #[case] verbose: bool,
    ) {
        let logs = capture_warnings(|| {
            let _ = define_twice(policy, verbose);
        });
        assert!(!logs.contains("method redefined"), "{logs}");
    }

    #[test]
    fn test_invalid_handle() {
        let mut table = ModuleTable::new();
        let mut other = ModuleTable::new();
        other.define_module("A").unwrap();
        let foreign = other.define_module("B").unwrap();

        let err = table
            .define_function(foreign, "f", Callback::Arity0(one), RedefinitionPolicy::Reject, false)
            .unwrap_err();
        assert_eq!(err, RuntimeError::InvalidHandle(1));
    }
}
