//! Embedding runtime
//!
//! [`Runtime`] owns the module table and the set of loaded features. It is the
//! single object an embedder holds: extensions are loaded into it with
//! [`Runtime::require_path`] (shared libraries) or [`Runtime::require`] (any
//! [`Artifact`]), and registered functions are called through [`Runtime::call`].
//!
//! # Examples
//!
//! ```
//! use host_runtime::{
//!     Callback, EntryPoint, InitContext, Runtime, RuntimeError, StaticArtifact, Value,
//! };
//!
//! fn answer(_recv: Value) -> Value {
//!     Value::from(42)
//! }
//!
//! #[allow(non_snake_case)]
//! fn Init_answer(ctx: &mut InitContext) -> Result<(), RuntimeError> {
//!     let ns = ctx.define_module("Answer")?;
//!     ctx.define_module_function(ns, "get", Callback::Arity0(answer))
//! }
//!
//! let mut runtime = Runtime::new();
//! let artifact =
//!     StaticArtifact::new("answer.so").with_export("Init_answer", EntryPoint::Rust(Init_answer));
//! assert!(runtime.require(&artifact).unwrap());
//! assert_eq!(runtime.call("Answer", "get", &[]).unwrap(), Value::Fixnum(42));
//! ```

use crate::abi::HostApi;
use crate::error::RuntimeError;
use crate::init::InitContext;
use crate::loader::{entry_point_name, feature_name, Artifact, DylibArtifact, EntryPoint};
use crate::namespace::{ModuleDef, ModuleTable, Namespace};
use crate::value::Value;
use host_config::{HostConfig, RedefinitionPolicy};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Host runtime instance
#[derive(Debug, Default)]
pub struct Runtime {
    modules: ModuleTable,
    features: HashSet<String>,
    policy: RedefinitionPolicy,
    verbose: bool,
    // Registered callbacks point into these; dropped after `modules`
    libraries: Vec<DylibArtifact>,
}

impl Runtime {
    /// Create a runtime with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime configured from `config`
    pub fn with_config(config: &HostConfig) -> Self {
        Self {
            policy: config.redefinition(),
            verbose: config.verbose(),
            ..Self::default()
        }
    }

    pub fn redefinition_policy(&self) -> RedefinitionPolicy {
        self.policy
    }

    /// Load an extension
    ///
    /// Derives the feature name from the artifact's file name, resolves
    /// `Init_<feature>` and runs it. Returns `Ok(false)` if the feature is
    /// already loaded. On error nothing the entry point defined is kept.
    pub fn require(&mut self, artifact: &dyn Artifact) -> Result<bool, RuntimeError> {
        let feature = feature_name(artifact.file_name())?;
        if self.features.contains(feature) {
            debug!(feature, "already loaded");
            return Ok(false);
        }

        let symbol = entry_point_name(feature);
        let entry = artifact
            .entry_point(&symbol)
            .ok_or_else(|| RuntimeError::EntryPointNotFound {
                artifact: artifact.file_name().to_string(),
                symbol: symbol.clone(),
            })?;

        let mut ctx = InitContext::new(feature, self.modules.clone(), self.policy, self.verbose);
        match entry {
            EntryPoint::Rust(init) => init(&mut ctx)?,
            EntryPoint::Extern(init) => {
                let api = HostApi::new(&mut ctx);
                // SAFETY: `api` and the context it points to outlive the call
                unsafe { init(&api) };
                if let Some(err) = ctx.take_error() {
                    return Err(err);
                }
            }
        }

        self.modules = ctx.into_table();
        self.features.insert(feature.to_string());
        info!(feature, entry = %symbol, modules = self.modules.len(), "loaded extension");
        Ok(true)
    }

    /// Load an extension from a shared library
    ///
    /// Same contract as [`Runtime::require`]. The library stays open for the
    /// lifetime of the runtime once its entry point succeeds; a failed load
    /// closes it again.
    pub fn require_path(&mut self, path: impl AsRef<Path>) -> Result<bool, RuntimeError> {
        let path = path.as_ref();
        let file_name = path
            .to_str()
            .ok_or_else(|| RuntimeError::InvalidArtifactName(path.display().to_string()))?;
        let feature = feature_name(file_name)?;
        if self.features.contains(feature) {
            debug!(feature, "already loaded");
            return Ok(false);
        }

        let artifact = DylibArtifact::open(path)?;
        let loaded = self.require(&artifact)?;
        if loaded {
            debug!(path = %artifact.path().display(), "keeping library open");
            self.libraries.push(artifact);
        }
        Ok(loaded)
    }

    /// Whether a feature has been loaded
    pub fn is_loaded(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Look up a module by name
    pub fn namespace(&self, name: &str) -> Option<Namespace> {
        self.modules.lookup(name)
    }

    /// Module definition behind a handle
    pub fn module(&self, ns: Namespace) -> Result<&ModuleDef, RuntimeError> {
        self.modules.get(ns)
    }

    /// Names of all defined modules, in definition order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.names().collect()
    }

    /// Call `module.name(args)`
    pub fn call(&self, module: &str, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let ns = self
            .namespace(module)
            .ok_or_else(|| RuntimeError::UninitializedConstant(module.to_string()))?;
        self.call_in(ns, name, args)
    }

    /// Call `name(args)` in the module behind `ns`
    pub fn call_in(&self, ns: Namespace, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let module = self.modules.get(ns)?;
        let entry = module
            .function(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                module: module.name().to_string(),
                name: name.to_string(),
            })?;
        entry.invoke(module.name(), ns.receiver(), args)
    }
}
