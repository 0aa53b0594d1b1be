//! Registration context handed to extension entry points
//!
//! An extension's `Init_<name>` receives an [`InitContext`] instead of
//! reaching for process-wide state. Everything it defines is staged in the
//! context and only committed to the runtime when the entry point succeeds.
//!
//! C entry points cannot return a Rust error, so registration failures made
//! through [`HostApi`](crate::abi::HostApi) are recorded here instead. The
//! first one is kept and fails the load.

use crate::error::RuntimeError;
use crate::function::Callback;
use crate::namespace::{ModuleTable, Namespace};
use host_config::RedefinitionPolicy;

/// Staging area for one extension load
#[derive(Debug)]
pub struct InitContext {
    feature: String,
    table: ModuleTable,
    policy: RedefinitionPolicy,
    verbose: bool,
    error: Option<RuntimeError>,
}

impl InitContext {
    pub(crate) fn new(
        feature: &str,
        table: ModuleTable,
        policy: RedefinitionPolicy,
        verbose: bool,
    ) -> Self {
        Self {
            feature: feature.to_string(),
            table,
            policy,
            verbose,
            error: None,
        }
    }

    /// Name of the feature being loaded
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Define a module, or fetch the existing one with this name
    pub fn define_module(&mut self, name: &str) -> Result<Namespace, RuntimeError> {
        self.table.define_module(name)
    }

    /// Register `callback` as `name` in `ns`
    ///
    /// The declared arity comes from the callback variant.
    pub fn define_module_function(
        &mut self,
        ns: Namespace,
        name: &str,
        callback: Callback,
    ) -> Result<(), RuntimeError> {
        self.table
            .define_function(ns, name, callback, self.policy, self.verbose)
    }

    /// Whether a registration through the C API has failed
    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Record a failure; later failures do not overwrite the first
    pub(crate) fn fail(&mut self, err: RuntimeError) {
        self.error.get_or_insert(err);
    }

    pub(crate) fn take_error(&mut self) -> Option<RuntimeError> {
        self.error.take()
    }

    pub(crate) fn into_table(self) -> ModuleTable {
        self.table
    }
}
