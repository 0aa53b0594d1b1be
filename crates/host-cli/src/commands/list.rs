use anyhow::Result;
use host_runtime::Runtime;

/// Prints `Module.function/arity`, one per line
pub fn run(runtime: &Runtime) -> Result<()> {
    for name in runtime.module_names() {
        let Some(ns) = runtime.namespace(name) else {
            continue;
        };
        let module = runtime.module(ns)?;
        for function in module.function_names() {
            if let Some(entry) = module.function(function) {
                println!("{}.{}/{}", name, function, entry.arity());
            }
        }
    }
    Ok(())
}
