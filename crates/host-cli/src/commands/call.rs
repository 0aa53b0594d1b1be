use anyhow::Result;
use host_runtime::{Runtime, Value};

pub fn run(runtime: &Runtime, module: &str, function: &str, args: &[i64]) -> Result<()> {
    let args: Vec<Value> = args.iter().copied().map(Value::from_i64).collect();
    let result = runtime.call(module, function, &args)?;
    println!("{}", result);
    Ok(())
}
