//! CLI command implementations

pub mod call;
pub mod list;

use anyhow::{Context, Result};
use host_config::{ConfigLoader, HostConfig};
use host_runtime::{Artifact, Runtime, StaticArtifact};
use std::path::{Path, PathBuf};

/// Extensions linked into this binary
pub fn builtin_extensions() -> Vec<StaticArtifact> {
    vec![foo_ext::artifact()]
}

/// Load `path`, or search upwards from the current directory
pub fn load_config(path: Option<&Path>) -> Result<HostConfig> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("failed to load host.toml")
        }
    }
}

/// Create a runtime, load every built-in extension, then each of `libraries`
pub fn boot(config: &HostConfig, libraries: &[PathBuf]) -> Result<Runtime> {
    let mut runtime = Runtime::with_config(config);
    for artifact in builtin_extensions() {
        runtime
            .require(&artifact)
            .with_context(|| format!("failed to load {}", artifact.file_name()))?;
    }
    for path in libraries {
        runtime
            .require_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }
    Ok(runtime)
}
