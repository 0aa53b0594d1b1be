//! Configuration Loader
//!
//! Handles loading configuration from host.toml and applying environment overrides.

use crate::runtime::{HostConfig, RedefinitionPolicy};
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::Path;

/// Configuration loader
///
/// Precedence, lowest first:
/// 1. Defaults
/// 2. host.toml
/// 3. Environment variables (HOST_*)
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find host.toml. Missing config is not
    /// an error; defaults are used.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<HostConfig> {
        let mut current = start_dir.to_path_buf();

        let config = loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                break HostConfig::load_from_file(&config_path)?;
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break HostConfig::default(),
            }
        };

        self.apply_env_overrides(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<HostConfig> {
        let config = HostConfig::load_from_file(config_path)?;
        self.apply_env_overrides(config)
    }

    /// Apply environment variable overrides
    ///
    /// - HOST_REDEFINITION=reject|replace
    /// - HOST_VERBOSE=true|1|yes
    pub fn apply_env_overrides(&self, mut config: HostConfig) -> ConfigResult<HostConfig> {
        if let Ok(policy) = env::var("HOST_REDEFINITION") {
            let policy: RedefinitionPolicy = policy.parse().map_err(|e| match e {
                ConfigError::InvalidValue { reason, .. } => ConfigError::InvalidValue {
                    field: "HOST_REDEFINITION".to_string(),
                    reason,
                },
                other => other,
            })?;
            config.set_redefinition(policy);
        }

        if let Ok(verbose) = env::var("HOST_VERBOSE") {
            let verbose = matches!(verbose.to_lowercase().as_str(), "true" | "1" | "yes");
            config.set_verbose(verbose);
        }

        Ok(config)
    }
}
