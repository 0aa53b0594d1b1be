//! Runtime Configuration (host.toml)
//!
//! Controls how the host runtime treats extension registrations.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What happens when a function name is registered twice in one namespace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedefinitionPolicy {
    /// The second registration fails and aborts the module load
    #[default]
    Reject,
    /// The second registration silently replaces the first
    Replace,
}

impl fmt::Display for RedefinitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedefinitionPolicy::Reject => write!(f, "reject"),
            RedefinitionPolicy::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for RedefinitionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(RedefinitionPolicy::Reject),
            "replace" => Ok(RedefinitionPolicy::Replace),
            other => Err(ConfigError::InvalidValue {
                field: "runtime.redefinition".to_string(),
                reason: format!("expected 'reject' or 'replace', got '{}'", other),
            }),
        }
    }
}

/// Host configuration from host.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Runtime behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeSection>,
}

/// `[runtime]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    /// Duplicate registration handling (default: reject)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redefinition: Option<RedefinitionPolicy>,

    /// Emit warnings when a function is replaced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

impl HostConfig {
    /// Load host configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }

    /// Effective redefinition policy
    pub fn redefinition(&self) -> RedefinitionPolicy {
        self.runtime
            .as_ref()
            .and_then(|r| r.redefinition)
            .unwrap_or_default()
    }

    /// Whether replacement warnings are emitted
    pub fn verbose(&self) -> bool {
        self.runtime.as_ref().and_then(|r| r.verbose).unwrap_or(false)
    }

    /// Override the redefinition policy
    pub fn set_redefinition(&mut self, policy: RedefinitionPolicy) {
        self.runtime.get_or_insert_with(Default::default).redefinition = Some(policy);
    }

    /// Override verbosity
    pub fn set_verbose(&mut self, verbose: bool) {
        self.runtime.get_or_insert_with(Default::default).verbose = Some(verbose);
    }
}
