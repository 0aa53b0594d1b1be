//! Extension artifacts and entry point resolution
//!
//! The host loads an extension by file name. The module name is the file
//! name's stem up to the first `.`, and the entry point is `Init_<name>`:
//! - `foo.so` -> `Init_foo`
//! - `/lib/ext/foo.bundle` -> `Init_foo`
//!
//! The entry point must be exported under exactly that name or the load fails.
//!
//! Extensions are normally shared libraries opened with [`DylibArtifact`].
//! [`StaticArtifact`] serves the same entry points from an in-process table,
//! for extensions linked into the host binary and for tests.

use crate::abi::ExternInitFn;
use crate::error::RuntimeError;
use crate::init::InitContext;
use libloading::Library;
use std::fmt;
use std::path::{Path, PathBuf};

/// Rust entry point, handed the staging context directly
pub type InitFn = fn(&mut InitContext) -> Result<(), RuntimeError>;

/// Extension entry point
#[derive(Clone, Copy)]
pub enum EntryPoint {
    /// Linked into the host
    Rust(InitFn),
    /// Exported by a shared library as `unsafe extern "C" fn(*const HostApi)`
    Extern(ExternInitFn),
}

/// A loadable extension as the host sees it
pub trait Artifact {
    /// File name the artifact was built as
    fn file_name(&self) -> &str;

    /// Resolve an exported entry point by symbol name
    fn entry_point(&self, symbol: &str) -> Option<EntryPoint>;
}

/// Extension linked into the host binary
///
/// Holds the exported entry points as an in-process symbol table.
#[derive(Clone)]
pub struct StaticArtifact {
    file_name: String,
    exports: Vec<(String, EntryPoint)>,
}

impl StaticArtifact {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            exports: Vec::new(),
        }
    }

    /// Export `entry` under `symbol`
    pub fn with_export(mut self, symbol: impl Into<String>, entry: EntryPoint) -> Self {
        self.exports.push((symbol.into(), entry));
        self
    }

    /// Exported symbol names
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(|(name, _)| name.as_str())
    }
}

/// Extension opened from a shared library
///
/// The library stays loaded for as long as the artifact lives. Callbacks it
/// registered point into its code, so whoever commits them must keep the
/// artifact alive.
pub struct DylibArtifact {
    path: PathBuf,
    file_name: String,
    library: Library,
}

impl DylibArtifact {
    /// Open the shared library at `path`
    ///
    /// # Safety
    ///
    /// Opening a library runs its initialisers in this process, and its
    /// `Init_<name>` export is assumed to have the [`ExternInitFn`] signature.
    /// Only open trusted extensions.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| RuntimeError::InvalidArtifactName(path.display().to_string()))?
            .to_string();

        // A bare file name would go through the system search path
        let resolved = if path.parent().map_or(true, |p| p.as_os_str().is_empty()) {
            Path::new(".").join(path)
        } else {
            path.to_path_buf()
        };

        let library = unsafe { Library::new(&resolved) }.map_err(|e| RuntimeError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path: resolved,
            file_name,
            library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for DylibArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DylibArtifact")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Artifact for DylibArtifact {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn entry_point(&self, symbol: &str) -> Option<EntryPoint> {
        // SAFETY: `Init_*` exports have the ExternInitFn signature; the
        // pointer is only valid while `self.library` is loaded
        let init = unsafe { self.library.get::<ExternInitFn>(symbol.as_bytes()) }.ok()?;
        Some(EntryPoint::Extern(*init))
    }
}

impl fmt::Debug for StaticArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticArtifact")
            .field("file_name", &self.file_name)
            .field("exports", &self.symbols().collect::<Vec<_>>())
            .finish()
    }
}

impl Artifact for StaticArtifact {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn entry_point(&self, symbol: &str) -> Option<EntryPoint> {
        self.exports
            .iter()
            .find(|(name, _)| name == symbol)
            .map(|(_, entry)| *entry)
    }
}

/// Derive the feature (module) name from an artifact file name
///
/// # Examples
///
/// ```
/// use host_runtime::loader::feature_name;
///
/// assert_eq!(feature_name("foo.so").unwrap(), "foo");
/// assert_eq!(feature_name("/usr/lib/ext/foo.bundle").unwrap(), "foo");
/// assert!(feature_name(".so").is_err());
/// ```
pub fn feature_name(file_name: &str) -> Result<&str, RuntimeError> {
    let invalid = || RuntimeError::InvalidArtifactName(file_name.to_string());

    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(invalid)?;
    let stem = base.split('.').next().unwrap_or_default();

    let mut chars = stem.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(stem)
    } else {
        Err(invalid())
    }
}

/// Entry point symbol for a feature
pub fn entry_point_name(feature: &str) -> String {
    format!("Init_{}", feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn noop(_ctx: &mut InitContext) -> Result<(), RuntimeError> {
        Ok(())
    }

    #[rstest]
    #[case("foo.so", "foo")]
    #[case("foo.bundle", "foo")]
    #[case("foo.tar.so", "foo")]
    #[case("lib/ext/foo_bar.so", "foo_bar")]
    #[case("foo", "foo")]
    fn test_feature_name(#[case] file_name: &str, #[case] expected: &str) {
        assert_eq!(feature_name(file_name).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".so")]
    #[case("9foo.so")]
    #[case("foo-bar.so")]
    fn test_invalid_feature_name(#[case] file_name: &str) {
        assert_eq!(
            feature_name(file_name).unwrap_err(),
            RuntimeError::InvalidArtifactName(file_name.to_string())
        );
    }

    #[test]
    fn test_entry_point_name() {
        assert_eq!(entry_point_name("foo"), "Init_foo");
    }

    #[test]
    fn test_static_artifact_lookup() {
        let artifact =
            StaticArtifact::new("foo.so").with_export("Init_foo", EntryPoint::Rust(noop));
        assert_eq!(artifact.file_name(), "foo.so");
        assert!(artifact.entry_point("Init_foo").is_some());
        assert!(artifact.entry_point("Init_bar").is_none());
        assert_eq!(artifact.symbols().collect::<Vec<_>>(), vec!["Init_foo"]);
    }

    #[test]
    fn test_dylib_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.so");

        let err = DylibArtifact::open(&path).unwrap_err();
        assert!(matches!(err, RuntimeError::LoadFailed { .. }), "{err:?}");
    }

    #[test]
    fn test_dylib_not_a_library() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("foo.so");
        std::fs::write(&path, b"not an object file").unwrap();

        match DylibArtifact::open(&path).unwrap_err() {
            RuntimeError::LoadFailed { path: reported, .. } => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
