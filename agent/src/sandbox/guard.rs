//! Path containment for file tools.
//!
//! Caller-supplied paths are always interpreted relative to a single
//! sandbox root. Resolution happens in two passes: a syntactic pass that
//! rejects absolute paths and `..` segments without touching the disk, and a
//! canonicalization pass that follows symlinks and re-checks containment.

use crate::infrastructure::config::SandboxSettings;
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors produced while resolving a sandboxed path.
///
/// Messages only ever carry the caller-supplied relative path so the
/// absolute location of the sandbox root is not disclosed.
#[derive(Debug, Error)]
pub enum PathError {
    /// The path was empty.
    #[error("Path must not be empty")]
    Empty,
    /// The path contains a NUL byte.
    #[error("Path contains a NUL byte")]
    NulByte,
    /// The path is absolute, climbs out of the root, or resolves outside it.
    #[error("File access denied: path '{path}' is outside the allowed directory")]
    OutsideRoot {
        /// The path as supplied by the caller.
        path: String,
    },
    /// The path could not be canonicalized.
    #[error("Path '{path}' could not be resolved: {source}")]
    Unresolvable {
        /// The path as supplied by the caller.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The configured sandbox root is unusable.
    #[error("Invalid sandbox root '{root}': {source}")]
    InvalidRoot {
        /// The configured root.
        root: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}

/// A path proven to be equal to or below the sandbox root.
///
/// Only [`PathGuard::resolve`] can construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxedPath {
    absolute: PathBuf,
    requested: String,
}

impl SandboxedPath {
    /// The canonical absolute path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// The path exactly as the caller supplied it, safe to echo back.
    #[must_use]
    pub fn requested(&self) -> &str {
        &self.requested
    }
}

impl AsRef<Path> for SandboxedPath {
    fn as_ref(&self) -> &Path {
        &self.absolute
    }
}

/// Resolves caller paths against a canonical sandbox root.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Creates a guard for `root`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidRoot`] if the root cannot be canonicalized.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, PathError> {
        let root = root.as_ref();
        let canonical = dunce::canonicalize(root).map_err(|source| PathError::InvalidRoot {
            root: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root: canonical })
    }

    /// Creates a guard from sandbox settings.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidRoot`] if the configured root cannot be canonicalized.
    pub fn from_settings(settings: &SandboxSettings) -> Result<Self, PathError> {
        Self::new(&settings.root)
    }

    /// The canonical sandbox root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `relative` to a [`SandboxedPath`].
    ///
    /// The target itself does not need to exist; only its deepest existing
    /// ancestor is canonicalized. Existence checks are left to the caller.
    ///
    /// # Errors
    ///
    /// - [`PathError::Empty`] / [`PathError::NulByte`] for malformed input
    /// - [`PathError::OutsideRoot`] for absolute paths, `..` segments, or
    ///   symlinks that lead outside the root
    /// - [`PathError::Unresolvable`] if an existing segment cannot be
    ///   inspected or the target is a dangling symlink
    pub fn resolve(&self, relative: &str) -> Result<SandboxedPath, PathError> {
        let normalized = lexical_normalize(relative)?;
        let joined = self.root.join(&normalized);

        let canonical = canonicalize_existing_prefix(&joined, 0).map_err(|source| {
            PathError::Unresolvable {
                path: relative.to_string(),
                source,
            }
        })?;

        if !canonical.path.starts_with(&self.root) {
            return Err(PathError::OutsideRoot {
                path: relative.to_string(),
            });
        }
        if canonical.dangling {
            return Err(PathError::Unresolvable {
                path: relative.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "dangling symbolic link"),
            });
        }

        Ok(SandboxedPath {
            absolute: canonical.path,
            requested: relative.to_string(),
        })
    }
}

/// Rejects absolute and climbing paths, dropping `.` segments.
fn lexical_normalize(relative: &str) -> Result<PathBuf, PathError> {
    if relative.is_empty() {
        return Err(PathError::Empty);
    }
    if relative.contains('\0') {
        return Err(PathError::NulByte);
    }

    let mut normalized = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::OutsideRoot {
                    path: relative.to_string(),
                });
            }
        }
    }
    Ok(normalized)
}

/// Symlink hops followed before giving up, matching Linux `MAXSYMLINKS`.
const MAX_LINK_HOPS: usize = 40;

/// Where a path lands once every existing symlink is expanded.
struct Canonical {
    path: PathBuf,
    /// A symlink on the way points at something that does not exist.
    dangling: bool,
}

/// Canonicalizes the deepest existing ancestor of `path` and re-appends the
/// components that do not exist yet. Dangling symlinks are followed to
/// where their target would be created.
fn canonicalize_existing_prefix(path: &Path, hops: usize) -> io::Result<Canonical> {
    let mut existing = path.to_path_buf();
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match std::fs::symlink_metadata(&existing) {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let Some(name) = existing.file_name().map(ToOwned::to_owned) else {
                    return Err(e);
                };
                missing.push(name);
                if !existing.pop() {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }

    let mut resolved = match dunce::canonicalize(&existing) {
        Ok(path) => Canonical {
            path,
            dangling: false,
        },
        // symlink_metadata succeeded, so a NotFound here is a dangling link.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if hops >= MAX_LINK_HOPS {
                return Err(io::Error::other("too many levels of symbolic links"));
            }
            let target = std::fs::read_link(&existing)?;
            let target = match existing.parent() {
                Some(parent) => parent.join(target),
                None => target,
            };
            let mut followed = canonicalize_existing_prefix(&target, hops + 1)?;
            followed.dangling = true;
            followed
        }
        Err(e) => return Err(e),
    };

    for part in missing.iter().rev() {
        resolved.path.push(part);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lexical_normalize_strips_cur_dir() -> anyhow::Result<()> {
        let normalized = lexical_normalize("./wp-content/./themes")?;
        assert_eq!(normalized, PathBuf::from("wp-content/themes"));
        Ok(())
    }

    #[test]
    fn test_lexical_normalize_rejects_climbing() {
        assert!(matches!(
            lexical_normalize("wp-content/../../etc"),
            Err(PathError::OutsideRoot { .. })
        ));
        assert!(matches!(
            lexical_normalize("/etc/passwd"),
            Err(PathError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_lexical_normalize_rejects_malformed() {
        assert!(matches!(lexical_normalize(""), Err(PathError::Empty)));
        assert!(matches!(lexical_normalize("a\0b"), Err(PathError::NulByte)));
    }

    #[test]
    fn test_resolve_new_file_under_missing_directory() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let guard = PathGuard::new(dir.path())?;

        let resolved = guard.resolve("new/dir/file.txt")?;
        assert!(resolved.as_path().starts_with(guard.root()));
        assert!(resolved.as_path().ends_with("new/dir/file.txt"));
        assert!(!dir.path().join("new").exists());
        Ok(())
    }

    #[test]
    fn test_error_message_hides_root() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let guard = PathGuard::new(dir.path())?;

        let err = guard
            .resolve("../../etc/passwd")
            .expect_err("climbing path must be rejected");
        let message = err.to_string();
        assert!(message.contains("../../etc/passwd"));
        assert!(!message.contains(&guard.root().to_string_lossy().to_string()));
        Ok(())
    }

    #[test]
    fn test_invalid_root() {
        let result = PathGuard::new("/nonexistent/sandbox/root/for/tests");
        assert!(matches!(result, Err(PathError::InvalidRoot { .. })));
    }
}
