//! Sandbox containment.
//!
//! Every path that reaches the filesystem goes through [`contain`]: the writer, the retrieval
//! gateway, and the directory indexer all share it.

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Quick screen for caller-supplied strings before they are turned into paths.
///
/// Flags `..` segments, absolute paths, backslashes, null bytes and drive prefixes.
#[must_use]
pub fn has_traversal_marker(raw: &str) -> bool {
    raw.starts_with('/')
        || raw.contains(['\\', '\0'])
        || raw.split('/').any(|segment| segment == "..")
        || raw.split('/').next().is_some_and(|first| first.contains(':'))
}

/// Collapse `.` / `..` lexically while ensuring the path never escapes the sandbox root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Path attempted to escape sandbox via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed in sandbox".into()),
                });
            },
        }
    }

    Ok(out)
}

/// Joins `path` to the canonical `root` and proves the result stays inside it.
///
/// Existing targets are canonicalized (resolving symlinks) and compared component-wise against
/// `root`. Targets that do not exist yet are accepted when their nearest existing ancestor
/// canonicalizes inside `root`.
///
/// # Errors
/// Returns [`StorageError::PathTraversalAttempt`] on any escape and [`StorageError::Io`] when an
/// ancestor cannot be inspected.
pub fn contain(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();

    if path.is_absolute() {
        return Err(StorageError::PathTraversalAttempt {
            message: path.display().to_string().into(),
            context: Some("Absolute paths are not allowed in sandbox".into()),
        });
    }

    let joined = root.join(normalize_relative(path)?);

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_ancestors(root, &joined),
        Err(e) => Err(StorageError::Io {
            source: e,
            context: Some("Failed to canonicalize sandbox path".into()),
        }),
    }
}

fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Resolved path lies outside the sandbox".into()),
        })
    }
}

/// Walks up from a not-yet-existing path to its first existing ancestor and verifies that
/// ancestor is inside the sandbox, so a symlinked parent cannot redirect a write.
fn validate_ancestors(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversalAttempt {
            message: joined.display().to_string().into(),
            context: Some("Path is outside sandbox boundaries".into()),
        });
    }

    let mut current = joined.parent();

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        match path.canonicalize() {
            Ok(canonical) if canonical.starts_with(root) => return Ok(joined.to_path_buf()),
            Ok(canonical) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory is a symlink outside sandbox".into()),
                });
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => current = path.parent(),
            Err(e) => {
                return Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                });
            },
        }
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}
