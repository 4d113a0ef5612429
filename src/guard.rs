//! Root containment checks.
//!
//! The guard is purely lexical: candidate paths are made absolute against a fixed base directory
//! and normalized, but symlinks are never resolved. A path is allowed when one of the configured
//! roots is a whole-component prefix of it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path_utils;

/// The fixed, ordered set of directories the server may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AllowedRoots(Vec<PathBuf>);

impl AllowedRoots {
    /// Normalizes each root against `base_dir` and drops duplicates, keeping first occurrence.
    ///
    /// No filesystem access happens here; see [`AllowedRoots::validate_on_disk`].
    pub fn new<I, P>(base_dir: &Path, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut out = Vec::<PathBuf>::new();
        for root in roots {
            let normalized = path_utils::absolutize(base_dir, root.as_ref());
            if !out.contains(&normalized) {
                out.push(normalized);
            }
        }
        Self(out)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.0.iter()
    }

    /// Startup check: there is at least one root and every root is an existing directory.
    pub fn validate_on_disk(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::InvalidConfig(
                "no allowed directories specified".to_string(),
            ));
        }
        for root in &self.0 {
            let meta = fs::metadata(root).map_err(|err| {
                Error::InvalidConfig(format!(
                    "directory {} does not exist ({err})",
                    root.display()
                ))
            })?;
            if !meta.is_dir() {
                return Err(Error::InvalidConfig(format!(
                    "{} is not a directory",
                    root.display()
                )));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a AllowedRoots {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone)]
pub struct PathGuard {
    roots: AllowedRoots,
    base_dir: PathBuf,
}

impl PathGuard {
    pub fn new(roots: AllowedRoots, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            roots,
            base_dir: path_utils::normalize_path_lexical(&base_dir.into()),
        }
    }

    pub fn roots(&self) -> &AllowedRoots {
        &self.roots
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute, lexically normalized form of `candidate`.
    pub fn resolve(&self, candidate: &Path) -> PathBuf {
        path_utils::absolutize(&self.base_dir, candidate)
    }

    pub fn is_allowed(&self, candidate: &Path) -> bool {
        let resolved = self.resolve(candidate);
        self.roots
            .iter()
            .any(|root| path_utils::is_within(&resolved, root))
    }

    /// Resolves `candidate` and fails with `PermissionDenied` when it falls outside every root.
    pub fn check(&self, candidate: &Path) -> Result<PathBuf> {
        if candidate.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("path is empty".to_string()));
        }
        let resolved = self.resolve(candidate);
        if self
            .roots
            .iter()
            .any(|root| path_utils::is_within(&resolved, root))
        {
            Ok(resolved)
        } else {
            tracing::debug!(path = %candidate.display(), "path rejected by guard");
            Err(Error::PermissionDenied(candidate.to_path_buf()))
        }
    }
}
