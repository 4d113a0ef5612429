use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: u64,
    #[serde(default = "default_max_write_bytes")]
    pub max_write_bytes: u64,
    /// Upper bound on paths returned by one `search_files` call.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
    /// Upper bound on directory entries visited by one `search_files` call.
    #[serde(default = "default_max_walk_entries")]
    pub max_walk_entries: usize,
}

const fn default_max_read_bytes() -> u64 {
    10 * 1024 * 1024
}

const fn default_max_write_bytes() -> u64 {
    10 * 1024 * 1024
}

const fn default_max_search_results() -> usize {
    10_000
}

const fn default_max_walk_entries() -> usize {
    1_000_000
}

const MAX_READ_BYTES_HARD_CAP: u64 = 1024 * 1024 * 1024;
const MAX_WRITE_BYTES_HARD_CAP: u64 = 1024 * 1024 * 1024;
const MAX_SEARCH_RESULTS_HARD_CAP: usize = 1_000_000;
const MAX_WALK_ENTRIES_HARD_CAP: usize = 50_000_000;

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_read_bytes: default_max_read_bytes(),
            max_write_bytes: default_max_write_bytes(),
            max_search_results: default_max_search_results(),
            max_walk_entries: default_max_walk_entries(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchRules {
    /// Glob patterns excluded from every `search_files` call, in addition to the request's own.
    #[serde(default)]
    pub default_excludes: Vec<String>,
}

/// Startup configuration. Immutable once a [`crate::Context`] is built from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SandboxConfig {
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub search: SearchRules,
}

fn validate_u64_limit(value: u64, field: &str, hard_cap: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidConfig(format!("{field} must be > 0")));
    }
    if value > hard_cap {
        return Err(Error::InvalidConfig(format!(
            "{field} must be <= {hard_cap}"
        )));
    }
    Ok(())
}

fn validate_usize_limit(value: usize, field: &str, hard_cap: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidConfig(format!("{field} must be > 0")));
    }
    if value > hard_cap {
        return Err(Error::InvalidConfig(format!(
            "{field} must be <= {hard_cap}"
        )));
    }
    Ok(())
}

impl SandboxConfig {
    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Structural validation only; root existence is checked by `Context::new`.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(Error::InvalidConfig(
                "no allowed directories specified".to_string(),
            ));
        }
        for root in &self.roots {
            if root.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("root path is empty".to_string()));
            }
        }
        validate_u64_limit(
            self.limits.max_read_bytes,
            "limits.max_read_bytes",
            MAX_READ_BYTES_HARD_CAP,
        )?;
        validate_u64_limit(
            self.limits.max_write_bytes,
            "limits.max_write_bytes",
            MAX_WRITE_BYTES_HARD_CAP,
        )?;
        validate_usize_limit(
            self.limits.max_search_results,
            "limits.max_search_results",
            MAX_SEARCH_RESULTS_HARD_CAP,
        )?;
        validate_usize_limit(
            self.limits.max_walk_entries,
            "limits.max_walk_entries",
            MAX_WALK_ENTRIES_HARD_CAP,
        )?;
        for pattern in &self.search.default_excludes {
            if pattern.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "search.default_excludes must not contain empty patterns".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roots_are_rejected() {
        match SandboxConfig::default().validate() {
            Err(Error::InvalidConfig(message)) => assert!(message.contains("no allowed")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn zero_and_oversized_limits_are_rejected() {
        let mut config = SandboxConfig::with_roots(["/sandbox"]);
        config.validate().expect("defaults are valid");

        config.limits.max_read_bytes = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        config.limits = Limits::default();
        config.limits.max_search_results = MAX_SEARCH_RESULTS_HARD_CAP + 1;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn blank_default_excludes_are_rejected() {
        let mut config = SandboxConfig::with_roots(["/sandbox"]);
        config.search.default_excludes = vec!["  ".to_string()];
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
