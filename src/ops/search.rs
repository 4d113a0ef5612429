use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Error, Result};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilesRequest {
    #[schemars(description = "Directory to search from")]
    pub path: PathBuf,
    #[schemars(description = "Glob matched case-insensitively at any depth")]
    pub pattern: String,
    #[serde(default)]
    #[schemars(description = "Globs whose matches, and their subtrees, are skipped")]
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilesResponse {
    /// Absolute paths in walk order.
    pub matches: Vec<PathBuf>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub scanned_entries: u64,
    #[serde(default)]
    pub skipped_walk_errors: u64,
}

fn build_glob(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .backslash_escape(false)
        .build()
        .map_err(|err| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
}

fn compile_search_pattern(pattern: &str) -> Result<GlobSet> {
    if pattern.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "search pattern must not be empty".to_string(),
        ));
    }
    let pattern = pattern.trim_start_matches('/');
    let mut builder = GlobSetBuilder::new();
    builder.add(build_glob(&format!("**/{pattern}"))?);
    builder.build().map_err(|err| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

/// Excludes without a `/` match a name at any depth; the rest are anchored at the search root.
fn compile_excludes<'a>(patterns: impl IntoIterator<Item = &'a String>) -> Result<Option<GlobSet>> {
    let mut builder = GlobSetBuilder::new();
    let mut count = 0usize;
    for pattern in patterns {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            continue;
        }
        let anchored = trimmed.trim_start_matches('/');
        if anchored.contains('/') {
            builder.add(build_glob(anchored)?);
        } else {
            builder.add(build_glob(&format!("**/{anchored}"))?);
        }
        count += 1;
    }
    if count == 0 {
        return Ok(None);
    }
    builder.build().map(Some).map_err(|err| Error::InvalidPattern {
        pattern: "excludePatterns".to_string(),
        message: err.to_string(),
    })
}

fn relative_to<'a>(path: &'a Path, start: &Path) -> &'a Path {
    path.strip_prefix(start).unwrap_or(path)
}

pub fn search_files(ctx: &Context, request: SearchFilesRequest) -> Result<SearchFilesResponse> {
    let start = ctx.allowed_path(&request.path)?;
    let matcher = compile_search_pattern(&request.pattern)?;
    let excludes = compile_excludes(
        request
            .exclude_patterns
            .iter()
            .chain(ctx.config().search.default_excludes.iter()),
    )?;

    let meta = std::fs::metadata(&start).map_err(|err| Error::io_path("metadata", &start, err))?;
    if !meta.is_dir() {
        return Err(Error::io_path(
            "read_dir",
            &start,
            std::io::Error::other("search root is not a directory"),
        ));
    }

    let limits = ctx.limits();
    let mut matches = Vec::<PathBuf>::new();
    let mut truncated = false;
    let mut scanned_entries = 0u64;
    let mut skipped_walk_errors = 0u64;

    let walker = WalkDir::new(&start)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match &excludes {
            Some(set) => !set.is_match(relative_to(entry.path(), &start)),
            None => true,
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skipped_walk_errors = skipped_walk_errors.saturating_add(1);
                tracing::debug!(error = %err, "search_files skipped unreadable entry");
                continue;
            }
        };
        scanned_entries = scanned_entries.saturating_add(1);
        if scanned_entries > limits.max_walk_entries as u64 {
            truncated = true;
            tracing::warn!(
                path = %start.display(),
                max_walk_entries = limits.max_walk_entries,
                "search_files stopped at walk entry limit"
            );
            break;
        }

        if !matcher.is_match(relative_to(entry.path(), &start)) {
            continue;
        }
        if !ctx.guard().is_allowed(entry.path()) {
            continue;
        }
        if matches.len() >= limits.max_search_results {
            truncated = true;
            tracing::warn!(
                path = %start.display(),
                max_search_results = limits.max_search_results,
                "search_files stopped at result limit"
            );
            break;
        }
        matches.push(entry.into_path());
    }
    tracing::debug!(
        path = %start.display(),
        pattern = %request.pattern,
        matches = matches.len(),
        scanned_entries,
        "search_files"
    );

    Ok(SearchFilesResponse {
        matches,
        truncated,
        scanned_entries,
        skipped_walk_errors,
    })
}
