use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diff::DiffRecord;
use crate::edit::{EditOperation, EditResult, apply_edits};
use crate::error::{Error, Result};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditFileRequest {
    #[schemars(description = "File to edit")]
    pub path: PathBuf,
    /// Applied in order; each replaces the first occurrence in the text left by the previous ones.
    pub edits: Vec<EditOperation>,
    #[serde(default)]
    #[schemars(description = "Compute results and diff without writing")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditFileResponse {
    pub dry_run: bool,
    pub path: PathBuf,
    pub results: Vec<EditResult>,
    /// Rendered positional diff (`- `, `+ `, two-space prefixes).
    pub diff: String,
    /// `true` unless this was a dry run, mirroring whether persistence was requested.
    pub applied: bool,
    #[serde(skip)]
    pub diff_lines: DiffRecord,
    #[serde(skip)]
    pub content: String,
}

pub fn edit_file(ctx: &Context, request: EditFileRequest) -> Result<EditFileResponse> {
    let path = ctx.allowed_path(&request.path)?;
    let original = super::io::read_string_limited(&path, ctx.limits().max_read_bytes)?;

    let outcome = apply_edits(&original, &request.edits);
    let matched = outcome
        .results
        .iter()
        .filter(|result| result.is_match())
        .count();

    if !request.dry_run && outcome.content != original {
        let size_bytes = u64::try_from(outcome.content.len()).unwrap_or(u64::MAX);
        let max_bytes = ctx.limits().max_write_bytes;
        if size_bytes > max_bytes {
            return Err(Error::FileTooLarge {
                path: request.path,
                size_bytes,
                max_bytes,
            });
        }
        super::io::write_string_atomic(&path, &outcome.content)?;
    }
    tracing::debug!(
        path = %path.display(),
        edits = request.edits.len(),
        matched,
        dry_run = request.dry_run,
        "edit_file"
    );

    Ok(EditFileResponse {
        dry_run: request.dry_run,
        path: request.path,
        results: outcome.results,
        diff: outcome.diff.to_string(),
        applied: !request.dry_run,
        diff_lines: outcome.diff,
        content: outcome.content,
    })
}
