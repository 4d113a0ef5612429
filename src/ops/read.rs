use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileRequest {
    #[schemars(description = "File to read")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadFileResponse {
    pub path: PathBuf,
    pub content: String,
}

pub fn read_file(ctx: &Context, request: ReadFileRequest) -> Result<ReadFileResponse> {
    let path = ctx.allowed_path(&request.path)?;
    let content = super::io::read_string_limited(&path, ctx.limits().max_read_bytes)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read_file");

    Ok(ReadFileResponse {
        path: request.path,
        content,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadMultipleFilesRequest {
    #[schemars(description = "Files to read; a failure on one path is reported inline")]
    pub paths: Vec<PathBuf>,
}

/// Per-path outcome of a batch read; exactly one of `content` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadManyOutcome {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadMultipleFilesResponse {
    pub files: Vec<ReadManyOutcome>,
}

/// Reads each path independently. A failure on one path is recorded in its entry and never fails
/// the batch.
pub fn read_multiple_files(
    ctx: &Context,
    request: ReadMultipleFilesRequest,
) -> Result<ReadMultipleFilesResponse> {
    let mut files = Vec::with_capacity(request.paths.len());
    for path in request.paths {
        let outcome = match read_file(ctx, ReadFileRequest { path: path.clone() }) {
            Ok(response) => ReadManyOutcome {
                path,
                content: Some(response.content),
                error: None,
            },
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "read_multiple_files entry failed");
                ReadManyOutcome {
                    path,
                    content: None,
                    error: Some(err.to_string()),
                }
            }
        };
        files.push(outcome);
    }
    Ok(ReadMultipleFilesResponse { files })
}
