use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WriteFileRequest {
    #[schemars(description = "File to write")]
    pub path: PathBuf,
    #[schemars(description = "New file content")]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFileResponse {
    pub path: PathBuf,
    pub bytes_written: u64,
    pub created: bool,
}

/// Creates missing parent directories, then replaces the file content atomically.
pub fn write_file(ctx: &Context, request: WriteFileRequest) -> Result<WriteFileResponse> {
    let path = ctx.allowed_path(&request.path)?;

    let bytes_written = u64::try_from(request.content.len()).unwrap_or(u64::MAX);
    let max_bytes = ctx.limits().max_write_bytes;
    if bytes_written > max_bytes {
        return Err(Error::FileTooLarge {
            path: request.path,
            size_bytes: bytes_written,
            max_bytes,
        });
    }

    super::io::ensure_parent_dirs(&path)?;
    let created = !path.exists();
    super::io::write_string_atomic(&path, &request.content)?;
    tracing::debug!(path = %path.display(), bytes = bytes_written, created, "write_file");

    Ok(WriteFileResponse {
        path: request.path,
        bytes_written,
        created,
    })
}
