use std::fs;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MoveFileRequest {
    #[schemars(description = "Existing path")]
    pub source: PathBuf,
    #[schemars(description = "New path; must not exist")]
    pub destination: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFileResponse {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Renames a file or directory. Never overwrites: an existing destination (including a dangling
/// symlink) fails with `AlreadyExists`. Missing destination parents are created only once the
/// source is known to exist.
pub fn move_file(ctx: &Context, request: MoveFileRequest) -> Result<MoveFileResponse> {
    let source = ctx.allowed_path(&request.source)?;
    let destination = ctx.allowed_path(&request.destination)?;

    fs::symlink_metadata(&source)
        .map_err(|err| Error::io_path("metadata", &request.source, err))?;
    match fs::symlink_metadata(&destination) {
        Ok(_) => return Err(Error::AlreadyExists(request.destination)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(Error::io_path("metadata", &request.destination, err)),
    }

    super::io::ensure_parent_dirs(&destination)?;
    fs::rename(&source, &destination)
        .map_err(|err| Error::io_path("rename", &request.source, err))?;
    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        "move_file"
    );

    Ok(MoveFileResponse {
        source: request.source,
        destination: request.destination,
    })
}
