use std::fs;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateDirectoryRequest {
    #[schemars(description = "Directory to create, with any missing parents")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectoryResponse {
    pub path: PathBuf,
    pub created: bool,
}

/// Creates the directory and any missing parents. An existing directory is not an error.
pub fn create_directory(
    ctx: &Context,
    request: CreateDirectoryRequest,
) -> Result<CreateDirectoryResponse> {
    let path = ctx.allowed_path(&request.path)?;

    let created = match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => false,
        Ok(_) => {
            return Err(Error::io_path(
                "create_dir_all",
                &request.path,
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "path exists and is not a directory",
                ),
            ));
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(&path)
                .map_err(|err| Error::io_path("create_dir_all", &request.path, err))?;
            true
        }
        Err(err) => return Err(Error::io_path("metadata", &request.path, err)),
    };
    tracing::debug!(path = %path.display(), created, "create_directory");

    Ok(CreateDirectoryResponse {
        path: request.path,
        created,
    })
}
