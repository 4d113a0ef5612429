use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileInfoRequest {
    #[schemars(description = "File or directory")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoResponse {
    pub path: PathBuf,
    pub size: u64,
    pub is_directory: bool,
    pub is_file: bool,
    /// RFC 3339, UTC. `None` when the platform does not record it.
    pub created: Option<String>,
    pub modified: Option<String>,
    pub accessed: Option<String>,
    /// Last three octal digits of the mode, e.g. `"644"`.
    pub permissions: String,
}

fn format_time(value: SystemTime) -> Option<String> {
    OffsetDateTime::from(value).format(&Rfc3339).ok()
}

fn metadata_time(
    path: &std::path::Path,
    op: &'static str,
    value: std::io::Result<SystemTime>,
) -> Result<Option<String>> {
    match value {
        Ok(time) => Ok(format_time(time)),
        Err(err) if err.kind() == ErrorKind::Unsupported => Ok(None),
        Err(err) => Err(Error::io_path(op, path, err)),
    }
}

#[cfg(unix)]
fn permission_digits(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_digits(meta: &fs::Metadata) -> String {
    if meta.permissions().readonly() {
        "444".to_string()
    } else {
        "666".to_string()
    }
}

/// Follows symlinks, like `stat(2)`.
pub fn get_file_info(ctx: &Context, request: FileInfoRequest) -> Result<FileInfoResponse> {
    let path = ctx.allowed_path(&request.path)?;
    let meta = fs::metadata(&path).map_err(|err| Error::io_path("metadata", &request.path, err))?;

    let created = metadata_time(&request.path, "created", meta.created())?;
    let modified = metadata_time(&request.path, "modified", meta.modified())?;
    let accessed = metadata_time(&request.path, "accessed", meta.accessed())?;
    tracing::debug!(path = %path.display(), "get_file_info");

    Ok(FileInfoResponse {
        path: request.path,
        size: meta.len(),
        is_directory: meta.is_dir(),
        is_file: meta.is_file(),
        created,
        modified,
        accessed,
        permissions: permission_digits(&meta),
    })
}
