use std::fmt;
use std::fs;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListDirRequest {
    #[schemars(description = "Directory to list")]
    pub path: PathBuf,
}

/// Symlinks and special files are reported as `File`; only real directories are `Dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl fmt::Display for ListDirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Dir => write!(f, "[DIR] {}", self.name),
            EntryKind::File => write!(f, "[FILE] {}", self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDirResponse {
    pub path: PathBuf,
    pub entries: Vec<ListDirEntry>,
}

impl ListDirResponse {
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn list_directory(ctx: &Context, request: ListDirRequest) -> Result<ListDirResponse> {
    let dir = ctx.allowed_path(&request.path)?;

    let mut rows = fs::read_dir(&dir)
        .map_err(|err| Error::io_path("read_dir", &request.path, err))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|err| Error::io_path("read_dir", &request.path, err))?;
    rows.sort_by_key(|entry| entry.file_name());

    let mut entries = Vec::<ListDirEntry>::with_capacity(rows.len());
    for entry in rows {
        let file_type = entry
            .file_type()
            .map_err(|err| Error::io_path("file_type", entry.path(), err))?;
        entries.push(ListDirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: if file_type.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            },
        });
    }
    tracing::debug!(path = %dir.display(), entries = entries.len(), "list_directory");

    Ok(ListDirResponse {
        path: request.path,
        entries,
    })
}
