use serde::{Deserialize, Serialize};

use crate::config::SandboxConfig;
use crate::guard::PathGuard;

mod context;
mod edit;
mod io;
mod list_dir;
mod mkdir;
mod move_path;
mod read;
mod roots;
#[cfg(feature = "search")]
mod search;
mod stat;
mod write;

pub use edit::{EditFileRequest, EditFileResponse, edit_file};
pub use list_dir::{EntryKind, ListDirEntry, ListDirRequest, ListDirResponse, list_directory};
pub use mkdir::{CreateDirectoryRequest, CreateDirectoryResponse, create_directory};
pub use move_path::{MoveFileRequest, MoveFileResponse, move_file};
pub use read::{
    ReadFileRequest, ReadFileResponse, ReadManyOutcome, ReadMultipleFilesRequest,
    ReadMultipleFilesResponse, read_file, read_multiple_files,
};
pub use roots::{AllowedDirectoriesResponse, list_allowed_directories};
#[cfg(feature = "search")]
pub use search::{SearchFilesRequest, SearchFilesResponse, search_files};
pub use stat::{FileInfoRequest, FileInfoResponse, get_file_info};
pub use write::{WriteFileRequest, WriteFileResponse, write_file};

#[cfg(test)]
mod tests;

/// Validated configuration plus the path guard every operation consults before touching disk.
pub struct Context {
    config: SandboxConfig,
    guard: PathGuard,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("roots", self.guard.roots())
            .field("limits", &self.config.limits)
            .finish_non_exhaustive()
    }
}

/// Wire-friendly operation names, as accepted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationName {
    ReadFile,
    ReadMultipleFiles,
    WriteFile,
    EditFile,
    CreateDirectory,
    ListDirectory,
    MoveFile,
    SearchFiles,
    GetFileInfo,
    ListAllowedDirectories,
}

impl OperationName {
    pub const ALL: [OperationName; 10] = [
        OperationName::ReadFile,
        OperationName::ReadMultipleFiles,
        OperationName::WriteFile,
        OperationName::EditFile,
        OperationName::CreateDirectory,
        OperationName::ListDirectory,
        OperationName::MoveFile,
        OperationName::SearchFiles,
        OperationName::GetFileInfo,
        OperationName::ListAllowedDirectories,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationName::ReadFile => "read_file",
            OperationName::ReadMultipleFiles => "read_multiple_files",
            OperationName::WriteFile => "write_file",
            OperationName::EditFile => "edit_file",
            OperationName::CreateDirectory => "create_directory",
            OperationName::ListDirectory => "list_directory",
            OperationName::MoveFile => "move_file",
            OperationName::SearchFiles => "search_files",
            OperationName::GetFileInfo => "get_file_info",
            OperationName::ListAllowedDirectories => "list_allowed_directories",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl std::fmt::Display for OperationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
