//! `sandbox-fs` exposes filesystem tools to a client while confining every path to an explicit
//! allow-list of root directories.
//!
//! The containment check is lexical ([`guard::PathGuard`]); edits are literal, ordered
//! first-occurrence replacements ([`edit::apply_edits`]) reported with a positional line diff
//! ([`diff::diff`]). [`dispatch::Dispatcher`] maps tool calls onto [`ops`], and
//! [`server::SandboxServer`] exposes them as MCP tools through `rmcp`.

pub mod config;
#[cfg(feature = "config-io")]
pub mod config_io;
pub mod diff;
pub mod dispatch;
pub mod edit;
mod error;
pub mod frame;
pub mod guard;
pub mod ops;
pub mod path_utils;
pub mod server;

pub use config::{Limits, SandboxConfig, SearchRules};
pub use dispatch::{Dispatcher, Operation, ToolOutput};
pub use error::{Error, ErrorKind, Result};
pub use guard::{AllowedRoots, PathGuard};

pub use ops::{
    AllowedDirectoriesResponse, Context, CreateDirectoryRequest, CreateDirectoryResponse,
    EditFileRequest, EditFileResponse, EntryKind, FileInfoRequest, FileInfoResponse,
    ListDirEntry, ListDirRequest, ListDirResponse, MoveFileRequest, MoveFileResponse,
    OperationName, ReadFileRequest, ReadFileResponse, ReadManyOutcome, ReadMultipleFilesRequest,
    ReadMultipleFilesResponse, WriteFileRequest, WriteFileResponse, create_directory, edit_file,
    get_file_info, list_allowed_directories, list_directory, move_file, read_file,
    read_multiple_files, write_file,
};
#[cfg(feature = "search")]
pub use ops::{SearchFilesRequest, SearchFilesResponse, search_files};
