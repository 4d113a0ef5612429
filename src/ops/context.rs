use std::path::{Path, PathBuf};

use crate::config::{Limits, SandboxConfig};
use crate::error::{Error, Result};
use crate::guard::{AllowedRoots, PathGuard};

use super::{
    AllowedDirectoriesResponse, Context, CreateDirectoryRequest, CreateDirectoryResponse,
    EditFileRequest, EditFileResponse, FileInfoRequest, FileInfoResponse, ListDirRequest,
    ListDirResponse, MoveFileRequest, MoveFileResponse, ReadFileRequest, ReadFileResponse,
    ReadMultipleFilesRequest, ReadMultipleFilesResponse, WriteFileRequest, WriteFileResponse,
};
#[cfg(feature = "search")]
use super::{SearchFilesRequest, SearchFilesResponse};

impl Context {
    /// Builds a context whose relative paths resolve against the process working directory.
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let base_dir = std::env::current_dir().map_err(|err| {
            Error::InvalidConfig(format!("failed to read current directory: {err}"))
        })?;
        Self::with_base_dir(config, base_dir)
    }

    pub fn with_base_dir(config: SandboxConfig, base_dir: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let base_dir = base_dir.into();
        let roots = AllowedRoots::new(&base_dir, &config.roots);
        roots.validate_on_disk()?;
        tracing::debug!(roots = roots.len(), "allowed roots validated");

        Ok(Self {
            config,
            guard: PathGuard::new(roots, base_dir),
        })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn limits(&self) -> &Limits {
        &self.config.limits
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn allowed_roots(&self) -> &AllowedRoots {
        self.guard.roots()
    }

    pub fn read_file(&self, request: ReadFileRequest) -> Result<ReadFileResponse> {
        super::read_file(self, request)
    }

    pub fn read_multiple_files(
        &self,
        request: ReadMultipleFilesRequest,
    ) -> Result<ReadMultipleFilesResponse> {
        super::read_multiple_files(self, request)
    }

    pub fn write_file(&self, request: WriteFileRequest) -> Result<WriteFileResponse> {
        super::write_file(self, request)
    }

    pub fn edit_file(&self, request: EditFileRequest) -> Result<EditFileResponse> {
        super::edit_file(self, request)
    }

    pub fn create_directory(
        &self,
        request: CreateDirectoryRequest,
    ) -> Result<CreateDirectoryResponse> {
        super::create_directory(self, request)
    }

    pub fn list_directory(&self, request: ListDirRequest) -> Result<ListDirResponse> {
        super::list_directory(self, request)
    }

    pub fn move_file(&self, request: MoveFileRequest) -> Result<MoveFileResponse> {
        super::move_file(self, request)
    }

    #[cfg(feature = "search")]
    pub fn search_files(&self, request: SearchFilesRequest) -> Result<SearchFilesResponse> {
        super::search_files(self, request)
    }

    pub fn get_file_info(&self, request: FileInfoRequest) -> Result<FileInfoResponse> {
        super::get_file_info(self, request)
    }

    pub fn list_allowed_directories(&self) -> AllowedDirectoriesResponse {
        super::list_allowed_directories(self)
    }

    /// Guard entry point for operations: the resolved path, or `PermissionDenied`.
    pub(super) fn allowed_path(&self, path: &Path) -> Result<PathBuf> {
        self.guard.check(path)
    }
}
