use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error classes exposed at the protocol boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    IoFailure,
    UnknownOperation,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("io error during {op} ({}): {source}", .path.display())]
    IoPath {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "search")]
    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Access to {} is not allowed", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Destination {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    #[error("file is too large ({size_bytes} bytes; max {max_bytes} bytes): {}", .path.display())]
    FileTooLarge {
        path: PathBuf,
        size_bytes: u64,
        max_bytes: u64,
    },

    #[error("invalid utf-8 in file: {}", .0.display())]
    InvalidUtf8(PathBuf),

    #[error("invalid glob pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io_path(op: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::IoPath {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::InvalidArgument(_) | Error::InvalidPattern { .. } | Error::Json(_) => {
                ErrorKind::InvalidArgument
            }
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::UnknownOperation(_) => ErrorKind::UnknownOperation,
            Error::Io(err) | Error::IoPath { source: err, .. } => io_error_kind(err),
            #[cfg(feature = "search")]
            Error::WalkDir(err) => err.io_error().map_or(ErrorKind::IoFailure, io_error_kind),
            Error::InvalidConfig(_) | Error::FileTooLarge { .. } | Error::InvalidUtf8(_) => {
                ErrorKind::IoFailure
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::IoPath { .. } => "io_path",
            #[cfg(feature = "search")]
            Error::WalkDir(_) => "walkdir",
            Error::Json(_) => "json",
            Error::InvalidConfig(_) => "invalid_config",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::PermissionDenied(_) => "permission_denied",
            Error::AlreadyExists(_) => "already_exists",
            Error::UnknownOperation(_) => "unknown_operation",
            Error::FileTooLarge { .. } => "file_too_large",
            Error::InvalidUtf8(_) => "invalid_utf8",
            Error::InvalidPattern { .. } => "invalid_pattern",
        }
    }

    /// Errors that abort the request instead of being reported inside the tool result.
    pub fn is_protocol_level(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::PermissionDenied | ErrorKind::UnknownOperation
        )
    }
}

fn io_error_kind(err: &std::io::Error) -> ErrorKind {
    match err.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound,
        std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
        _ => ErrorKind::IoFailure,
    }
}
