use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Error, Result};

fn file_too_large(path: &Path, size_bytes: u64, max_bytes: u64) -> Error {
    Error::FileTooLarge {
        path: path.to_path_buf(),
        size_bytes,
        max_bytes,
    }
}

pub(super) fn read_bytes_limited(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let file = fs::File::open(path).map_err(|err| Error::io_path("open", path, err))?;
    let meta = file
        .metadata()
        .map_err(|err| Error::io_path("metadata", path, err))?;
    if meta.is_dir() {
        return Err(Error::io_path(
            "read",
            path,
            std::io::Error::other("path is a directory"),
        ));
    }
    if meta.len() > max_bytes {
        return Err(file_too_large(path, meta.len(), max_bytes));
    }

    let mut bytes = Vec::<u8>::new();
    file.take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| Error::io_path("read", path, err))?;
    let read_size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if read_size > max_bytes {
        return Err(file_too_large(path, read_size, max_bytes));
    }
    Ok(bytes)
}

pub(super) fn read_string_limited(path: &Path, max_bytes: u64) -> Result<String> {
    let bytes = read_bytes_limited(path, max_bytes)?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8(path.to_path_buf()))
}

pub(super) fn ensure_parent_dirs(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|err| Error::io_path("create_dir_all", parent, err))
}

/// Writes through a temporary sibling file and renames it over `path`.
///
/// Readers see either the old content or the new content. Permissions of an existing file are
/// carried over to the replacement.
pub(super) fn write_string_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        Error::InvalidArgument(format!(
            "invalid path {}: missing parent directory",
            path.display()
        ))
    })?;
    if path.file_name().is_none() {
        return Err(Error::InvalidArgument(format!(
            "invalid path {}: missing file name",
            path.display()
        )));
    }

    let existing_permissions = match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            return Err(Error::io_path(
                "write",
                path,
                std::io::Error::other("destination is a directory"),
            ));
        }
        Ok(meta) => Some(meta.permissions()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(Error::io_path("metadata", path, err)),
    };

    let mut tmp_file = tempfile::Builder::new()
        .prefix(".sandbox-fs.")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|err| Error::io_path("create_temp", path, err))?;
    tmp_file
        .as_file_mut()
        .write_all(content.as_bytes())
        .map_err(|err| Error::io_path("write", path, err))?;
    tmp_file
        .as_file_mut()
        .sync_all()
        .map_err(|err| Error::io_path("sync", path, err))?;
    if let Some(perms) = existing_permissions {
        tmp_file
            .as_file()
            .set_permissions(perms)
            .map_err(|err| Error::io_path("set_permissions", path, err))?;
    }

    tmp_file
        .persist(path)
        .map_err(|err| Error::io_path("rename", path, err.error))?;
    Ok(())
}
