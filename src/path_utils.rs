//! Lexical path helpers shared by the path guard and the search walker.
//!
//! Nothing here touches the filesystem, so symlinks are never resolved.
//!
//! Invariants of `normalize_path_lexical`:
//! - Removes `.` segments.
//! - Resolves `..` against preceding *normal* segments when possible.
//! - Preserves leading `..` for relative paths (e.g. `../../a/../b` → `../../b`).
//! - For absolute paths, `..` cannot escape the filesystem root (e.g. `/../etc` → `/etc`).
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

pub fn normalize_path_lexical(path: &Path) -> PathBuf {
    enum Segment {
        ParentDir,
        Normal(OsString),
    }

    let mut path_prefix: Option<OsString> = None;
    let mut has_root = false;
    let mut segments: Vec<Segment> = Vec::new();

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(segments.last(), Some(Segment::Normal(_))) {
                    segments.pop();
                } else if !has_root {
                    segments.push(Segment::ParentDir);
                }
            }
            Component::Normal(part) => segments.push(Segment::Normal(part.to_os_string())),
            Component::RootDir => has_root = true,
            Component::Prefix(prefix) => path_prefix = Some(prefix.as_os_str().to_os_string()),
        }
    }

    let mut out = PathBuf::new();
    if let Some(prefix) = path_prefix {
        out.push(Path::new(&prefix));
    }
    if has_root {
        // Pushing `RootDir` after a Windows prefix would reset the path, so append a separator.
        out.as_mut_os_string()
            .push(std::path::MAIN_SEPARATOR.to_string());
    }
    for segment in segments {
        match segment {
            Segment::ParentDir => out.push(".."),
            Segment::Normal(part) => out.push(part),
        }
    }

    if out.as_os_str().is_empty() && path.is_relative() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Joins `path` onto `base` when relative, then normalizes lexically.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path_lexical(path)
    } else {
        normalize_path_lexical(&base.join(path))
    }
}

/// Component-wise prefix test.
///
/// `/home/alice/notes` is inside `/home/alice`; `/home/alice-evil` is not. Windows compares
/// components case-insensitively.
pub fn is_within(path: &Path, root: &Path) -> bool {
    let mut path_components = path.components();
    for root_component in root.components() {
        match path_components.next() {
            Some(component) if components_eq(component, root_component) => {}
            _ => return false,
        }
    }
    true
}

#[cfg(windows)]
fn components_eq(a: Component<'_>, b: Component<'_>) -> bool {
    a.as_os_str()
        .to_string_lossy()
        .eq_ignore_ascii_case(&b.as_os_str().to_string_lossy())
}

#[cfg(not(windows))]
fn components_eq(a: Component<'_>, b: Component<'_>) -> bool {
    a == b
}
