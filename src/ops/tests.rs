use std::fs;
use std::path::Path;

use crate::config::SandboxConfig;
use crate::error::Error;

use super::*;

fn context_for(root: &Path) -> Context {
    Context::with_base_dir(SandboxConfig::with_roots([root]), root).expect("context")
}

#[test]
fn operation_names_parse_back_to_themselves() {
    for op in OperationName::ALL {
        assert_eq!(OperationName::parse(op.as_str()), Some(op));
        assert_eq!(op.to_string(), op.as_str());
    }
    assert_eq!(OperationName::parse("delete_file"), None);
    assert_eq!(OperationName::parse("READ_FILE"), None);
}

#[test]
fn operation_name_serde_matches_wire_name() {
    let json = serde_json::to_string(&OperationName::ListAllowedDirectories).expect("json");
    assert_eq!(json, "\"list_allowed_directories\"");
}

#[test]
fn context_rejects_missing_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope");
    match Context::with_base_dir(SandboxConfig::with_roots([&missing]), dir.path()) {
        Err(Error::InvalidConfig(msg)) => assert!(msg.contains("nope"), "{msg}"),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn context_rejects_file_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").expect("write");
    match Context::with_base_dir(SandboxConfig::with_roots([&file]), dir.path()) {
        Err(Error::InvalidConfig(_)) => {}
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn context_rejects_empty_roots() {
    let dir = tempfile::tempdir().expect("tempdir");
    match Context::with_base_dir(SandboxConfig::default(), dir.path()) {
        Err(Error::InvalidConfig(_)) => {}
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn relative_paths_resolve_against_base_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.txt"), "hello").expect("write");
    let ctx = context_for(dir.path());

    let resp = ctx
        .read_file(ReadFileRequest {
            path: "a.txt".into(),
        })
        .expect("read");
    assert_eq!(resp.content, "hello");
    assert_eq!(resp.path, Path::new("a.txt"));
}

#[test]
fn read_rejects_oversized_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("big.txt"), "0123456789").expect("write");
    let mut config = SandboxConfig::with_roots([dir.path()]);
    config.limits.max_read_bytes = 4;
    let ctx = Context::with_base_dir(config, dir.path()).expect("context");

    match ctx.read_file(ReadFileRequest {
        path: dir.path().join("big.txt"),
    }) {
        Err(Error::FileTooLarge {
            size_bytes,
            max_bytes,
            ..
        }) => {
            assert_eq!(size_bytes, 10);
            assert_eq!(max_bytes, 4);
        }
        other => panic!("expected FileTooLarge, got {other:?}"),
    }
}

#[test]
fn read_rejects_invalid_utf8() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("bin.dat"), [0xff, 0xfe, 0x00]).expect("write");
    let ctx = context_for(dir.path());
    match ctx.read_file(ReadFileRequest {
        path: dir.path().join("bin.dat"),
    }) {
        Err(Error::InvalidUtf8(_)) => {}
        other => panic!("expected InvalidUtf8, got {other:?}"),
    }
}

#[test]
fn write_respects_write_limit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = SandboxConfig::with_roots([dir.path()]);
    config.limits.max_write_bytes = 3;
    let ctx = Context::with_base_dir(config, dir.path()).expect("context");

    let err = ctx
        .write_file(WriteFileRequest {
            path: dir.path().join("out.txt"),
            content: "four".to_string(),
        })
        .expect_err("too large");
    assert!(matches!(err, Error::FileTooLarge { .. }), "{err:?}");
    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn write_reports_creation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context_for(dir.path());
    let path = dir.path().join("nested/new.txt");

    let first = ctx
        .write_file(WriteFileRequest {
            path: path.clone(),
            content: "one".to_string(),
        })
        .expect("write");
    assert!(first.created);
    assert_eq!(first.bytes_written, 3);

    let second = ctx
        .write_file(WriteFileRequest {
            path: path.clone(),
            content: "two".to_string(),
        })
        .expect("overwrite");
    assert!(!second.created);
    assert_eq!(fs::read_to_string(&path).expect("read"), "two");
}

#[test]
fn edit_without_change_leaves_file_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("a.txt");
    fs::write(&path, "alpha\n").expect("write");
    let ctx = context_for(dir.path());

    let resp = ctx
        .edit_file(EditFileRequest {
            path: path.clone(),
            edits: vec![crate::edit::EditOperation::new("missing", "x")],
            dry_run: false,
        })
        .expect("edit");
    assert!(resp.applied);
    assert!(!resp.results[0].is_match());
    assert!(!resp.diff_lines.has_changes());
    assert_eq!(fs::read_to_string(&path).expect("read"), "alpha\n");
}

#[test]
fn create_directory_rejects_existing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("f");
    fs::write(&path, "x").expect("write");
    let ctx = context_for(dir.path());

    let err = ctx
        .create_directory(CreateDirectoryRequest { path })
        .expect_err("file in the way");
    assert_eq!(err.kind(), crate::error::ErrorKind::AlreadyExists);
}

#[test]
fn list_allowed_directories_reports_normalized_roots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dotted = dir.path().join("sub/..");
    fs::create_dir(dir.path().join("sub")).expect("mkdir");
    let config = SandboxConfig::with_roots([dir.path().to_path_buf(), dotted]);
    let ctx = Context::with_base_dir(config, dir.path()).expect("context");

    let resp = ctx.list_allowed_directories();
    assert_eq!(resp.directories, vec![dir.path().to_path_buf()]);
}
