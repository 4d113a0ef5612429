#![cfg(feature = "search")]

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use sandbox_fs::{ErrorKind, SearchFilesRequest};

use common::Sandbox;

fn seed(root: &Path) {
    for dir in ["src", "src/nested", "node_modules/pkg", "build"] {
        fs::create_dir_all(root.join(dir)).expect("mkdir");
    }
    for file in [
        "README.md",
        "src/main.rs",
        "src/Lib.RS",
        "src/nested/util.rs",
        "node_modules/pkg/index.rs",
        "build/out.rs",
    ] {
        fs::write(root.join(file), "").expect("write");
    }
}

fn search(sandbox: &Sandbox, pattern: &str, excludes: &[&str]) -> Vec<PathBuf> {
    sandbox
        .context()
        .search_files(SearchFilesRequest {
            path: sandbox.root(),
            pattern: pattern.to_string(),
            exclude_patterns: excludes.iter().map(|p| p.to_string()).collect(),
        })
        .expect("search")
        .matches
}

#[test]
fn pattern_matches_at_any_depth_ignoring_case() {
    let sandbox = Sandbox::new();
    seed(&sandbox.root());
    let root = sandbox.root();

    let found = search(&sandbox, "*.rs", &[]);
    assert_eq!(
        found,
        vec![
            root.join("build/out.rs"),
            root.join("node_modules/pkg/index.rs"),
            root.join("src/Lib.RS"),
            root.join("src/main.rs"),
            root.join("src/nested/util.rs"),
        ]
    );
}

#[test]
fn excludes_skip_whole_subtrees() {
    let sandbox = Sandbox::new();
    seed(&sandbox.root());
    let root = sandbox.root();

    let found = search(&sandbox, "*.rs", &["node_modules", "build/**"]);
    assert_eq!(
        found,
        vec![
            root.join("src/Lib.RS"),
            root.join("src/main.rs"),
            root.join("src/nested/util.rs"),
        ]
    );
}

#[test]
fn directories_match_but_start_dir_does_not() {
    let sandbox = Sandbox::new();
    seed(&sandbox.root());

    let found = search(&sandbox, "nested", &[]);
    assert_eq!(found, vec![sandbox.root().join("src/nested")]);
}

#[test]
fn default_excludes_apply_to_every_search() {
    let sandbox = Sandbox::new();
    seed(&sandbox.root());
    let mut config = common::test_config(&sandbox.root());
    config.search.default_excludes = vec!["NODE_MODULES".to_string()];
    let ctx = sandbox_fs::Context::with_base_dir(config, sandbox.root()).expect("ctx");

    let resp = ctx
        .search_files(SearchFilesRequest {
            path: sandbox.root(),
            pattern: "index.rs".to_string(),
            exclude_patterns: Vec::new(),
        })
        .expect("search");
    assert!(resp.matches.is_empty());
}

#[test]
fn result_limit_truncates() {
    let sandbox = Sandbox::new();
    seed(&sandbox.root());
    let mut config = common::test_config(&sandbox.root());
    config.limits.max_search_results = 2;
    let ctx = sandbox_fs::Context::with_base_dir(config, sandbox.root()).expect("ctx");

    let resp = ctx
        .search_files(SearchFilesRequest {
            path: sandbox.root(),
            pattern: "*.rs".to_string(),
            exclude_patterns: Vec::new(),
        })
        .expect("search");
    assert_eq!(resp.matches.len(), 2);
    assert!(resp.truncated);
}

#[test]
fn search_outside_is_denied() {
    let sandbox = Sandbox::new();
    let err = sandbox
        .context()
        .search_files(SearchFilesRequest {
            path: sandbox.outside(),
            pattern: "*".to_string(),
            exclude_patterns: Vec::new(),
        })
        .expect_err("denied");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[test]
fn invalid_pattern_is_invalid_argument() {
    let sandbox = Sandbox::new();
    let err = sandbox
        .context()
        .search_files(SearchFilesRequest {
            path: sandbox.root(),
            pattern: "[unclosed".to_string(),
            exclude_patterns: Vec::new(),
        })
        .expect_err("bad glob");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.outside().join("secret.rs"), "").expect("write");
    std::os::unix::fs::symlink(sandbox.outside(), sandbox.root().join("escape")).expect("symlink");

    let found = search(&sandbox, "*.rs", &[]);
    assert!(found.is_empty(), "{found:?}");
}
