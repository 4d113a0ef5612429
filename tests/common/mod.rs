#![allow(dead_code)]

use std::path::Path;

use sandbox_fs::server::SandboxServer;
use sandbox_fs::{Context, Dispatcher, SandboxConfig};

pub fn test_config(root: &Path) -> SandboxConfig {
    SandboxConfig::with_roots([root])
}

/// A context rooted at `root`, resolving relative paths against it too.
pub fn test_context(root: &Path) -> Context {
    Context::with_base_dir(test_config(root), root).expect("ctx")
}

pub fn test_dispatcher(root: &Path) -> Dispatcher {
    Dispatcher::new(test_context(root))
}

pub fn test_server(root: &Path) -> SandboxServer {
    SandboxServer::new(test_dispatcher(root))
}

/// A sandbox root plus a sibling directory outside it, both under one tempdir.
pub struct Sandbox {
    pub dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("sandbox")).expect("mkdir sandbox");
        std::fs::create_dir(dir.path().join("outside")).expect("mkdir outside");
        Self { dir }
    }

    pub fn root(&self) -> std::path::PathBuf {
        self.dir.path().join("sandbox")
    }

    pub fn outside(&self) -> std::path::PathBuf {
        self.dir.path().join("outside")
    }

    pub fn context(&self) -> Context {
        test_context(&self.root())
    }
}
