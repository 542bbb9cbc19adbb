//! Shared testing utilities for resolute CLI tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Testing harness providing an isolated directory for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root }
    }

    /// Absolute path of the isolated directory.
    pub fn dir(&self) -> &Path {
        self.root.path()
    }

    /// Write a file into the isolated directory and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Build a command for invoking the compiled `resolute` binary inside
    /// the isolated directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("resolute").expect("Failed to locate resolute binary");
        cmd.current_dir(self.root.path());
        cmd
    }
}
