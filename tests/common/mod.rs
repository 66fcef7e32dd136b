//! Shared harness for installer CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated project root handed to the installer through `TREEDOC_ROOT`.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn config_file(&self) -> PathBuf {
        self.root().join("data").join("configuration.json")
    }

    /// Write `contents` as the configuration document before a run.
    pub fn write_config(&self, contents: &str) {
        let path = self.config_file();
        fs::create_dir_all(path.parent().expect("config has a parent"))
            .expect("Failed to create data directory");
        fs::write(path, contents).expect("Failed to write configuration");
    }

    /// Installer command bound to this root with short timing budgets.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("treedoc-install").expect("Failed to locate installer binary");
        cmd.current_dir(self.root())
            .env("TREEDOC_ROOT", self.root())
            .env("TREEDOC_QUERY_TIMEOUT", "5")
            .env("TREEDOC_VERIFY_ATTEMPTS", "1")
            .env("TREEDOC_VERIFY_DELAY_MS", "0")
            .env_remove("RUST_LOG");
        cmd
    }
}
