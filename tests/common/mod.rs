#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub const SCRIPT_ENV: &str = "BUDGET_TREE_CLI_SCRIPT";
pub const HOME_ENV: &str = "BUDGET_TREE_HOME";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated application home.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// CLI command in script mode rooted at `home`, with colors off.
pub fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("budget_tree_cli").expect("binary built");
    cmd.env(SCRIPT_ENV, "1")
        .env(HOME_ENV, home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}
