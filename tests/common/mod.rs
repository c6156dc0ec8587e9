#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use std::path::Path;

/// Fresh directory, no repository yet.
pub fn empty_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// Fresh directory with an initialized repository.
pub fn init_repository() -> TempDir {
    let dir = empty_dir();
    run_lvc(dir.path(), &["init"]).assert().success();
    dir
}

pub fn run_lvc(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("lvc").expect("failed to find lvc binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn write_file(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent directories");
    }
    std::fs::write(path, content).expect("failed to write file");
}

pub fn read_file(dir: &Path, relative: &str) -> String {
    std::fs::read_to_string(dir.join(relative)).expect("failed to read file")
}

/// Stage everything and commit it under the given label.
pub fn commit_all(dir: &Path, label: &str, message: &str) {
    run_lvc(dir, &["add", "."]).assert().success();
    run_lvc(dir, &["commit", "-v", label, "-m", message])
        .assert()
        .success();
}
