use filetime::FileTime;
use predicates::prelude::*;

mod common;

#[test]
fn reset_hard_restores_dirtied_tracked_files() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "file.txt", "committed content\n");
    common::commit_all(dir.path(), "v1", "first");

    common::write_file(dir.path(), "file.txt", "uncommitted scribbles\n");

    common::run_lvc(dir.path(), &["reset", "--hard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) restored"));

    assert_eq!(common::read_file(dir.path(), "file.txt"), "committed content\n");
}

#[test]
fn default_reset_clears_the_index_but_keeps_edits() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "file.txt", "v1\n");
    common::commit_all(dir.path(), "v1", "first");

    common::write_file(dir.path(), "file.txt", "working edit\n");
    common::run_lvc(dir.path(), &["add", "file.txt"]).assert().success();

    common::run_lvc(dir.path(), &["reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staging area cleared"));

    // the edit survives on disk, just unstaged
    assert_eq!(common::read_file(dir.path(), "file.txt"), "working edit\n");
    common::run_lvc(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes to be committed:").not())
        .stdout(predicate::str::contains("modified:   file.txt"));
}

#[test]
fn rebuild_reproduces_the_committed_bytes_exactly() {
    let dir = common::init_repository();
    let big: String = (0..200).map(|i| format!("payload line {}\n", i)).collect();
    common::write_file(dir.path(), "big.txt", &big);
    common::write_file(dir.path(), "sub/nested.txt", "nested\n");
    common::commit_all(dir.path(), "v1", "first");

    // later version edits one file, exercising delta storage underneath
    let edited = format!("{}one more line\n", big);
    common::write_file(dir.path(), "big.txt", &edited);
    common::commit_all(dir.path(), "v2", "second");

    // wreck the working tree, then restore v1
    common::write_file(dir.path(), "big.txt", "garbage\n");
    std::fs::remove_file(dir.path().join("sub/nested.txt")).unwrap();

    common::run_lvc(dir.path(), &["rebuild", "v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored version 'v1'"));

    assert_eq!(common::read_file(dir.path(), "big.txt"), big);
    assert_eq!(common::read_file(dir.path(), "sub/nested.txt"), "nested\n");

    // and back forward to v2
    common::run_lvc(dir.path(), &["rebuild", "v2"]).assert().success();
    assert_eq!(common::read_file(dir.path(), "big.txt"), edited);
}

#[test]
fn rebuilding_twice_writes_nothing_the_second_time() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "file.txt", "stable content\n");
    common::commit_all(dir.path(), "v1", "first");

    common::run_lvc(dir.path(), &["rebuild", "v1"]).assert().success();

    // pin an old mtime; an idempotent rebuild must not rewrite the file
    let path = dir.path().join("file.txt");
    let pinned = FileTime::from_unix_time(1_000_000, 0);
    filetime::set_file_mtime(&path, pinned).unwrap();

    common::run_lvc(dir.path(), &["rebuild", "v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 file(s) written"));

    let metadata = std::fs::metadata(&path).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&metadata), pinned);

    common::run_lvc(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to commit, working tree clean"));
}

#[test]
fn rebuild_of_a_version_not_at_the_branch_head_detaches() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "file.txt", "one\n");
    common::commit_all(dir.path(), "v1", "first");
    common::write_file(dir.path(), "file.txt", "two\n");
    common::commit_all(dir.path(), "v2", "second");

    common::run_lvc(dir.path(), &["rebuild", "v1"]).assert().success();

    common::run_lvc(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HEAD detached at v1"));
    assert_eq!(common::read_file(dir.path(), "file.txt"), "one\n");
}

#[test]
fn rebuild_refuses_to_clobber_staged_changes() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "file.txt", "one\n");
    common::commit_all(dir.path(), "v1", "first");
    common::write_file(dir.path(), "file.txt", "two\n");
    common::commit_all(dir.path(), "v2", "second");

    common::write_file(dir.path(), "file.txt", "staged edit\n");
    common::run_lvc(dir.path(), &["add", "file.txt"]).assert().success();

    common::run_lvc(dir.path(), &["rebuild", "v1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("staged changes would be overwritten"));
}

#[test]
fn rebuild_of_an_unknown_version_is_refused() {
    let dir = common::init_repository();

    common::run_lvc(dir.path(), &["rebuild", "ghost"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("version not found: ghost"));
}
