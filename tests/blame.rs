use predicates::prelude::predicate;

mod common;

#[test]
fn lines_are_attributed_to_the_version_that_introduced_them() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "file.txt", "a\nb\nc\n");
    common::commit_all(dir.path(), "v1", "first");

    common::write_file(dir.path(), "file.txt", "a\nx\nc\n");
    common::commit_all(dir.path(), "v2", "second");

    common::run_lvc(dir.path(), &["blame", "file.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1    1) a"))
        .stdout(predicate::str::contains("v2    2) x"))
        .stdout(predicate::str::contains("v1    3) c"));
}

#[test]
fn appended_lines_belong_to_the_appending_version() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "file.txt", "original\n");
    common::commit_all(dir.path(), "v1", "first");

    common::write_file(dir.path(), "file.txt", "original\nappended\n");
    common::commit_all(dir.path(), "v2", "second");

    common::write_file(dir.path(), "file.txt", "original\nappended\nnewest\n");
    common::commit_all(dir.path(), "v3", "third");

    common::run_lvc(dir.path(), &["blame", "file.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1    1) original"))
        .stdout(predicate::str::contains("v2    2) appended"))
        .stdout(predicate::str::contains("v3    3) newest"));
}

#[test]
fn a_file_added_later_is_fully_attributed_to_its_first_version() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "old.txt", "old\n");
    common::commit_all(dir.path(), "v1", "first");

    common::write_file(dir.path(), "late.txt", "late one\nlate two\n");
    common::run_lvc(dir.path(), &["add", "late.txt"]).assert().success();
    common::run_lvc(dir.path(), &["commit", "-v", "v2", "-m", "second"])
        .assert()
        .success();

    common::run_lvc(dir.path(), &["blame", "late.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v2    1) late one"))
        .stdout(predicate::str::contains("v2    2) late two"));
}

#[test]
fn blaming_an_untracked_file_is_refused() {
    let dir = common::init_repository();
    common::write_file(dir.path(), "tracked.txt", "x\n");
    common::commit_all(dir.path(), "v1", "first");

    common::run_lvc(dir.path(), &["blame", "ghost.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "file 'ghost.txt' is not tracked by the current version",
        ));
}
