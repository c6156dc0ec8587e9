use predicates::prelude::predicate;

mod common;

#[test]
fn init_creates_the_engine_layout() {
    let dir = common::empty_dir();

    common::run_lvc(dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty lvc repository in"));

    let engine = dir.path().join(".lvc");
    assert!(engine.join("objects").is_dir());
    assert!(engine.join("refs").join("heads").is_dir());
    assert!(engine.join("versions").is_dir());
    assert!(engine.join("HEAD").is_file());
    assert!(engine.join("index").is_file());
    assert!(engine.join("stash").is_file());
    assert_eq!(
        common::read_file(dir.path(), ".lvc/HEAD").trim(),
        "ref: refs/heads/main"
    );
}

#[test]
fn init_twice_is_refused() {
    let dir = common::init_repository();

    common::run_lvc(dir.path(), &["init"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("repository already initialized"));
}

#[test]
fn commands_outside_a_repository_are_refused() {
    let dir = common::empty_dir();

    for args in [
        vec!["status"],
        vec!["log"],
        vec!["add", "."],
        vec!["commit", "-v", "v1", "-m", "m"],
    ] {
        common::run_lvc(dir.path(), &args)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("not an lvc repository"));
    }
}
