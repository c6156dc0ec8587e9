//! Engine error kinds
//!
//! Every kind is recoverable at the command layer: the binary reports a
//! one-line diagnostic on stderr and exits non-zero. `CorruptObject` gets a
//! louder diagnostic because it signals on-disk data loss, but it is still
//! an ordinary error return, never an abort.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("corrupt object: digest mismatch for {0}")]
    CorruptObject(String),

    #[error("version not found: {0}")]
    VersionNotFound(String),

    #[error("version '{0}' already exists")]
    DuplicateVersion(String),

    #[error("nothing to commit, the staging area is empty or matches the current version")]
    EmptyCommit,

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("branch '{0}' already exists")]
    DuplicateBranch(String),

    #[error("cannot delete the current branch '{0}'")]
    CannotDeleteCurrentBranch(String),

    #[error("no branch or version named '{0}'")]
    TargetNotFound(String),

    #[error("staged changes would be overwritten by checkout: {0}")]
    DirtyWorkingTree(String),

    #[error("no staged changes to stash")]
    NothingToStash,

    #[error("the stash is empty")]
    StashEmpty,

    #[error("not an lvc repository: {}", .0.display())]
    RepositoryNotInitialized(PathBuf),

    #[error("repository already initialized at {}", .0.display())]
    RepositoryAlreadyInitialized(PathBuf),
}
