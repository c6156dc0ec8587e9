use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// How a staged entry relates to the current version's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    /// Path absent from the current version's tree.
    Added,
    /// Path present with different (or re-staged) content.
    Modified,
}

/// How a tracked path's working-tree state diverges from what is recorded
/// for it (the index entry when staged, the current version's tree
/// otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceChange {
    Modified,
    Deleted,
}

/// The `status` result: staged-but-uncommitted, modified-but-unstaged, and
/// untracked paths.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub staged: BTreeMap<PathBuf, IndexChange>,
    pub modified: BTreeMap<PathBuf, WorkspaceChange>,
    pub untracked: BTreeSet<PathBuf>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.modified.is_empty() && self.untracked.is_empty()
    }
}
