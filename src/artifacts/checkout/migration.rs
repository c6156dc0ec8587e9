//! Working-tree migration
//!
//! Plans and applies the file system changes needed to move the working
//! tree from one snapshot to another:
//!
//! 1. every path in the target tree whose on-disk content digest differs is
//!    written from the object store — paths already holding the right
//!    content are left alone, which keeps materialization idempotent and
//!    preserves timestamps of unchanged files
//! 2. every tracked path present in the current tree but absent from the
//!    target is deleted
//!
//! Planning happens before any write, so callers can first check the plan
//! against the staging area and refuse to clobber staged work.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::tree::Tree;
use std::path::PathBuf;

pub struct Migration<'r> {
    database: &'r Database,
    workspace: &'r Workspace,
    writes: Vec<(PathBuf, Digest)>,
    deletes: Vec<PathBuf>,
}

impl<'r> Migration<'r> {
    /// Plan the move from `current` to `target`. Reads the working tree but
    /// does not touch it.
    pub fn plan(
        database: &'r Database,
        workspace: &'r Workspace,
        current: &Tree,
        target: &Tree,
    ) -> anyhow::Result<Self> {
        let mut writes = Vec::new();
        for (path, entry) in target.entries() {
            if workspace.digest_of(&path)?.as_ref() != Some(&entry.digest) {
                writes.push((path, entry.digest.clone()));
            }
        }

        let mut deletes = Vec::new();
        for (path, _) in current.entries() {
            if !target.contains(&path) && workspace.file_exists(&path) {
                deletes.push(path);
            }
        }

        Ok(Migration {
            database,
            workspace,
            writes,
            deletes,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.writes.is_empty() && self.deletes.is_empty()
    }

    /// Staged paths this migration would overwrite or delete.
    pub fn staged_conflicts(&self, index: &Index) -> Vec<PathBuf> {
        self.writes
            .iter()
            .map(|(path, _)| path)
            .chain(self.deletes.iter())
            .filter(|path| index.entry_by_path(path).is_some())
            .cloned()
            .collect()
    }

    /// Apply the plan: writes first, then deletions. Returns the number of
    /// paths written and deleted.
    pub fn apply(&self) -> anyhow::Result<(usize, usize)> {
        for (path, digest) in &self.writes {
            let content = self.database.get(digest)?;
            self.workspace.write_file(path, &content)?;
        }

        for path in &self.deletes {
            self.workspace.remove_file(path)?;
        }

        Ok((self.writes.len(), self.deletes.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::index::IndexEntry;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn setup() -> (assert_fs::TempDir, Database, Workspace) {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join(".lvc").join("objects").into_boxed_path());
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());
        (dir, database, workspace)
    }

    fn tree_with(database: &Database, files: &[(&str, &[u8])]) -> Tree {
        Tree::empty().updated_with(files.iter().map(|(path, content)| {
            (PathBuf::from(path), database.put(content).unwrap())
        }))
    }

    #[test]
    fn materializes_missing_and_changed_paths() {
        let (_dir, database, workspace) = setup();
        workspace.write_file(Path::new("stale.txt"), b"old").unwrap();
        let target = tree_with(&database, &[("stale.txt", b"new"), ("added.txt", b"add")]);

        let migration =
            Migration::plan(&database, &workspace, &Tree::empty(), &target).unwrap();
        let (written, deleted) = migration.apply().unwrap();

        assert_eq!((written, deleted), (2, 0));
        assert_eq!(workspace.read_file(Path::new("stale.txt")).unwrap().as_ref(), b"new");
        assert_eq!(workspace.read_file(Path::new("added.txt")).unwrap().as_ref(), b"add");
    }

    #[test]
    fn second_materialization_is_a_noop() {
        let (_dir, database, workspace) = setup();
        let target = tree_with(&database, &[("a.txt", b"a"), ("b/c.txt", b"c")]);

        Migration::plan(&database, &workspace, &Tree::empty(), &target)
            .unwrap()
            .apply()
            .unwrap();
        let second = Migration::plan(&database, &workspace, &target, &target).unwrap();

        assert!(second.is_noop());
    }

    #[test]
    fn tracked_paths_absent_from_target_are_deleted() {
        let (_dir, database, workspace) = setup();
        let current = tree_with(&database, &[("keep.txt", b"k"), ("drop.txt", b"d")]);
        Migration::plan(&database, &workspace, &Tree::empty(), &current)
            .unwrap()
            .apply()
            .unwrap();
        let target = tree_with(&database, &[("keep.txt", b"k")]);

        let migration = Migration::plan(&database, &workspace, &current, &target).unwrap();
        let (written, deleted) = migration.apply().unwrap();

        assert_eq!((written, deleted), (0, 1));
        assert!(!workspace.file_exists(Path::new("drop.txt")));
        assert!(workspace.file_exists(Path::new("keep.txt")));
    }

    #[test]
    fn untracked_files_survive_migration() {
        let (_dir, database, workspace) = setup();
        workspace.write_file(Path::new("private.txt"), b"mine").unwrap();
        let target = tree_with(&database, &[("a.txt", b"a")]);

        Migration::plan(&database, &workspace, &Tree::empty(), &target)
            .unwrap()
            .apply()
            .unwrap();

        assert!(workspace.file_exists(Path::new("private.txt")));
    }

    #[test]
    fn staged_conflicts_reports_overlap_with_the_index() {
        let (dir, database, workspace) = setup();
        workspace.write_file(Path::new("f.txt"), b"v1").unwrap();
        let current = tree_with(&database, &[("f.txt", b"v1")]);
        let target = tree_with(&database, &[("f.txt", b"v2")]);

        let mut index = Index::new(dir.path().join(".lvc").join("index").into_boxed_path());
        index.add(IndexEntry::new(
            PathBuf::from("f.txt"),
            Digest::of(b"staged"),
            Utc::now(),
        ));

        let migration = Migration::plan(&database, &workspace, &current, &target).unwrap();
        assert_eq!(migration.staged_conflicts(&index), vec![PathBuf::from("f.txt")]);
    }
}
