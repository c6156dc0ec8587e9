use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::status::report::{IndexChange, StatusReport, WorkspaceChange};
use derive_new::new;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Computes the status report by comparing the working tree against the
/// index and, for paths the index does not cover, against the current
/// version's tree.
#[derive(Debug, new)]
pub struct Inspector<'r> {
    workspace: &'r Workspace,
}

impl<'r> Inspector<'r> {
    pub fn report(&self, index: &Index, head_tree: &Tree) -> anyhow::Result<StatusReport> {
        let mut report = StatusReport::default();

        for entry in index.entries() {
            let change = match head_tree.get(&entry.path) {
                None => IndexChange::Added,
                Some(_) => IndexChange::Modified,
            };
            report.staged.insert(entry.path.clone(), change);
        }

        let on_disk = self
            .workspace
            .list_files(None)?
            .into_iter()
            .collect::<BTreeSet<PathBuf>>();

        for path in &on_disk {
            let recorded_digest = index
                .entry_by_path(path)
                .map(|entry| entry.digest.clone())
                .or_else(|| head_tree.get(path).map(|entry| entry.digest.clone()));

            match recorded_digest {
                Some(digest) => {
                    if Digest::of(&self.workspace.read_file(path)?) != digest {
                        report
                            .modified
                            .insert(path.clone(), WorkspaceChange::Modified);
                    }
                }
                None => {
                    report.untracked.insert(path.clone());
                }
            }
        }

        // tracked paths missing from the working tree
        let tracked = index
            .entries()
            .map(|entry| entry.path.clone())
            .chain(head_tree.entries().map(|(path, _)| path))
            .collect::<BTreeSet<PathBuf>>();
        for path in tracked {
            if !on_disk.contains(&path) {
                report.modified.insert(path, WorkspaceChange::Deleted);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::index::IndexEntry;
    use chrono::Utc;
    use std::path::Path;

    fn setup() -> (assert_fs::TempDir, Workspace, Index) {
        let dir = assert_fs::TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());
        let index = Index::new(dir.path().join(".lvc").join("index").into_boxed_path());
        (dir, workspace, index)
    }

    fn stage(index: &mut Index, path: &str, content: &[u8]) {
        index.add(IndexEntry::new(
            PathBuf::from(path),
            Digest::of(content),
            Utc::now(),
        ));
    }

    #[test]
    fn fresh_file_is_untracked_until_staged() {
        let (_dir, workspace, mut index) = setup();
        workspace.write_file(Path::new("new.txt"), b"hi").unwrap();

        let report = Inspector::new(&workspace)
            .report(&index, &Tree::empty())
            .unwrap();
        assert!(report.untracked.contains(Path::new("new.txt")));
        assert!(report.staged.is_empty());

        stage(&mut index, "new.txt", b"hi");
        let report = Inspector::new(&workspace)
            .report(&index, &Tree::empty())
            .unwrap();
        assert_eq!(
            report.staged.get(Path::new("new.txt")),
            Some(&IndexChange::Added)
        );
        assert!(report.untracked.is_empty());
    }

    #[test]
    fn edited_staged_file_shows_as_modified_against_the_index() {
        let (_dir, workspace, mut index) = setup();
        workspace.write_file(Path::new("f.txt"), b"staged").unwrap();
        stage(&mut index, "f.txt", b"staged");
        workspace.write_file(Path::new("f.txt"), b"edited").unwrap();

        let report = Inspector::new(&workspace)
            .report(&index, &Tree::empty())
            .unwrap();
        assert_eq!(
            report.modified.get(Path::new("f.txt")),
            Some(&WorkspaceChange::Modified)
        );
    }

    #[test]
    fn unstaged_edit_is_compared_against_the_current_tree() {
        let (_dir, workspace, index) = setup();
        workspace.write_file(Path::new("f.txt"), b"edited").unwrap();
        let head_tree =
            Tree::empty().updated_with([(PathBuf::from("f.txt"), Digest::of(b"committed"))]);

        let report = Inspector::new(&workspace).report(&index, &head_tree).unwrap();
        assert_eq!(
            report.modified.get(Path::new("f.txt")),
            Some(&WorkspaceChange::Modified)
        );
        assert!(report.untracked.is_empty());
    }

    #[test]
    fn missing_tracked_file_is_reported_deleted() {
        let (_dir, workspace, index) = setup();
        let head_tree =
            Tree::empty().updated_with([(PathBuf::from("gone.txt"), Digest::of(b"x"))]);

        let report = Inspector::new(&workspace).report(&index, &head_tree).unwrap();
        assert_eq!(
            report.modified.get(Path::new("gone.txt")),
            Some(&WorkspaceChange::Deleted)
        );
    }

    #[test]
    fn clean_tree_reports_clean() {
        let (_dir, workspace, index) = setup();
        workspace.write_file(Path::new("f.txt"), b"same").unwrap();
        let head_tree =
            Tree::empty().updated_with([(PathBuf::from("f.txt"), Digest::of(b"same"))]);

        let report = Inspector::new(&workspace).report(&index, &head_tree).unwrap();
        assert!(report.is_clean());
    }
}
