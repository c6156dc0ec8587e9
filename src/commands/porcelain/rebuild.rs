use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::errors::EngineError;
use std::io::Write;

impl Repository {
    /// Materialize a version's tree onto the working tree: write only the
    /// paths whose on-disk content differs, delete tracked paths absent
    /// from the target. Running it twice in a row touches nothing the
    /// second time.
    pub async fn rebuild(&mut self, label: &str) -> anyhow::Result<()> {
        self.require_initialized()?;

        let version = self.refs().read_version(label)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let current_tree = self.head_tree()?;
        let target_tree = self.tree_of(&version)?;
        let migration = Migration::plan(
            self.database(),
            self.workspace(),
            &current_tree,
            &target_tree,
        )?;

        let conflicts = migration.staged_conflicts(&index);
        if !conflicts.is_empty() {
            let paths = conflicts
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(EngineError::DirtyWorkingTree(paths).into());
        }

        let (written, deleted) = migration.apply()?;

        // stay on the current branch when it already points here,
        // otherwise detach at the restored version
        let on_branch_head = match self.refs().current_branch()? {
            Some(name) => self.refs().read_branch(&name)?.as_deref() == Some(label),
            None => false,
        };
        if !on_branch_head {
            self.refs().set_head_detached(label)?;
        }

        writeln!(
            self.writer(),
            "Restored version '{}': {} file(s) written, {} deleted",
            label, written, deleted
        )?;

        Ok(())
    }
}
