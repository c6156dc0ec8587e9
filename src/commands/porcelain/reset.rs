use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// Clear the index only.
    Soft,
    /// Clear the index, leave working-tree edits alone.
    #[default]
    Mixed,
    /// Clear the index and overwrite the working tree from the current
    /// version's tree. This is the one operation that silently discards
    /// uncommitted edits.
    Hard,
}

impl Repository {
    pub async fn reset(&mut self, mode: ResetMode) -> anyhow::Result<()> {
        self.require_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        index.clear();
        index.write_updates()?;

        if mode == ResetMode::Hard {
            let head_tree = self.head_tree()?;
            let migration = Migration::plan(
                self.database(),
                self.workspace(),
                &head_tree,
                &head_tree,
            )?;
            let (written, _) = migration.apply()?;

            writeln!(
                self.writer(),
                "Staging area cleared, {} file(s) restored from the current version",
                written
            )?;
        } else {
            writeln!(self.writer(), "Staging area cleared")?;
        }

        Ok(())
    }
}
