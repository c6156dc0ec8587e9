use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::errors::EngineError;
use std::io::Write;

const DETACHMENT_NOTICE: &str = r#"
You are in 'detached HEAD' state. You can look around and create
experimental versions without impacting any branch. Versions created in
this state are reachable by their labels only.

If you want to keep working on a branch, create one from here:

    lvc branch <new-branch-name>
"#;

impl Repository {
    /// Materialize the target snapshot onto the working tree and move HEAD.
    /// The target resolves as a branch name first, then as a version label
    /// (which detaches HEAD). Staged changes the checkout would rewrite
    /// abort the operation unless `force` is given.
    pub async fn checkout(&mut self, target: &str, force: bool) -> anyhow::Result<()> {
        self.require_initialized()?;

        let (version, branch) = self.resolve_target(target)?;

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

        if !force {
            let conflicts = migration.staged_conflicts(&index);
            if !conflicts.is_empty() {
                let paths = conflicts
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(EngineError::DirtyWorkingTree(paths).into());
            }
        }

        migration.apply()?;

        let previous_head = self.refs().read_head()?;
        match &branch {
            Some(name) => {
                self.refs().set_head_branch(name)?;
                if previous_head == Head::Branch(name.clone()) {
                    writeln!(self.writer(), "Already on '{}'", name)?;
                } else {
                    writeln!(self.writer(), "Switched to branch '{}'", name)?;
                }
            }
            None => {
                self.refs().set_head_detached(&version.label)?;
                if !matches!(previous_head, Head::Detached(_)) {
                    eprintln!("Note: checking out '{}'.\n{}", target, DETACHMENT_NOTICE);
                }
                writeln!(
                    self.writer(),
                    "HEAD is now at {} {}",
                    version.label,
                    version.short_message()
                )?;
            }
        }

        Ok(())
    }
}
