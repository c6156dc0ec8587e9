use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::status::inspector::Inspector;
use crate::artifacts::status::report::{IndexChange, WorkspaceChange};
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<()> {
        self.require_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head_version = self.head_version()?;
        let head_tree = self.head_tree()?;
        let report = Inspector::new(self.workspace()).report(&index, &head_tree)?;

        match self.refs().read_head()? {
            Head::Branch(name) => writeln!(self.writer(), "On branch {}", name)?,
            Head::Detached(label) => writeln!(self.writer(), "HEAD detached at {}", label)?,
        }
        match &head_version {
            Some(version) => writeln!(self.writer(), "Current version: {}", version.label)?,
            None => writeln!(self.writer(), "No versions yet")?,
        }

        if !report.staged.is_empty() {
            writeln!(self.writer(), "\nChanges to be committed:")?;
            for (path, change) in &report.staged {
                let tag = match change {
                    IndexChange::Added => "new file:",
                    IndexChange::Modified => "modified:",
                };
                writeln!(
                    self.writer(),
                    "  {}",
                    format!("{}   {}", tag, path.display()).green()
                )?;
            }
        }

        if !report.modified.is_empty() {
            writeln!(self.writer(), "\nChanges not staged for commit:")?;
            for (path, change) in &report.modified {
                let tag = match change {
                    WorkspaceChange::Modified => "modified:",
                    WorkspaceChange::Deleted => "deleted: ",
                };
                writeln!(
                    self.writer(),
                    "  {}",
                    format!("{}   {}", tag, path.display()).red()
                )?;
            }
            writeln!(self.writer(), "  (use \"lvc add <file>...\" to stage)")?;
        }

        if !report.untracked.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            for path in &report.untracked {
                writeln!(self.writer(), "  {}", path.display().to_string().red())?;
            }
            writeln!(
                self.writer(),
                "  (use \"lvc add <file>...\" to include in a version)"
            )?;
        }

        if report.is_clean() {
            writeln!(self.writer(), "\nnothing to commit, working tree clean")?;
        }

        Ok(())
    }
}
