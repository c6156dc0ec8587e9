use crate::areas::repository::Repository;
use crate::errors::EngineError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// With no arguments, list branches. With a name, create a branch at
    /// the current HEAD version. With `delete`, remove that branch.
    pub fn branch(&mut self, name: Option<&str>, delete: Option<&str>) -> anyhow::Result<()> {
        self.require_initialized()?;

        if let Some(name) = delete {
            if self.refs().current_branch()?.as_deref() == Some(name) {
                return Err(EngineError::CannotDeleteCurrentBranch(name.to_string()).into());
            }
            self.refs().delete_branch(name)?;
            writeln!(self.writer(), "Deleted branch {}", name)?;
            return Ok(());
        }

        if let Some(name) = name {
            let head_label = self
                .refs()
                .head_label()?
                .ok_or_else(|| anyhow::anyhow!("cannot create a branch before the first commit"))?;
            self.refs().create_branch(name, &head_label)?;
            writeln!(self.writer(), "Created branch {} at {}", name, head_label)?;
            return Ok(());
        }

        let branches = self.refs().list_branches()?;
        if branches.is_empty() {
            writeln!(self.writer(), "No branches yet")?;
            return Ok(());
        }

        let current = self.refs().current_branch()?;
        for branch in branches {
            if current.as_deref() == Some(branch.as_str()) {
                writeln!(self.writer(), "{}", format!("* {}", branch).green())?;
            } else {
                writeln!(self.writer(), "  {}", branch)?;
            }
        }

        Ok(())
    }
}
