use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub fn show(&mut self, label: &str) -> anyhow::Result<()> {
        self.require_initialized()?;

        let version = self.refs().read_version(label)?;
        let tree = self.tree_of(&version)?;

        writeln!(
            self.writer(),
            "{}",
            format!("version {}", version.label).yellow()
        )?;
        if let Some(parent) = &version.parent_label {
            writeln!(self.writer(), "Parent: {}", parent)?;
        }
        if !version.branch.is_empty() {
            writeln!(self.writer(), "Branch: {}", version.branch)?;
        }
        writeln!(self.writer(), "Tree:   {}", version.tree_digest.to_short())?;
        writeln!(
            self.writer(),
            "Date:   {}",
            version.timestamp.format("%Y-%m-%d %H:%M:%S %Z")
        )?;
        if !version.message.is_empty() {
            writeln!(self.writer())?;
            for line in version.message.lines() {
                writeln!(self.writer(), "    {}", line)?;
            }
        }

        writeln!(self.writer(), "\nFiles: {}", tree.len())?;
        for (path, _) in tree.entries() {
            writeln!(self.writer(), "  {}", path.display())?;
        }

        Ok(())
    }
}
