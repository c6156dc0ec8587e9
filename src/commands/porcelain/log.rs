use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Walk parent pointers from HEAD, newest first, printing at most
    /// `count` versions.
    pub fn log(&mut self, count: usize) -> anyhow::Result<()> {
        self.require_initialized()?;

        let Some(head_label) = self.refs().head_label()? else {
            writeln!(self.writer(), "No versions yet")?;
            return Ok(());
        };

        let current_branch = self.refs().current_branch()?;
        let versions = self.history(&head_label, Some(count))?;

        for (position, version) in versions.iter().enumerate() {
            let decoration = if position == 0 {
                match &current_branch {
                    Some(branch) => format!(" (HEAD -> {})", branch).green().to_string(),
                    None => " (HEAD)".green().to_string(),
                }
            } else {
                String::new()
            };

            writeln!(
                self.writer(),
                "{}{}",
                format!("version {}", version.label).yellow(),
                decoration
            )?;
            if !version.branch.is_empty() {
                writeln!(self.writer(), "Branch: {}", version.branch)?;
            }
            writeln!(
                self.writer(),
                "Date:   {}",
                version.timestamp.format("%Y-%m-%d %H:%M:%S %Z")
            )?;
            writeln!(self.writer())?;
            for line in version.message.lines() {
                writeln!(self.writer(), "    {}", line)?;
            }
            writeln!(self.writer())?;
        }

        Ok(())
    }
}
