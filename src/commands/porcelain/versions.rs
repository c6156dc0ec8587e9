use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// List every version in the repository, newest first, marking the one
    /// HEAD resolves to.
    pub fn versions(&mut self) -> anyhow::Result<()> {
        self.require_initialized()?;

        let mut versions = self.refs().list_versions()?;
        if versions.is_empty() {
            writeln!(self.writer(), "No versions yet")?;
            writeln!(
                self.writer(),
                "  (use \"lvc add .\" then \"lvc commit -v <version> -m <message>\" to create one)"
            )?;
            return Ok(());
        }

        versions.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.label.cmp(&a.label))
        });

        let current = self.refs().head_label()?;

        writeln!(
            self.writer(),
            "{}\n",
            format!("Versions ({} total):", versions.len()).green()
        )?;

        for version in &versions {
            let is_current = current.as_deref() == Some(version.label.as_str());
            let marker = if is_current { "*" } else { " " };
            let mut line = format!(
                "{} {:<12}  {}  {}",
                marker,
                version.label,
                version.timestamp.format("%Y-%m-%d %H:%M:%S"),
                version.short_message()
            );
            if is_current {
                line.push_str(" (current)");
            }
            writeln!(
                self.writer(),
                "{}",
                if is_current { line.green().to_string() } else { line }
            )?;
        }

        Ok(())
    }
}
