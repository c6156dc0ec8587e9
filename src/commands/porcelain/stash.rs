use crate::areas::repository::Repository;
use crate::areas::stash::StashEntry;
use crate::errors::EngineError;
use chrono::Utc;
use std::io::Write;

impl Repository {
    /// Shelve the staging area: capture every index entry into a new stash
    /// entry and clear the index.
    pub async fn stash_push(&mut self, message: Option<&str>) -> anyhow::Result<()> {
        self.require_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if index.is_empty() {
            return Err(EngineError::NothingToStash.into());
        }
        let count = index.len();

        self.stash().push(StashEntry::new(
            message.unwrap_or("staged changes").to_string(),
            Utc::now(),
            index.snapshot(),
        ))?;

        index.clear();
        index.write_updates()?;

        writeln!(self.writer(), "Saved {} staged file(s) to the stash", count)?;

        Ok(())
    }

    /// Restore the most recent stash entry into the staging area and drop
    /// it from the stack. Entries overwrite whatever is currently staged
    /// for the same paths; there is no merge.
    pub async fn stash_pop(&mut self) -> anyhow::Result<()> {
        self.require_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let entry = self.stash().pop()?;
        let count = entry.entries.len();
        for index_entry in entry.entries {
            index.add(index_entry);
        }
        index.write_updates()?;

        writeln!(
            self.writer(),
            "Restored {} staged file(s) from the stash",
            count
        )?;

        Ok(())
    }

    pub fn stash_list(&mut self) -> anyhow::Result<()> {
        self.require_initialized()?;

        let stack = self.stash().load()?;
        if stack.is_empty() {
            writeln!(self.writer(), "No stash entries")?;
            return Ok(());
        }

        for (position, entry) in stack.iter().rev().enumerate() {
            writeln!(
                self.writer(),
                "stash@{{{}}}: {} ({} file(s), {})",
                position,
                entry.message,
                entry.entries.len(),
                entry.stashed_at.format("%Y-%m-%d %H:%M:%S")
            )?;
        }

        Ok(())
    }
}
