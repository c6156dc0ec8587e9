use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::objects::version::{validate_label, Version};
use crate::errors::EngineError;
use chrono::Utc;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Freeze the staging area into a tree snapshot and append a version
    /// node to the graph. The new tree is the parent's tree updated with
    /// the staged entries, so every tracked path stays reproducible.
    pub async fn commit(&mut self, label: &str, message: &str) -> anyhow::Result<()> {
        self.require_initialized()?;
        validate_label(label)?;

        if self.refs().version_exists(label) {
            return Err(EngineError::DuplicateVersion(label.to_string()).into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if index.is_empty() {
            return Err(EngineError::EmptyCommit.into());
        }
        let staged = index.len();

        let parent = self.head_version()?;
        let parent_tree = match &parent {
            Some(parent) => self.tree_of(parent)?,
            None => Tree::empty(),
        };

        let tree = parent_tree.updated_with(
            index
                .snapshot()
                .into_iter()
                .map(|entry| (entry.path, entry.digest)),
        );
        let tree_digest = self.database().put(&tree.pack()?)?;

        if let Some(parent) = &parent
            && parent.tree_digest == tree_digest
        {
            return Err(EngineError::EmptyCommit.into());
        }

        let branch = self.refs().current_branch()?;
        let version = Version::new(
            label.to_string(),
            parent.map(|parent| parent.label),
            tree_digest,
            branch.clone().unwrap_or_default(),
            Utc::now(),
            message.trim().to_string(),
        );

        self.refs().write_version(&version)?;
        match &branch {
            Some(name) => self.refs().advance_branch(name, label)?,
            None => self.refs().set_head_detached(label)?,
        }

        index.clear();
        index.write_updates()?;

        let head_name = branch.unwrap_or_else(|| "detached HEAD".to_string());
        writeln!(
            self.writer(),
            "{} {}",
            format!("[{} {}]", head_name, label).green(),
            version.short_message()
        )?;
        writeln!(self.writer(), " {} file(s) committed", staged)?;

        Ok(())
    }
}
