//! Stash: a LIFO shelf of index snapshots
//!
//! Each entry captures the staging area at stash time together with a
//! message and timestamp. The whole stack lives in one file, one block per
//! entry: a `stash\t<time>\t<message>` header line followed by the entry's
//! index lines. The file is rewritten through a temporary file and an
//! atomic rename.

use crate::areas::index::IndexEntry;
use crate::errors::EngineError;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use derive_new::new;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StashEntry {
    pub message: String,
    pub stashed_at: DateTime<Utc>,
    pub entries: Vec<IndexEntry>,
}

#[derive(Debug, new)]
pub struct Stash {
    path: Box<Path>,
}

impl Stash {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole stack, oldest entry first. A missing or empty stash file
    /// is an empty stack.
    pub fn load(&self) -> anyhow::Result<Vec<StashEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).context("unable to read stash file")?;
        let mut stack: Vec<StashEntry> = Vec::new();

        for line in content.lines() {
            if let Some(header) = line.strip_prefix("stash\t") {
                let (stashed_at, message) = header
                    .split_once('\t')
                    .with_context(|| format!("malformed stash header: {}", line))?;
                stack.push(StashEntry::new(
                    message.to_string(),
                    DateTime::parse_from_rfc3339(stashed_at)
                        .context("invalid stash timestamp")?
                        .with_timezone(&Utc),
                    Vec::new(),
                ));
            } else if !line.is_empty() {
                stack
                    .last_mut()
                    .context("stash entry lines before any stash header")?
                    .entries
                    .push(IndexEntry::parse_line(line)?);
            }
        }

        Ok(stack)
    }

    pub fn push(&self, entry: StashEntry) -> anyhow::Result<()> {
        let mut stack = self.load()?;
        stack.push(entry);
        self.save(&stack)
    }

    /// Remove and return the most recent entry.
    pub fn pop(&self) -> anyhow::Result<StashEntry> {
        let mut stack = self.load()?;
        let top = stack.pop().ok_or(EngineError::StashEmpty)?;
        self.save(&stack)?;

        Ok(top)
    }

    fn save(&self, stack: &[StashEntry]) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .context("stash file has no parent directory")?;
        let temp_path = parent.join(format!("stash-{}.tmp", std::process::id()));

        let mut temp_file = std::fs::File::create(&temp_path)
            .with_context(|| format!("unable to create {}", temp_path.display()))?;
        for entry in stack {
            // header messages are single-line by construction
            writeln!(
                temp_file,
                "stash\t{}\t{}",
                entry.stashed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                entry.message.replace(['\n', '\r'], " "),
            )?;
            for index_entry in &entry.entries {
                temp_file.write_all(index_entry.serialize_line().as_bytes())?;
            }
            writeln!(temp_file)?;
        }
        temp_file.sync_all()?;

        std::fs::rename(&temp_path, &self.path).context("unable to replace stash file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::digest::Digest;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn temp_stash() -> (assert_fs::TempDir, Stash) {
        let dir = assert_fs::TempDir::new().unwrap();
        let stash = Stash::new(dir.path().join("stash").into_boxed_path());
        (dir, stash)
    }

    fn entry(message: &str, paths: &[&str]) -> StashEntry {
        StashEntry::new(
            message.to_string(),
            "2026-03-04T05:06:07Z".parse().unwrap(),
            paths
                .iter()
                .map(|path| {
                    IndexEntry::new(
                        PathBuf::from(path),
                        Digest::of(path.as_bytes()),
                        "2026-03-04T05:06:00Z".parse().unwrap(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn push_pop_is_lifo() {
        let (_dir, stash) = temp_stash();

        stash.push(entry("first", &["a.txt"])).unwrap();
        stash.push(entry("second", &["b.txt", "c.txt"])).unwrap();

        let top = stash.pop().unwrap();
        assert_eq!(top, entry("second", &["b.txt", "c.txt"]));
        assert_eq!(stash.pop().unwrap(), entry("first", &["a.txt"]));
    }

    #[test]
    fn pop_on_empty_stack_is_refused() {
        let (_dir, stash) = temp_stash();

        let err = stash.pop().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::StashEmpty)
        ));
    }

    #[test]
    fn load_does_not_mutate_the_stack() {
        let (_dir, stash) = temp_stash();
        stash.push(entry("kept", &["a.txt"])).unwrap();

        assert_eq!(stash.load().unwrap().len(), 1);
        assert_eq!(stash.load().unwrap().len(), 1);
    }

    #[test]
    fn multiline_messages_are_flattened() {
        let (_dir, stash) = temp_stash();
        stash.push(entry("line one\nline two", &["a.txt"])).unwrap();

        let top = stash.pop().unwrap();
        assert_eq!(top.message, "line one line two");
    }
}
