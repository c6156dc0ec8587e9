//! Staging area (index)
//!
//! The index maps working-tree paths to the content digests staged for the
//! next commit. It is persisted as one line per entry,
//! `<digest>\t<staged-at>\t<path>`, and every rewrite goes through a
//! temporary file followed by an atomic rename so a crash leaves either the
//! old or the new index visible, never a mix.
//!
//! ## Locking
//!
//! Reads take a shared advisory lock on the index file, rewrites an
//! exclusive one.

use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::tree::normalize_path;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use derive_new::new;
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// A staged path awaiting commit.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    pub path: PathBuf,
    pub digest: Digest,
    pub staged_at: DateTime<Utc>,
}

impl IndexEntry {
    pub(crate) fn serialize_line(&self) -> String {
        format!(
            "{}\t{}\t{}\n",
            self.digest,
            self.staged_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            normalize_path(&self.path)
        )
    }

    pub(crate) fn parse_line(line: &str) -> anyhow::Result<Self> {
        let mut fields = line.splitn(3, '\t');
        let digest = fields
            .next()
            .with_context(|| format!("malformed index entry: {}", line))?;
        let staged_at = fields
            .next()
            .with_context(|| format!("malformed index entry: {}", line))?;
        let path = fields
            .next()
            .with_context(|| format!("malformed index entry: {}", line))?;

        Ok(IndexEntry::new(
            PathBuf::from(path),
            Digest::try_parse(digest.to_string())?,
            DateTime::parse_from_rfc3339(staged_at)
                .context("invalid staged-at timestamp")?
                .with_timezone(&Utc),
        ))
    }
}

/// The staging area. Paths are unique; insertion order is irrelevant.
#[derive(Debug, Clone)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<Box<Path>, IndexEntry>,
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index from disk, replacing any in-memory state. A missing
    /// or empty index file yields an empty staging area.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(&self.path)?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let mut content = String::new();
        std::io::Read::read_to_string(lock.deref_mut(), &mut content)
            .context("unable to read index file")?;

        for line in content.lines().filter(|line| !line.is_empty()) {
            let entry = IndexEntry::parse_line(line)?;
            self.entries
                .insert(entry.path.clone().into_boxed_path(), entry);
        }

        Ok(())
    }

    /// Stage an entry, replacing any previous entry for the same path.
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries
            .insert(entry.path.clone().into_boxed_path(), entry);
        self.changed = true;
    }

    /// Drop every staged entry.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.changed = true;
        }
        self.entries.clear();
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Owned copy of all entries, path-ordered. Used by commit and stash to
    /// freeze the staging area.
    pub fn snapshot(&self) -> Vec<IndexEntry> {
        self.entries.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Persist the index: serialize to a temporary file in the same
    /// directory, then atomically rename it over the index file.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let index_dir = self
            .path
            .parent()
            .context("index file has no parent directory")?;
        let temp_path = index_dir.join(format!("index-{}.tmp", std::process::id()));

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        let _lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut temp_file = std::fs::File::create(&temp_path)
            .context(format!("unable to create {}", temp_path.display()))?;
        for entry in self.entries.values() {
            temp_file.write_all(entry.serialize_line().as_bytes())?;
        }
        temp_file.sync_all()?;

        std::fs::rename(&temp_path, &self.path)
            .context("unable to replace index file")?;
        self.changed = false;

        Ok(())
    }
}
