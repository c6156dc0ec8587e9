//! Tree snapshots
//!
//! A tree is an ordered mapping from repository-relative paths (using `/`
//! separators) to content digests, representing the full tracked state at
//! one point in history. The canonical serialized form is one line per
//! entry, `<kind> <digest>\t<path>`, in path order; the tree digest is the
//! digest of that form, so identical directory states always hash
//! identically.

use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::object::{Packable, Unpackable};
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
        }
    }

    fn try_parse(kind: &str) -> anyhow::Result<Self> {
        match kind {
            "file" => Ok(EntryKind::File),
            "dir" => Ok(EntryKind::Dir),
            other => anyhow::bail!("invalid tree entry kind: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub digest: Digest,
    pub kind: EntryKind,
}

/// Snapshot of tracked paths at one point in history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    pub fn empty() -> Self {
        Tree::default()
    }

    /// A copy of this tree with the given path/digest pairs layered on top.
    /// Existing entries for the same paths are replaced.
    pub fn updated_with<I>(&self, updates: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, Digest)>,
    {
        let mut entries = self.entries.clone();
        for (path, digest) in updates {
            entries.insert(
                normalize_path(&path),
                TreeEntry::new(digest, EntryKind::File),
            );
        }
        Tree { entries }
    }

    pub fn get(&self, path: &Path) -> Option<&TreeEntry> {
        self.entries.get(&normalize_path(path))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (PathBuf, &TreeEntry)> {
        self.entries
            .iter()
            .map(|(path, entry)| (PathBuf::from(path), entry))
    }
}

/// Render a path with `/` separators regardless of host platform.
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl Packable for Tree {
    fn pack(&self) -> anyhow::Result<Bytes> {
        let mut out = String::new();
        for (path, entry) in &self.entries {
            out.push_str(&format!(
                "{} {}\t{}\n",
                entry.kind.as_str(),
                entry.digest,
                path
            ));
        }
        Ok(Bytes::from(out))
    }
}

impl Unpackable for Tree {
    fn unpack(data: Bytes) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(&data).context("tree is not valid utf-8")?;
        let mut entries = BTreeMap::new();

        for line in text.lines().filter(|line| !line.is_empty()) {
            let (meta, path) = line
                .split_once('\t')
                .with_context(|| format!("malformed tree entry: {}", line))?;
            let (kind, digest) = meta
                .split_once(' ')
                .with_context(|| format!("malformed tree entry: {}", line))?;

            entries.insert(
                path.to_string(),
                TreeEntry::new(
                    Digest::try_parse(digest.to_string())?,
                    EntryKind::try_parse(kind)?,
                ),
            );
        }

        Ok(Tree { entries })
    }
}
