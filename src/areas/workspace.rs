//! Working directory operations
//!
//! All paths handed in and out are relative to the repository root. The
//! engine directory is invisible to every listing.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::digest::Digest;
use crate::ENGINE_DIR;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [ENGINE_DIR, ".", ".."];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List all tracked-candidate files under `prefix` (the whole tree when
    /// None), relative to the repository root, sorted.
    pub fn list_files(&self, prefix: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root = match prefix {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !root.exists() {
            anyhow::bail!("the specified path does not exist: {:?}", root);
        }

        if root.is_file() {
            return Ok(vec![self.relativize(&root)?]);
        }

        let mut files = WalkDir::new(&root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| self.relativize(entry.path()))
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .filter(|path| !Self::is_ignored(path))
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    pub fn file_exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let absolute = self.path.join(file_path);
        let content = std::fs::read(&absolute)
            .with_context(|| format!("unable to read file {}", absolute.display()))?;

        Ok(content.into())
    }

    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Digest of the on-disk content, or None when the path is absent.
    /// Used to skip needless writes during materialization.
    pub fn digest_of(&self, file_path: &Path) -> anyhow::Result<Option<Digest>> {
        if !self.file_exists(file_path) {
            return Ok(None);
        }

        Ok(Some(Digest::of(&self.read_file(file_path)?)))
    }

    pub fn write_file(&self, file_path: &Path, content: &[u8]) -> anyhow::Result<()> {
        let absolute = self.path.join(file_path);

        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("unable to create directory {}", parent.display()))?;
        }

        std::fs::write(&absolute, content)
            .with_context(|| format!("unable to write file {}", absolute.display()))
    }

    /// Remove a file and any directories the removal leaves empty.
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let absolute = self.path.join(file_path);

        if absolute.is_file() {
            std::fs::remove_file(&absolute)
                .with_context(|| format!("unable to remove file {}", absolute.display()))?;
            self.prune_empty_parent_dirs(&absolute)?;
        }

        Ok(())
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.read_dir().map(|mut d| d.next().is_none()).unwrap_or(false)
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("unable to remove empty directory {}", parent.display()))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn relativize(&self, path: &Path) -> anyhow::Result<PathBuf> {
        path.strip_prefix(self.path.as_ref())
            .map(Path::to_path_buf)
            .with_context(|| format!("path {} is outside the repository", path.display()))
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                IGNORED_PATHS.contains(&name.to_string_lossy().as_ref())
            } else {
                false
            }
        })
    }
}
