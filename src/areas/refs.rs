//! References: branches, HEAD, and version records
//!
//! - `HEAD` holds `ref: refs/heads/<branch>` while on a branch, or a bare
//!   version label when detached
//! - `refs/heads/<branch>` holds the branch's head version label
//! - `versions/<label>` holds the serialized version record
//!
//! Every write goes to a temporary file in the target directory and is
//! renamed into place, so a crash leaves either the old or the new state
//! visible.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::version::Version;
use crate::errors::EngineError;
use anyhow::Context;
use derive_new::new;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Branch created by the first commit of a fresh repository.
pub const DEFAULT_BRANCH: &str = "main";

/// Pattern for the symbolic form of HEAD.
const SYMREF_REGEX: &str = r"^ref: refs/heads/(.+)$";

/// Where HEAD currently points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// On a branch (which may not have a head label yet, before the first
    /// commit).
    Branch(String),
    /// Detached at a version label.
    Detached(String),
}

#[derive(Debug, new)]
pub struct Refs {
    /// Engine directory (`.lvc`).
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join("refs").join("heads")
    }

    pub fn versions_path(&self) -> PathBuf {
        self.path.join("versions")
    }

    pub fn read_head(&self) -> anyhow::Result<Head> {
        let content = std::fs::read_to_string(self.head_path())
            .context("unable to read HEAD")?;
        let content = content.trim();

        if let Some(captures) = regex::Regex::new(SYMREF_REGEX)?.captures(content) {
            return Ok(Head::Branch(captures[1].to_string()));
        }
        if content.is_empty() {
            anyhow::bail!("malformed HEAD: empty");
        }

        Ok(Head::Detached(content.to_string()))
    }

    pub fn set_head_branch(&self, name: &str) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &format!("ref: refs/heads/{}\n", name))
    }

    pub fn set_head_detached(&self, label: &str) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &format!("{}\n", label))
    }

    /// The current branch name, or None when HEAD is detached.
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        match self.read_head()? {
            Head::Branch(name) => Ok(Some(name)),
            Head::Detached(_) => Ok(None),
        }
    }

    /// The version label HEAD resolves to, or None before the first commit.
    pub fn head_label(&self) -> anyhow::Result<Option<String>> {
        match self.read_head()? {
            Head::Branch(name) => self.read_branch(&name),
            Head::Detached(label) => Ok(Some(label)),
        }
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.heads_path().join(name).is_file()
    }

    pub fn read_branch(&self, name: &str) -> anyhow::Result<Option<String>> {
        let branch_path = self.heads_path().join(name);
        if !branch_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("unable to read branch file {}", branch_path.display()))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content.to_string()))
        }
    }

    /// Move a branch head to a new label, creating the branch if needed.
    pub fn advance_branch(&self, name: &str, label: &str) -> anyhow::Result<()> {
        self.write_ref_file(&self.heads_path().join(name), &format!("{}\n", label))
    }

    pub fn create_branch(&self, name: &str, label: &str) -> anyhow::Result<()> {
        validate_branch_name(name)?;

        if self.branch_exists(name) {
            return Err(EngineError::DuplicateBranch(name.to_string()).into());
        }

        self.advance_branch(name, label)
    }

    pub fn delete_branch(&self, name: &str) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name);

        if !branch_path.is_file() {
            return Err(EngineError::BranchNotFound(name.to_string()).into());
        }

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("unable to delete branch file {}", branch_path.display()))?;
        self.prune_empty_parent_dirs(&branch_path)?;

        Ok(())
    }

    /// All branch names, sorted. Nested names (`feature/x`) come back with
    /// `/` separators.
    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        let heads = self.heads_path();
        let mut branches = WalkDir::new(&heads)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&heads).ok()?;
                Some(
                    relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/"),
                )
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    pub fn version_exists(&self, label: &str) -> bool {
        self.versions_path().join(label).is_file()
    }

    /// Persist a new version record. Versions are immutable: writing a
    /// label that already exists is refused.
    pub fn write_version(&self, version: &Version) -> anyhow::Result<()> {
        if self.version_exists(&version.label) {
            return Err(EngineError::DuplicateVersion(version.label.clone()).into());
        }

        let packed = version.pack()?;
        self.write_ref_file(
            &self.versions_path().join(&version.label),
            std::str::from_utf8(&packed).context("version record is not valid utf-8")?,
        )
    }

    pub fn read_version(&self, label: &str) -> anyhow::Result<Version> {
        let version_path = self.versions_path().join(label);

        let data = match std::fs::read(&version_path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::VersionNotFound(label.to_string()).into());
            }
            Err(err) => {
                return Err(err).context(format!(
                    "unable to read version file {}",
                    version_path.display()
                ));
            }
        };

        Version::unpack(data.into())
            .with_context(|| format!("malformed version record for '{}'", label))
    }

    pub fn list_versions(&self) -> anyhow::Result<Vec<Version>> {
        let versions_path = self.versions_path();
        if !versions_path.exists() {
            return Ok(Vec::new());
        }

        std::fs::read_dir(&versions_path)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| self.read_version(&entry.file_name().to_string_lossy()))
            .collect()
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("ref file {} has no parent directory", path.display()))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("unable to create directory {}", parent.display()))?;

        let temp_path = parent.join(format!("tmp-ref-{}", std::process::id()));
        std::fs::write(&temp_path, content)
            .with_context(|| format!("unable to write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("unable to replace ref file {}", path.display()))?;

        Ok(())
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_path()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("unable to remove empty directory {}", parent.display()))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}

/// Validate a user-supplied branch name. Names become ref file paths, so
/// relative components and characters that break the symref syntax are
/// refused; `/` is allowed for hierarchical names.
pub fn validate_branch_name(name: &str) -> anyhow::Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name.ends_with('/')
        || name.starts_with('.')
        || name.contains("..")
        || name.contains("/.")
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '\\' || c == ':');

    if invalid {
        anyhow::bail!("invalid branch name: '{}'", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::digest::Digest;
    use chrono::{Timelike, Utc};
    use pretty_assertions::assert_eq;
    use proptest::proptest;

    fn temp_refs() -> (assert_fs::TempDir, Refs) {
        let dir = assert_fs::TempDir::new().unwrap();
        let refs = Refs::new(dir.path().join(".lvc").into_boxed_path());
        std::fs::create_dir_all(refs.heads_path()).unwrap();
        std::fs::create_dir_all(refs.versions_path()).unwrap();
        refs.set_head_branch(DEFAULT_BRANCH).unwrap();
        (dir, refs)
    }

    fn version(label: &str, branch: &str) -> Version {
        Version::new(
            label.to_string(),
            None,
            Digest::of(label.as_bytes()),
            branch.to_string(),
            Utc::now().with_nanosecond(0).unwrap(),
            format!("message for {}", label),
        )
    }

    #[test]
    fn head_starts_on_the_default_branch_with_no_label() {
        let (_dir, refs) = temp_refs();

        assert_eq!(
            refs.read_head().unwrap(),
            Head::Branch(DEFAULT_BRANCH.to_string())
        );
        assert_eq!(refs.head_label().unwrap(), None);
    }

    #[test]
    fn advancing_a_branch_resolves_through_head() {
        let (_dir, refs) = temp_refs();

        refs.advance_branch(DEFAULT_BRANCH, "v1").unwrap();

        assert_eq!(refs.head_label().unwrap(), Some("v1".to_string()));
    }

    #[test]
    fn detached_head_resolves_to_its_label() {
        let (_dir, refs) = temp_refs();

        refs.set_head_detached("v7").unwrap();

        assert_eq!(refs.read_head().unwrap(), Head::Detached("v7".to_string()));
        assert_eq!(refs.current_branch().unwrap(), None);
        assert_eq!(refs.head_label().unwrap(), Some("v7".to_string()));
    }

    #[test]
    fn duplicate_branch_creation_is_refused() {
        let (_dir, refs) = temp_refs();

        refs.create_branch("feature", "v1").unwrap();
        let err = refs.create_branch("feature", "v2").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::DuplicateBranch(_))
        ));
    }

    #[test]
    fn deleting_a_missing_branch_is_refused() {
        let (_dir, refs) = temp_refs();

        let err = refs.delete_branch("ghost").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::BranchNotFound(_))
        ));
    }

    #[test]
    fn nested_branches_list_and_prune() {
        let (_dir, refs) = temp_refs();

        refs.create_branch("feature/one", "v1").unwrap();
        refs.create_branch("hotfix", "v1").unwrap();
        assert_eq!(
            refs.list_branches().unwrap(),
            vec!["feature/one".to_string(), "hotfix".to_string()]
        );

        refs.delete_branch("feature/one").unwrap();
        assert!(!refs.heads_path().join("feature").exists());
    }

    #[test]
    fn version_records_round_trip_and_refuse_duplicates() {
        let (_dir, refs) = temp_refs();
        let v1 = version("v1", "main");

        refs.write_version(&v1).unwrap();
        assert_eq!(refs.read_version("v1").unwrap(), v1);

        let err = refs.write_version(&v1).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::DuplicateVersion(_))
        ));
    }

    #[test]
    fn reading_a_missing_version_is_not_found() {
        let (_dir, refs) = temp_refs();

        let err = refs.read_version("ghost").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::VersionNotFound(_))
        ));
    }

    proptest! {
        #[test]
        fn simple_branch_names_are_valid(name in "[a-zA-Z0-9_-]+") {
            proptest::prop_assert!(validate_branch_name(&name).is_ok());
        }

        #[test]
        fn hierarchical_branch_names_are_valid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
        ) {
            let name = format!("{}/{}", prefix, suffix);
            proptest::prop_assert!(validate_branch_name(&name).is_ok());
        }

        #[test]
        fn names_with_whitespace_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
        ) {
            let name = format!("{} {}", prefix, suffix);
            proptest::prop_assert!(validate_branch_name(&name).is_err());
        }
    }

    #[test]
    fn pathological_branch_names_are_invalid() {
        for name in ["", "/lead", "trail/", ".hidden", "a..b", "a/.b", "a:b", "a\\b"] {
            assert!(validate_branch_name(name).is_err(), "{}", name);
        }
    }
}
