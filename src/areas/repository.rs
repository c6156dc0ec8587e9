//! Repository handle
//!
//! Ties the components together and carries the state every operation
//! needs. Nothing here is process-global: commands receive the handle, so
//! the engine stays testable in isolation and embeddable in a host.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::stash::Stash;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::objects::version::Version;
use crate::errors::EngineError;
use crate::ENGINE_DIR;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    stash: Stash,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path)
            .canonicalize()
            .with_context(|| format!("invalid repository path: {}", path))?;
        let engine_path = path.join(ENGINE_DIR);

        let index = Index::new(engine_path.join("index").into_boxed_path());
        let database = Database::new(engine_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(engine_path.clone().into_boxed_path());
        let stash = Stash::new(engine_path.join("stash").into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
            stash,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn engine_path(&self) -> PathBuf {
        self.path.join(ENGINE_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    pub fn is_initialized(&self) -> bool {
        self.engine_path().is_dir()
    }

    pub fn require_initialized(&self) -> anyhow::Result<()> {
        if !self.is_initialized() {
            return Err(EngineError::RepositoryNotInitialized(self.path.to_path_buf()).into());
        }
        Ok(())
    }

    /// The version HEAD resolves to, or None before the first commit.
    pub fn head_version(&self) -> anyhow::Result<Option<Version>> {
        match self.refs.head_label()? {
            Some(label) => Ok(Some(self.refs.read_version(&label)?)),
            None => Ok(None),
        }
    }

    /// Load the tree snapshot a version points at.
    pub fn tree_of(&self, version: &Version) -> anyhow::Result<Tree> {
        let data = self.database.get(&version.tree_digest)?;
        Tree::unpack(data).with_context(|| {
            format!("malformed tree {} of version '{}'", version.tree_digest, version.label)
        })
    }

    /// The current version's tree, empty before the first commit.
    pub fn head_tree(&self) -> anyhow::Result<Tree> {
        match self.head_version()? {
            Some(version) => self.tree_of(&version),
            None => Ok(Tree::empty()),
        }
    }

    /// Walk parent pointers starting at `label`, newest first, yielding at
    /// most `limit` versions when one is given.
    pub fn history(&self, label: &str, limit: Option<usize>) -> anyhow::Result<Vec<Version>> {
        let mut versions = Vec::new();
        let mut current = Some(label.to_string());

        while let Some(label) = current {
            if limit.is_some_and(|limit| versions.len() >= limit) {
                break;
            }
            let version = self.refs.read_version(&label)?;
            current = version.parent_label.clone();
            versions.push(version);
        }

        Ok(versions)
    }

    /// Resolve a checkout target as a branch name first, then as a version
    /// label. Returns the version and the branch name when the target was
    /// one.
    pub fn resolve_target(&self, target: &str) -> anyhow::Result<(Version, Option<String>)> {
        if let Some(label) = self.refs.read_branch(target)? {
            let version = self.refs.read_version(&label)?;
            return Ok((version, Some(target.to_string())));
        }

        if self.refs.version_exists(target) {
            return Ok((self.refs.read_version(target)?, None));
        }

        Err(EngineError::TargetNotFound(target.to_string()).into())
    }
}
