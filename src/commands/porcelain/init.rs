use crate::areas::refs::DEFAULT_BRANCH;
use crate::areas::repository::Repository;
use crate::errors::EngineError;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(
                EngineError::RepositoryAlreadyInitialized(self.path().to_path_buf()).into(),
            );
        }

        fs::create_dir_all(self.database().objects_path())
            .context("failed to create objects directory")?;
        fs::create_dir_all(self.refs().heads_path())
            .context("failed to create refs/heads directory")?;
        fs::create_dir_all(self.refs().versions_path())
            .context("failed to create versions directory")?;

        self.refs()
            .set_head_branch(DEFAULT_BRANCH)
            .context("failed to create initial HEAD reference")?;

        let index = self.index();
        let index = index.lock().await;
        if !index.path().exists() {
            fs::write(index.path(), b"").context("failed to create index file")?;
        }
        if !self.stash().path().exists() {
            fs::write(self.stash().path(), b"").context("failed to create stash file")?;
        }

        writeln!(
            self.writer(),
            "Initialized empty lvc repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
