use crate::areas::index::IndexEntry;
use crate::areas::repository::Repository;
use chrono::Utc;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Stage files: store their content (delta-encoded against the digest
    /// last recorded for the same path when profitable) and record
    /// path-to-digest entries in the index.
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.require_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head_tree = self.head_tree()?;

        let mut files = Vec::new();
        for path in paths {
            if path == "." {
                files.extend(self.workspace().list_files(None)?);
            } else {
                let relative = Path::new(path);
                if !self.path().join(relative).exists() {
                    anyhow::bail!("pathspec '{}' did not match any files", path);
                }
                files.extend(self.workspace().list_files(Some(relative))?);
            }
        }
        files.sort();
        files.dedup();

        let staged = files.len();
        for path in files {
            let blob = self.workspace().parse_blob(&path)?;

            // the delta base is the digest most recently recorded for this
            // path: the staged one if any, otherwise the committed one
            let base = index
                .entry_by_path(&path)
                .map(|entry| entry.digest.clone())
                .or_else(|| head_tree.get(&path).map(|entry| entry.digest.clone()));

            let digest = self.database().put_delta(blob.content(), base.as_ref())?;
            index.add(IndexEntry::new(path, digest, Utc::now()));
        }

        index.write_updates()?;

        writeln!(self.writer(), "staged {} file(s)", staged)?;

        Ok(())
    }
}
