use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::version::Version;
use colored::Colorize;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Attribute every line of a file (as of the current version) to the
    /// most recent version that introduced it. Walks the history newest to
    /// oldest; a line carried over unchanged from a parent keeps walking
    /// until the version that actually added it.
    pub fn blame(&mut self, file: &str) -> anyhow::Result<()> {
        self.require_initialized()?;

        let path = Path::new(file);
        let head_version = self
            .head_version()?
            .ok_or_else(|| anyhow::anyhow!("no versions yet"))?;
        let head_tree = self.tree_of(&head_version)?;
        let entry = head_tree
            .get(path)
            .ok_or_else(|| anyhow::anyhow!("file '{}' is not tracked by the current version", file))?;

        let current_lines = Blob::unpack(self.database().get(&entry.digest)?)?.lines();
        let history = self.history(&head_version.label, None)?;
        let attribution = self.attribute_lines(path, &current_lines, &history)?;

        let width = attribution
            .iter()
            .map(|label| label.len())
            .max()
            .unwrap_or(0);
        for (number, line) in current_lines.iter().enumerate() {
            writeln!(
                self.writer(),
                "{} {:>4}) {}",
                format!("{:>width$}", attribution[number], width = width).blue(),
                number + 1,
                line
            )?;
        }

        Ok(())
    }

    fn attribute_lines(
        &self,
        path: &Path,
        current_lines: &[String],
        history: &[Version],
    ) -> anyhow::Result<Vec<String>> {
        use crate::artifacts::diff::myers::{new_to_old_map, MyersDiff};

        let mut attribution: Vec<Option<String>> = vec![None; current_lines.len()];
        // position of each current line within the version being examined;
        // None once the line's origin has been pinned
        let mut positions: Vec<Option<usize>> = (0..current_lines.len()).map(Some).collect();

        let mut newer_lines = current_lines.to_vec();
        let mut newer_label = history[0].label.clone();

        for older in history.iter().skip(1) {
            let older_tree = self.tree_of(older)?;
            let Some(older_entry) = older_tree.get(path) else {
                // file absent in the parent: everything still unpinned was
                // introduced by the newer version
                for (slot, position) in attribution.iter_mut().zip(&mut positions) {
                    if position.take().is_some() && slot.is_none() {
                        *slot = Some(newer_label.clone());
                    }
                }
                break;
            };

            let older_lines = Blob::unpack(self.database().get(&older_entry.digest)?)?.lines();
            let script = MyersDiff::new(&older_lines, &newer_lines).diff();
            let origins = new_to_old_map(&script, newer_lines.len());

            for (slot, position) in attribution.iter_mut().zip(&mut positions) {
                if let Some(line_in_newer) = *position {
                    match origins[line_in_newer] {
                        Some(line_in_older) => *position = Some(line_in_older),
                        None => {
                            *slot = Some(newer_label.clone());
                            *position = None;
                        }
                    }
                }
            }

            newer_lines = older_lines;
            newer_label = older.label.clone();
        }

        // lines that survived all the way back belong to the oldest
        // version that carries the file
        Ok(attribution
            .into_iter()
            .zip(positions)
            .map(|(slot, _)| slot.unwrap_or_else(|| newer_label.clone()))
            .collect())
    }
}
