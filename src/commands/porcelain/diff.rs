use crate::areas::repository::Repository;
use crate::artifacts::diff::hunk::hunks;
use crate::artifacts::diff::myers::MyersDiff;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::tree::Tree;
use bytes::Bytes;
use colored::Colorize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct DiffStats {
    modified: usize,
    added: usize,
    deleted: usize,
}

impl Repository {
    /// Without arguments, compare the working tree against the current
    /// version. With one version, compare it against HEAD; with two,
    /// compare the two snapshots.
    pub fn diff(&mut self, from: Option<&str>, to: Option<&str>) -> anyhow::Result<()> {
        self.require_initialized()?;

        match from {
            None => self.diff_workspace(),
            Some(from) => {
                let old_tree = self.tree_of(&self.refs().read_version(from)?)?;
                let (new_tree, new_name) = match to {
                    Some(to) => (self.tree_of(&self.refs().read_version(to)?)?, to),
                    None => (self.head_tree()?, "HEAD"),
                };

                writeln!(
                    self.writer(),
                    "{}\n",
                    format!("diff {}..{}", from, new_name).blue()
                )?;
                self.diff_trees(&old_tree, &new_tree)
            }
        }
    }

    fn diff_workspace(&self) -> anyhow::Result<()> {
        let head_tree = self.head_tree()?;
        let on_disk = self
            .workspace()
            .list_files(None)?
            .into_iter()
            .collect::<BTreeSet<PathBuf>>();

        let all_paths = on_disk
            .iter()
            .cloned()
            .chain(head_tree.entries().map(|(path, _)| path))
            .collect::<BTreeSet<PathBuf>>();

        let mut stats = DiffStats::default();
        for path in all_paths {
            match (head_tree.get(&path), on_disk.contains(&path)) {
                (None, true) => {
                    writeln!(self.writer(), "{}  {}", "A".green(), path.display())?;
                    stats.added += 1;
                }
                (Some(_), false) => {
                    writeln!(self.writer(), "{}  {}", "D".red(), path.display())?;
                    stats.deleted += 1;
                }
                (Some(entry), true) => {
                    let new_content = self.workspace().read_file(&path)?;
                    if Digest::of(&new_content) != entry.digest {
                        let old_content = self.database().get(&entry.digest)?;
                        writeln!(self.writer(), "{}  {}", "M".yellow(), path.display())?;
                        self.print_content_diff(&old_content, &new_content)?;
                        stats.modified += 1;
                    }
                }
                (None, false) => unreachable!(),
            }
        }

        self.print_stats(&stats)
    }

    fn diff_trees(&self, old_tree: &Tree, new_tree: &Tree) -> anyhow::Result<()> {
        let all_paths = old_tree
            .entries()
            .map(|(path, _)| path)
            .chain(new_tree.entries().map(|(path, _)| path))
            .collect::<BTreeSet<PathBuf>>();

        let mut stats = DiffStats::default();
        for path in all_paths {
            match (old_tree.get(&path), new_tree.get(&path)) {
                (None, Some(_)) => {
                    writeln!(self.writer(), "{}  {}", "A".green(), path.display())?;
                    stats.added += 1;
                }
                (Some(_), None) => {
                    writeln!(self.writer(), "{}  {}", "D".red(), path.display())?;
                    stats.deleted += 1;
                }
                (Some(old_entry), Some(new_entry)) if old_entry.digest != new_entry.digest => {
                    let old_content = self.database().get(&old_entry.digest)?;
                    let new_content = self.database().get(&new_entry.digest)?;
                    writeln!(self.writer(), "{}  {}", "M".yellow(), path.display())?;
                    self.print_content_diff(&old_content, &new_content)?;
                    stats.modified += 1;
                }
                _ => {}
            }
        }

        self.print_stats(&stats)
    }

    fn print_content_diff(&self, old: &Bytes, new: &Bytes) -> anyhow::Result<()> {
        let old_lines = Blob::new(old.clone()).lines();
        let new_lines = Blob::new(new.clone()).lines();
        let script = MyersDiff::new(&old_lines, &new_lines).diff();

        for hunk in hunks(&script) {
            writeln!(self.writer(), "{}", hunk.header().blue())?;
            for (sign, line) in &hunk.lines {
                let rendered = format!("{}{}", sign, line);
                let rendered = match sign {
                    '+' => rendered.green().to_string(),
                    '-' => rendered.red().to_string(),
                    _ => rendered,
                };
                writeln!(self.writer(), "{}", rendered)?;
            }
        }
        writeln!(self.writer())?;

        Ok(())
    }

    fn print_stats(&self, stats: &DiffStats) -> anyhow::Result<()> {
        if stats.modified == 0 && stats.added == 0 && stats.deleted == 0 {
            writeln!(self.writer(), "no changes")?;
        } else {
            writeln!(
                self.writer(),
                "{} modified, {} added, {} deleted",
                stats.modified, stats.added, stats.deleted
            )?;
        }

        Ok(())
    }
}
