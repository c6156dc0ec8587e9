//! Version records
//!
//! A version is a node in the history graph: a tree snapshot plus
//! provenance. Versions are keyed by a user-supplied unique label, carry at
//! most one parent label, and are immutable once written. The graph is
//! therefore a tree rooted at the first commit, walked backwards by `log`
//! and `blame`.

use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::object::{Packable, Unpackable};
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use derive_new::new;

/// A single node in the version graph.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Version {
    pub label: String,
    pub parent_label: Option<String>,
    pub tree_digest: Digest,
    /// Branch the version was committed on; empty for detached-HEAD commits.
    pub branch: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl Version {
    pub fn is_detached(&self) -> bool {
        self.branch.is_empty()
    }

    /// First line of the message, for one-line summaries.
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Validate a user-supplied version label. Labels become file names under
/// `versions/`, so path separators and relative-path components are refused.
pub fn validate_label(label: &str) -> anyhow::Result<()> {
    if label.is_empty() {
        anyhow::bail!("version label must not be empty");
    }
    if label.starts_with('.') {
        anyhow::bail!("version label must not start with '.'");
    }
    if label
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        anyhow::bail!("invalid version label: {}", label);
    }
    Ok(())
}

impl Packable for Version {
    fn pack(&self) -> anyhow::Result<Bytes> {
        let mut out = String::new();
        out.push_str(&format!("label {}\n", self.label));
        out.push_str(&format!("tree {}\n", self.tree_digest));
        if let Some(parent) = &self.parent_label {
            out.push_str(&format!("parent {}\n", parent));
        }
        if !self.branch.is_empty() {
            out.push_str(&format!("branch {}\n", self.branch));
        }
        out.push_str(&format!(
            "timestamp {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        out.push('\n');
        out.push_str(&self.message);
        Ok(Bytes::from(out))
    }
}

impl Unpackable for Version {
    fn unpack(data: Bytes) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(&data).context("version record is not valid utf-8")?;

        let mut label = None;
        let mut tree_digest = None;
        let mut parent_label = None;
        let mut branch = String::new();
        let mut timestamp = None;
        let mut message = String::new();
        let mut in_message = false;

        for line in text.split('\n') {
            if in_message {
                if !message.is_empty() {
                    message.push('\n');
                }
                message.push_str(line);
            } else if line.is_empty() {
                in_message = true;
            } else if let Some(value) = line.strip_prefix("label ") {
                label = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("tree ") {
                tree_digest = Some(Digest::try_parse(value.to_string())?);
            } else if let Some(value) = line.strip_prefix("parent ") {
                parent_label = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("branch ") {
                branch = value.to_string();
            } else if let Some(value) = line.strip_prefix("timestamp ") {
                timestamp = Some(
                    DateTime::parse_from_rfc3339(value)
                        .context("invalid version timestamp")?
                        .with_timezone(&Utc),
                );
            } else {
                anyhow::bail!("malformed version header line: {}", line);
            }
        }

        Ok(Version::new(
            label.context("version record missing label")?,
            parent_label,
            tree_digest.context("version record missing tree digest")?,
            branch,
            timestamp.context("version record missing timestamp")?,
            message,
        ))
    }
}
