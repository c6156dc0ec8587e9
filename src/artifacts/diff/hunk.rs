//! Unified-diff hunks
//!
//! Groups an edit script into hunks of contiguous changes with surrounding
//! context lines, the shape rendered as `@@ -a,b +c,d @@` blocks.

use crate::artifacts::diff::myers::Edit;

/// Number of unchanged lines shown around each change.
pub const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based start line in the old sequence.
    pub old_start: usize,
    pub old_count: usize,
    /// 1-based start line in the new sequence.
    pub new_start: usize,
    pub new_count: usize,
    /// `(sign, line)` pairs, sign one of `' '`, `'-'`, `'+'`.
    pub lines: Vec<(char, String)>,
}

impl Hunk {
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }
}

/// Group an edit script into hunks with [`CONTEXT_LINES`] of context.
/// Regions whose context overlaps are merged into a single hunk.
pub fn hunks(script: &[Edit<String>]) -> Vec<Hunk> {
    group(script, CONTEXT_LINES)
}

fn group(script: &[Edit<String>], context: usize) -> Vec<Hunk> {
    // (old, new) positions before consuming each edit, for hunk headers.
    let mut positions = Vec::with_capacity(script.len());
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for edit in script {
        positions.push((old_pos, new_pos));
        match edit {
            Edit::Equal { .. } => {
                old_pos += 1;
                new_pos += 1;
            }
            Edit::Delete { .. } => old_pos += 1,
            Edit::Insert { .. } => new_pos += 1,
        }
    }

    // Change regions expanded by context, merged when they touch.
    let mut regions: Vec<(usize, usize)> = Vec::new();
    let mut start = None;
    for (i, edit) in script.iter().enumerate() {
        if !edit.is_equal() {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            push_region(&mut regions, s.saturating_sub(context), i + context);
        }
    }
    if let Some(s) = start {
        push_region(&mut regions, s.saturating_sub(context), script.len());
    }

    regions
        .into_iter()
        .map(|(from, to)| {
            let to = to.min(script.len());
            let (old_start, new_start) = positions[from];
            let mut hunk = Hunk {
                old_start: old_start + 1,
                old_count: 0,
                new_start: new_start + 1,
                new_count: 0,
                lines: Vec::new(),
            };

            for edit in &script[from..to] {
                match edit {
                    Edit::Equal { value, .. } => {
                        hunk.lines.push((' ', value.clone()));
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                    }
                    Edit::Delete { value, .. } => {
                        hunk.lines.push(('-', value.clone()));
                        hunk.old_count += 1;
                    }
                    Edit::Insert { value, .. } => {
                        hunk.lines.push(('+', value.clone()));
                        hunk.new_count += 1;
                    }
                }
            }

            hunk
        })
        .collect()
}

fn push_region(regions: &mut Vec<(usize, usize)>, from: usize, to: usize) {
    match regions.last_mut() {
        Some((_, last_to)) if from <= *last_to => *last_to = (*last_to).max(to),
        _ => regions.push((from, to)),
    }
}
