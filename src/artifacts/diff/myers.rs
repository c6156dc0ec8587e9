//! Myers' diff
//!
//! Computes a minimal edit script between two sequences in O((N+M)·D) time
//! and space, where D is the edit distance. The tie-break is deterministic:
//! at equal cost a deletion is taken before an insertion, so identical
//! inputs always produce identical scripts and replaced lines render as
//! `-old` followed by `+new`.

use derive_new::new;

/// One step of an edit script. Indices refer to positions in the old and
/// new sequences respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Equal {
        old_index: usize,
        new_index: usize,
        value: T,
    },
    Delete {
        old_index: usize,
        value: T,
    },
    Insert {
        new_index: usize,
        value: T,
    },
}

impl<T> Edit<T> {
    pub fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }
}

impl<T: Clone + Into<String>> Edit<T> {
    pub fn as_string(&self) -> String {
        match self {
            Edit::Delete { value, .. } => format!("-{}", value.clone().into()),
            Edit::Insert { value, .. } => format!("+{}", value.clone().into()),
            Edit::Equal { value, .. } => format!(" {}", value.clone().into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<'d, T: Eq + Clone> MyersDiff<'d, T> {
    /// Forward pass: record the furthest-reaching x per diagonal for each
    /// edit cost d, until the bottom-right corner is reached.
    fn compute_shortest_edit(&self) -> Vec<Vec<isize>> {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let offset = (n + m) as usize;

        let mut v = vec![0isize; 2 * offset + 1];
        let mut trace = Vec::new();

        for d in 0..=(n + m) {
            trace.push(v.clone());

            for k in (-d..=d).step_by(2) {
                let idx = (offset as isize + k) as usize;

                let mut x = if k == -d {
                    // only reachable from k+1, an insertion
                    v[idx + 1]
                } else if k == d {
                    // only reachable from k-1, a deletion
                    v[idx - 1] + 1
                } else {
                    // deletion wins ties so deletions sort before insertions
                    let x_del = v[idx - 1] + 1;
                    let x_ins = v[idx + 1];
                    if x_del > x_ins { x_del } else { x_ins }
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    // snake
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return trace;
                }
            }
        }

        trace
    }

    /// Walk the trace backwards from the corner, reconstructing the path of
    /// (prev_x, prev_y, x, y) moves.
    fn backtrack(&self) -> Vec<(isize, isize, isize, isize)> {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let offset = (x + y) as usize;
        let mut edit_path = Vec::new();

        let trace = self.compute_shortest_edit();

        for (d, v) in trace.iter().enumerate().rev() {
            let k = x - y;

            let prev_k = if k == -(d as isize) {
                k + 1
            } else if k == (d as isize) {
                k - 1
            } else {
                let k_del = k - 1;
                let k_ins = k + 1;
                if v[(offset as isize + k_del) as usize] + 1 > v[(offset as isize + k_ins) as usize]
                {
                    k_del
                } else {
                    k_ins
                }
            };

            let prev_x = v[(offset as isize + prev_k) as usize];
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edit_path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            if d > 0 {
                edit_path.push((prev_x, prev_y, x, y));
            }

            (x, y) = (prev_x, prev_y);
        }

        edit_path
    }

    /// The minimal edit script, oldest position first.
    pub fn diff(&self) -> Vec<Edit<T>> {
        if self.a.is_empty() && self.b.is_empty() {
            return Vec::new();
        }

        let mut script = Vec::new();

        for (prev_x, prev_y, x, y) in self.backtrack() {
            if x == prev_x {
                // only y advanced
                if prev_y < self.b.len() as isize {
                    script.push(Edit::Insert {
                        new_index: prev_y as usize,
                        value: self.b[prev_y as usize].clone(),
                    });
                }
            } else if y == prev_y {
                // only x advanced
                if prev_x < self.a.len() as isize {
                    script.push(Edit::Delete {
                        old_index: prev_x as usize,
                        value: self.a[prev_x as usize].clone(),
                    });
                }
            } else {
                // diagonal move
                if prev_x < self.a.len() as isize {
                    script.push(Edit::Equal {
                        old_index: prev_x as usize,
                        new_index: prev_y as usize,
                        value: self.a[prev_x as usize].clone(),
                    });
                }
            }
        }

        script.reverse();
        script
    }
}

/// Replay an edit script against the old sequence, reconstructing the new
/// one.
pub fn apply<T: Clone>(script: &[Edit<T>]) -> Vec<T> {
    script
        .iter()
        .filter_map(|edit| match edit {
            Edit::Equal { value, .. } | Edit::Insert { value, .. } => Some(value.clone()),
            Edit::Delete { .. } => None,
        })
        .collect()
}

/// For each position in the new sequence, the position in the old sequence
/// it was carried over from, or `None` when the line was introduced by this
/// edit. Used by blame to push attribution backwards through history.
pub fn new_to_old_map<T>(script: &[Edit<T>], new_len: usize) -> Vec<Option<usize>> {
    let mut map = vec![None; new_len];
    for edit in script {
        if let Edit::Equal {
            old_index,
            new_index,
            ..
        } = edit
        {
            map[*new_index] = Some(*old_index);
        }
    }
    map
}

/// Split text into lines for diffing.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
