//! Diff algorithms
//!
//! - `myers`: Myers' shortest-edit-script diff over arbitrary sequences
//! - `hunk`: grouping of edit scripts into unified-diff hunks

pub mod hunk;
pub mod myers;
