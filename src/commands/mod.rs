//! Command implementations
//!
//! Every user-facing operation is an `impl Repository` block in its own
//! module under `porcelain`, writing normal output to the repository's
//! injected writer and diagnostics to stderr.

pub mod porcelain;
