//! Content-addressable version control engine
//!
//! The crate is organized into three layers:
//!
//! - `areas`: repository components (object database, index, refs, stash,
//!   working tree) and the `Repository` handle tying them together
//! - `artifacts`: data structures and algorithms (objects, delta codec,
//!   Myers diff, status inspection, checkout migration)
//! - `commands`: user-facing command implementations

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

/// Name of the directory holding all engine state inside a repository.
pub const ENGINE_DIR: &str = ".lvc";
