//! Data structures and algorithms
//!
//! - `checkout`: working-tree migration planning
//! - `delta`: rolling-hash delta codec
//! - `diff`: Myers' diff and unified-diff hunks
//! - `objects`: digests, blobs, trees, version records
//! - `status`: working-tree status inspection

pub mod checkout;
pub mod delta;
pub mod diff;
pub mod objects;
pub mod status;
