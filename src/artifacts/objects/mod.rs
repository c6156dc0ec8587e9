//! Object types
//!
//! - `blob`: raw file content
//! - `digest`: SHA-256 content identifier
//! - `tree`: snapshot of tracked paths
//! - `version`: a node in the version graph

pub mod blob;
pub mod digest;
pub mod object;
pub mod tree;
pub mod version;

/// Length of a digest rendered as lowercase hex.
pub const DIGEST_HEX_LENGTH: usize = 64;

/// Length of a digest in raw bytes.
pub const DIGEST_BYTE_LENGTH: usize = 32;
