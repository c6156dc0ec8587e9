//! Rolling-hash delta codec
//!
//! Expresses a blob as a reference to a prior similar blob plus copy/insert
//! operations, rsync-style: a rolling checksum over fixed-size blocks of the
//! base locates matching regions in the new content, matched regions become
//! `Copy` operations and the gaps become `Insert` literals.
//!
//! Policy lives here: deltas are only stored when they come out smaller than
//! [`MAX_DELTA_RATIO`] of the raw content, and chains of deltas are cut off
//! at [`MAX_CHAIN_DEPTH`], after which a full snapshot is forced. Both
//! bounds keep reconstruction cost proportional to content size.

pub mod record;
pub mod rolling;

/// Rolling hash window, and the block size the base is indexed at.
pub const CHUNK_SIZE: usize = 64;

/// Rolling hash multiplier.
pub const HASH_PRIME: u64 = 31;

/// Rolling hash modulus.
pub const HASH_MOD: u64 = 1_000_000_007;

/// Maximum depth of a delta chain before a full snapshot is forced.
pub const MAX_CHAIN_DEPTH: usize = 16;

/// A delta at or above this fraction of the raw size is not worth storing.
pub const MAX_DELTA_RATIO: f64 = 0.70;
