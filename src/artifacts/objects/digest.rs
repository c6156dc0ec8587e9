//! Content digest (SHA-256)
//!
//! Digests are 64-character lowercase hexadecimal strings identifying every
//! object in the store. Identical content always hashes identically, which
//! is what makes the store deduplicating.
//!
//! ## Storage
//!
//! Objects are stored at `objects/<first-2-chars>/<remaining-62-chars>`.

use crate::artifacts::objects::{DIGEST_BYTE_LENGTH, DIGEST_HEX_LENGTH};
use sha2::{Digest as _, Sha256};
use std::path::PathBuf;

/// SHA-256 content identifier rendered as 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(String);

impl Digest {
    /// Compute the digest of a byte sequence.
    pub fn of(data: &[u8]) -> Self {
        Digest(hex::encode(Sha256::digest(data)))
    }

    /// Parse and validate a digest from its hex form.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != DIGEST_HEX_LENGTH {
            anyhow::bail!("invalid digest length: {}", id.len());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            anyhow::bail!("invalid digest characters: {}", id);
        }
        Ok(Digest(id))
    }

    /// Reconstruct a digest from its 32 raw bytes.
    pub fn from_raw_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() != DIGEST_BYTE_LENGTH {
            anyhow::bail!("invalid raw digest length: {}", bytes.len());
        }
        Ok(Digest(hex::encode(bytes)))
    }

    /// The 32 raw bytes of the digest, for binary serialization.
    pub fn to_raw_bytes(&self) -> anyhow::Result<Vec<u8>> {
        hex::decode(&self.0).map_err(Into::into)
    }

    /// Convert to the fan-out path used by the object store,
    /// e.g. `ab/c123...` for `abc123...`.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Abbreviated form for display.
    pub fn to_short(&self) -> String {
        self.0.split_at(8).0.to_string()
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_content_hashes_identically() {
        assert_eq!(Digest::of(b"hello"), Digest::of(b"hello"));
        assert_ne!(Digest::of(b"hello"), Digest::of(b"hello!"));
    }

    #[test]
    fn digest_round_trips_through_raw_bytes() {
        let digest = Digest::of(b"some content");
        let raw = digest.to_raw_bytes().unwrap();
        assert_eq!(Digest::from_raw_bytes(&raw).unwrap(), digest);
    }

    #[test]
    fn try_parse_rejects_bad_input() {
        assert!(Digest::try_parse("abc".to_string()).is_err());
        assert!(Digest::try_parse("g".repeat(64)).is_err());
        assert!(Digest::try_parse("A".repeat(64)).is_err());
        assert!(Digest::try_parse("a".repeat(64)).is_ok());
    }

    #[test]
    fn to_path_fans_out_on_first_two_chars() {
        let digest = Digest::of(b"x");
        let path = digest.to_path();
        let rendered = path.to_string_lossy().replace('\\', "/");
        assert_eq!(rendered.len(), 65);
        assert_eq!(&rendered[2..3], "/");
    }
}
