use crate::artifacts::objects::digest::Digest;
use bytes::Bytes;

/// Serialization into the canonical byte form an object is hashed over.
pub trait Packable {
    fn pack(&self) -> anyhow::Result<Bytes>;

    /// Digest of the canonical serialized form.
    fn digest(&self) -> anyhow::Result<Digest> {
        Ok(Digest::of(&self.pack()?))
    }
}

/// Deserialization from the canonical byte form.
pub trait Unpackable: Sized {
    fn unpack(data: Bytes) -> anyhow::Result<Self>;
}
