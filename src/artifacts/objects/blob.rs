use crate::artifacts::objects::object::{Packable, Unpackable};
use bytes::Bytes;
use derive_new::new;

/// Raw file content. The canonical form is the content itself, so the blob
/// digest is the digest of the bytes on disk.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Content interpreted as lines of text, for diffing and blame.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.content)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Packable for Blob {
    fn pack(&self) -> anyhow::Result<Bytes> {
        Ok(self.content.clone())
    }
}

impl Unpackable for Blob {
    fn unpack(data: Bytes) -> anyhow::Result<Self> {
        Ok(Blob::new(data))
    }
}
