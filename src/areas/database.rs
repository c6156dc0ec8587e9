//! Content-addressable object store
//!
//! Objects are keyed by the digest of their logical content and stored
//! zlib-compressed under `objects/<2-hex>/<62-hex>`. The payload carries a
//! one-byte kind tag: raw content, or a delta record referencing a base
//! object. Because the digest always covers the resolved content, identical
//! content deduplicates no matter how it is encoded, and every read can be
//! verified against the digest it was requested by.
//!
//! Writes are atomic with respect to process termination: content goes to a
//! temporary file first and is renamed into place, so a crash never leaves
//! a partially-written object visible under its digest.

use crate::artifacts::delta::record::DeltaRecord;
use crate::artifacts::delta::{MAX_CHAIN_DEPTH, MAX_DELTA_RATIO};
use crate::artifacts::objects::digest::Digest;
use crate::errors::EngineError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::Path;

const KIND_RAW: u8 = b'R';
const KIND_DELTA: u8 = b'D';

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store raw content. Repeated puts of identical content are no-ops
    /// after the first write and return the same digest.
    pub fn put(&self, content: &[u8]) -> anyhow::Result<Digest> {
        let digest = Digest::of(content);

        if !self.exists(&digest) {
            let mut payload = Vec::with_capacity(content.len() + 1);
            payload.push(KIND_RAW);
            payload.extend_from_slice(content);
            self.write_payload(&digest, &payload)?;
        }

        Ok(digest)
    }

    /// Store content, delta-encoded against `base` when that pays off.
    /// Falls back to a raw put when there is no usable base, the base's
    /// chain is already at maximum depth, or the delta would not be small
    /// enough relative to the raw content.
    pub fn put_delta(&self, content: &[u8], base: Option<&Digest>) -> anyhow::Result<Digest> {
        let digest = Digest::of(content);
        if self.exists(&digest) {
            return Ok(digest);
        }

        if let Some(base_digest) = base
            && *base_digest != digest
            && self.exists(base_digest)
            && self.chain_depth(base_digest)? < MAX_CHAIN_DEPTH
        {
            let base_content = self.get(base_digest)?;
            let record = DeltaRecord::encode(base_digest.clone(), &base_content, content);

            if (record.packed_len() as f64) < content.len() as f64 * MAX_DELTA_RATIO {
                let mut payload = vec![KIND_DELTA];
                payload.extend_from_slice(&record.pack()?);
                self.write_payload(&digest, &payload)?;
                return Ok(digest);
            }
        }

        self.put(content)
    }

    /// Load an object's logical content, resolving delta chains and
    /// verifying the result against the requested digest.
    pub fn get(&self, digest: &Digest) -> anyhow::Result<Bytes> {
        self.resolve(digest, 0)
    }

    pub fn exists(&self, digest: &Digest) -> bool {
        self.path.join(digest.to_path()).exists()
    }

    fn resolve(&self, digest: &Digest, depth: usize) -> anyhow::Result<Bytes> {
        if depth > MAX_CHAIN_DEPTH {
            return Err(EngineError::ObjectNotFound(digest.to_string()))
                .context("delta chain exceeds maximum depth");
        }

        let payload = self.read_payload(digest)?;
        let content = match payload.first() {
            Some(&KIND_RAW) => payload.slice(1..),
            Some(&KIND_DELTA) => {
                let record = DeltaRecord::unpack(&payload[1..])?;
                let base = self.resolve(record.base(), depth + 1)?;
                record.decode(&base)?
            }
            _ => return Err(EngineError::CorruptObject(digest.to_string()).into()),
        };

        if Digest::of(&content) != *digest {
            return Err(EngineError::CorruptObject(digest.to_string()).into());
        }

        Ok(content)
    }

    /// Number of delta hops between an object and its nearest full
    /// snapshot. Consulted at encode time to keep chains bounded.
    fn chain_depth(&self, digest: &Digest) -> anyhow::Result<usize> {
        let mut current = digest.clone();
        let mut depth = 0;

        while depth <= MAX_CHAIN_DEPTH {
            let payload = self.read_payload(&current)?;
            match payload.first() {
                Some(&KIND_RAW) => return Ok(depth),
                Some(&KIND_DELTA) => {
                    current = DeltaRecord::unpack(&payload[1..])?.base().clone();
                    depth += 1;
                }
                _ => return Err(EngineError::CorruptObject(current.to_string()).into()),
            }
        }

        Ok(depth)
    }

    fn read_payload(&self, digest: &Digest) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(digest.to_path());

        let compressed = match std::fs::read(&object_path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::ObjectNotFound(digest.to_string()).into());
            }
            Err(err) => {
                return Err(err).context(format!(
                    "unable to read object file {}",
                    object_path.display()
                ));
            }
        };

        Self::decompress(&compressed)
    }

    fn write_payload(&self, digest: &Digest, payload: &[u8]) -> anyhow::Result<()> {
        let object_path = self.path.join(digest.to_path());
        let object_dir = object_path
            .parent()
            .context(format!("invalid object path {}", object_path.display()))?;

        std::fs::create_dir_all(object_dir).context(format!(
            "unable to create object directory {}",
            object_dir.display()
        ))?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let compressed = Self::compress(payload)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "unable to open object file {}",
                temp_object_path.display()
            ))?;
        file.write_all(&compressed).context(format!(
            "unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file onto the object path to make the write atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .context("unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("unable to decompress object content")?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
