//! Delta records
//!
//! A `DeltaRecord` reconstructs a blob from a base blob identified by
//! digest: `Copy` operations pull ranges out of the base, `Insert`
//! operations carry literal bytes. The binary serialized form is the 32 raw
//! digest bytes of the base followed by tagged operations with big-endian
//! u64 fields.

use crate::artifacts::delta::rolling::RollingHash;
use crate::artifacts::delta::CHUNK_SIZE;
use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::DIGEST_BYTE_LENGTH;
use anyhow::Context;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

const OP_COPY: u8 = b'C';
const OP_INSERT: u8 = b'I';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOp {
    /// Copy `len` bytes starting at `offset` in the base.
    Copy { offset: u64, len: u64 },
    /// Literal bytes not present in the base.
    Insert { data: Bytes },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaRecord {
    base: Digest,
    ops: Vec<DeltaOp>,
}

impl DeltaRecord {
    pub fn base(&self) -> &Digest {
        &self.base
    }

    pub fn ops(&self) -> &[DeltaOp] {
        &self.ops
    }

    /// Encode `target` against `base`. Matching is rsync-style: the base is
    /// indexed in fixed-size blocks, a rolling checksum slides over the
    /// target, and checksum hits are verified byte-for-byte before being
    /// extended greedily into a `Copy`.
    pub fn encode(base_digest: Digest, base: &[u8], target: &[u8]) -> Self {
        let mut ops = Vec::new();

        if base.len() < CHUNK_SIZE {
            if !target.is_empty() {
                ops.push(DeltaOp::Insert {
                    data: Bytes::copy_from_slice(target),
                });
            }
            return DeltaRecord { base: base_digest, ops };
        }

        // Signature of the base: block hash -> block start offsets.
        let mut signature: HashMap<u64, Vec<usize>> = HashMap::new();
        for offset in (0..=base.len() - CHUNK_SIZE).step_by(CHUNK_SIZE) {
            signature
                .entry(RollingHash::hash_block(&base[offset..offset + CHUNK_SIZE]))
                .or_default()
                .push(offset);
        }

        let mut rolling = RollingHash::new(CHUNK_SIZE);
        let mut literal_start = 0usize;
        let mut pos = 0usize;

        while pos < target.len() {
            rolling.push(target[pos]);
            pos += 1;

            if !rolling.is_full() {
                continue;
            }

            let window_start = pos - CHUNK_SIZE;
            let matched = signature.get(&rolling.value()).and_then(|offsets| {
                offsets
                    .iter()
                    .copied()
                    .find(|&offset| base[offset..offset + CHUNK_SIZE] == target[window_start..pos])
            });

            if let Some(offset) = matched {
                if literal_start < window_start {
                    ops.push(DeltaOp::Insert {
                        data: Bytes::copy_from_slice(&target[literal_start..window_start]),
                    });
                }

                // Extend the verified match as far as it goes.
                let mut len = CHUNK_SIZE;
                while offset + len < base.len()
                    && window_start + len < target.len()
                    && base[offset + len] == target[window_start + len]
                {
                    len += 1;
                }

                ops.push(DeltaOp::Copy {
                    offset: offset as u64,
                    len: len as u64,
                });

                pos = window_start + len;
                literal_start = pos;
                rolling = RollingHash::new(CHUNK_SIZE);
            }
        }

        if literal_start < target.len() {
            ops.push(DeltaOp::Insert {
                data: Bytes::copy_from_slice(&target[literal_start..]),
            });
        }

        DeltaRecord { base: base_digest, ops }
    }

    /// Apply the operations to resolved base content.
    pub fn decode(&self, base: &[u8]) -> anyhow::Result<Bytes> {
        let mut out = Vec::new();

        for op in &self.ops {
            match op {
                DeltaOp::Copy { offset, len } => {
                    let start = usize::try_from(*offset).context("copy offset overflow")?;
                    let end = start
                        .checked_add(usize::try_from(*len).context("copy length overflow")?)
                        .context("copy range overflow")?;
                    if end > base.len() {
                        anyhow::bail!(
                            "copy range {}..{} exceeds base of {} bytes",
                            start,
                            end,
                            base.len()
                        );
                    }
                    out.extend_from_slice(&base[start..end]);
                }
                DeltaOp::Insert { data } => out.extend_from_slice(data),
            }
        }

        Ok(Bytes::from(out))
    }

    /// Size of the serialized record, for the delta-vs-raw policy decision.
    pub fn packed_len(&self) -> usize {
        DIGEST_BYTE_LENGTH
            + self
                .ops
                .iter()
                .map(|op| match op {
                    DeltaOp::Copy { .. } => 1 + 16,
                    DeltaOp::Insert { data } => 1 + 8 + data.len(),
                })
                .sum::<usize>()
    }

    pub fn pack(&self) -> anyhow::Result<Bytes> {
        let mut out = Vec::with_capacity(self.packed_len());
        out.write_all(&self.base.to_raw_bytes()?)?;

        for op in &self.ops {
            match op {
                DeltaOp::Copy { offset, len } => {
                    out.write_u8(OP_COPY)?;
                    out.write_u64::<BigEndian>(*offset)?;
                    out.write_u64::<BigEndian>(*len)?;
                }
                DeltaOp::Insert { data } => {
                    out.write_u8(OP_INSERT)?;
                    out.write_u64::<BigEndian>(data.len() as u64)?;
                    out.write_all(data)?;
                }
            }
        }

        Ok(Bytes::from(out))
    }

    pub fn unpack(data: &[u8]) -> anyhow::Result<Self> {
        let mut reader = Cursor::new(data);

        let mut raw_digest = [0u8; DIGEST_BYTE_LENGTH];
        reader
            .read_exact(&mut raw_digest)
            .context("delta record missing base digest")?;
        let base = Digest::from_raw_bytes(&raw_digest)?;

        let mut ops = Vec::new();
        loop {
            let tag = match reader.read_u8() {
                Ok(tag) => tag,
                Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(err) => return Err(err).context("malformed delta operation"),
            };

            match tag {
                OP_COPY => ops.push(DeltaOp::Copy {
                    offset: reader.read_u64::<BigEndian>()?,
                    len: reader.read_u64::<BigEndian>()?,
                }),
                OP_INSERT => {
                    let len = usize::try_from(reader.read_u64::<BigEndian>()?)
                        .context("insert length overflow")?;
                    let mut data = vec![0u8; len];
                    reader
                        .read_exact(&mut data)
                        .context("truncated insert operation")?;
                    ops.push(DeltaOp::Insert { data: Bytes::from(data) });
                }
                other => anyhow::bail!("unknown delta operation tag: {}", other),
            }
        }

        Ok(DeltaRecord { base, ops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn round_trip(base: &[u8], target: &[u8]) -> Bytes {
        let record = DeltaRecord::encode(Digest::of(base), base, target);
        record.decode(base).unwrap()
    }

    #[test]
    fn incremental_edit_produces_copies() {
        let base: Vec<u8> = (0..1024u32).flat_map(|i| i.to_be_bytes()).collect();
        let mut target = base.clone();
        target.splice(512..512, b"inserted in the middle".iter().copied());

        let record = DeltaRecord::encode(Digest::of(&base), &base, &target);

        assert!(record
            .ops()
            .iter()
            .any(|op| matches!(op, DeltaOp::Copy { .. })));
        assert!(record.packed_len() < target.len());
        assert_eq!(record.decode(&base).unwrap(), Bytes::from(target));
    }

    #[test]
    fn unrelated_content_is_a_single_insert() {
        let base = vec![0u8; 256];
        let target = vec![1u8; 100];

        let record = DeltaRecord::encode(Digest::of(&base), &base, &target);

        assert_eq!(record.ops().len(), 1);
        assert!(matches!(record.ops()[0], DeltaOp::Insert { .. }));
        assert_eq!(round_trip(&base, &target), Bytes::from(target));
    }

    #[test]
    fn short_base_falls_back_to_literal_insert() {
        let base = b"tiny".to_vec();
        let target = b"tiny but longer than the base".to_vec();
        assert_eq!(round_trip(&base, &target), Bytes::from(target));
    }

    #[test]
    fn empty_target_yields_no_ops() {
        let base = vec![7u8; 256];
        let record = DeltaRecord::encode(Digest::of(&base), &base, b"");
        assert!(record.ops().is_empty());
        assert_eq!(record.decode(&base).unwrap(), Bytes::new());
    }

    #[test]
    fn pack_unpack_round_trip() {
        let base: Vec<u8> = (0..200u8).cycle().take(800).collect();
        let mut target = base.clone();
        target.extend_from_slice(b"tail");

        let record = DeltaRecord::encode(Digest::of(&base), &base, &target);
        let unpacked = DeltaRecord::unpack(&record.pack().unwrap()).unwrap();

        assert_eq!(unpacked, record);
        assert_eq!(unpacked.pack().unwrap().len(), record.packed_len());
    }

    #[test]
    fn decode_rejects_out_of_range_copy() {
        let record = DeltaRecord {
            base: Digest::of(b"base"),
            ops: vec![DeltaOp::Copy { offset: 10, len: 20 }],
        };
        assert!(record.decode(b"short").is_err());
    }

    proptest! {
        #[test]
        fn decode_reconstructs_target_exactly(
            base in proptest::collection::vec(any::<u8>(), 0..512),
            target in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            prop_assert_eq!(round_trip(&base, &target), Bytes::from(target));
        }
    }
}
