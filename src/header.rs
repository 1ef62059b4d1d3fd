//! 80-byte block header

use serde::{Deserialize, Serialize};

use crate::codec::{HashWriter, Reader, Writer};
use crate::constants::HEADER_SIZE;
use crate::error::Result;
use crate::pow::CompactTarget;
use crate::types::Hash;

/// Block header as carried by `headers` messages and blocks
///
/// All integers are little-endian on the wire, including `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub previous_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub const SERIALIZED_SIZE: usize = HEADER_SIZE;

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_u32_le(self.version);
        sink.write_hash(&self.previous_block_hash);
        sink.write_hash(&self.merkle_root);
        sink.write_u32_le(self.timestamp);
        sink.write_u32_le(self.bits);
        sink.write_u32_le(self.nonce);
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SERIALIZED_SIZE);
        self.write_data(&mut data);
        data
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        Ok(Self {
            version: source.read_u32_le()?,
            previous_block_hash: source.read_hash()?,
            merkle_root: source.read_hash()?,
            timestamp: source.read_u32_le()?,
            bits: source.read_u32_le()?,
            nonce: source.read_u32_le()?,
        })
    }

    /// Double SHA-256 of the serialized header
    pub fn hash(&self) -> Hash {
        let mut writer = HashWriter::new();
        self.write_data(&mut writer);
        writer.finish()
    }

    pub fn compact_target(&self) -> CompactTarget {
        CompactTarget::from_compact(self.bits)
    }
}
