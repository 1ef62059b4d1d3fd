//! Block locator requests: `getblocks` and `getheaders`

use crate::codec::{varint_size, Reader, Writer};
use crate::constants::{level, HASH_SIZE, MAX_GET_BLOCKS};
use crate::error::Result;
use crate::types::{Hash, NULL_HASH};

use super::WireMessage;

/// Start hashes (newest first) and an optional stop hash
///
/// On the wire the locator is preceded by the sender's protocol version,
/// which is written as negotiated and ignored when reading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockLocator {
    pub start_hashes: Vec<Hash>,
    /// [`NULL_HASH`] requests as many blocks as the peer will send
    pub stop_hash: Hash,
}

impl BlockLocator {
    pub fn new(start_hashes: Vec<Hash>, stop_hash: Hash) -> Self {
        Self {
            start_hashes,
            stop_hash,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.stop_hash == NULL_HASH
    }

    pub fn is_valid(&self) -> bool {
        !self.start_hashes.is_empty() && self.start_hashes.len() <= MAX_GET_BLOCKS
    }

    pub fn serialized_size(&self) -> usize {
        4 + varint_size(self.start_hashes.len() as u64)
            + HASH_SIZE * self.start_hashes.len()
            + HASH_SIZE
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W, version: u32) {
        sink.write_u32_le(version);
        sink.write_size(self.start_hashes.len());
        for hash in &self.start_hashes {
            sink.write_hash(hash);
        }
        sink.write_hash(&self.stop_hash);
    }

    pub fn read_data<R: Reader>(source: &mut R) -> Result<Self> {
        let _sender_version = source.read_u32_le()?;
        let count = source.read_size(MAX_GET_BLOCKS)?;
        let mut start_hashes = Vec::with_capacity(count);
        for _ in 0..count {
            start_hashes.push(source.read_hash()?);
        }
        Ok(Self {
            start_hashes,
            stop_hash: source.read_hash()?,
        })
    }
}

/// Request an inventory of blocks following the locator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetBlocks {
    pub locator: BlockLocator,
}

/// Request headers following the locator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetHeaders {
    pub locator: BlockLocator,
}

impl WireMessage for GetBlocks {
    const COMMAND: &'static str = "getblocks";
    const VERSION_MINIMUM: u32 = level::MINIMUM;

    fn serialized_size(&self, _version: u32) -> usize {
        self.locator.serialized_size()
    }

    fn write_data<W: Writer>(&self, sink: &mut W, version: u32) {
        self.locator.write_data(sink, version);
    }

    fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
        Ok(Self {
            locator: BlockLocator::read_data(source)?,
        })
    }

    fn is_valid(&self) -> bool {
        self.locator.is_valid()
    }
}

impl WireMessage for GetHeaders {
    const COMMAND: &'static str = "getheaders";
    const VERSION_MINIMUM: u32 = level::HEADERS;

    fn serialized_size(&self, _version: u32) -> usize {
        self.locator.serialized_size()
    }

    fn write_data<W: Writer>(&self, sink: &mut W, version: u32) {
        self.locator.write_data(sink, version);
    }

    fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
        Ok(Self {
            locator: BlockLocator::read_data(source)?,
        })
    }

    fn is_valid(&self) -> bool {
        self.locator.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SliceReader;
    use crate::error::DomainError;

    #[test]
    fn test_locator_layout() {
        let message = GetHeaders {
            locator: BlockLocator::new(vec![[1; 32], [2; 32]], NULL_HASH),
        };
        let data = message.to_data(level::BIP37);
        assert_eq!(data.len(), message.serialized_size(level::BIP37));
        assert_eq!(&data[..4], &level::BIP37.to_le_bytes());
        assert_eq!(data[4], 2);
        assert!(message.is_valid());
        assert!(message.locator.is_open_ended());
    }

    #[test]
    fn test_sender_version_ignored() {
        let message = GetBlocks {
            locator: BlockLocator::new(vec![[7; 32]], [9; 32]),
        };
        let data = message.to_data(level::MINIMUM);
        let parsed = GetBlocks::from_data(&mut SliceReader::new(&data), level::MAXIMUM).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_locator_count_limit() {
        let mut data = Vec::new();
        data.write_u32_le(level::MAXIMUM);
        data.write_size(MAX_GET_BLOCKS + 1);
        let result = GetBlocks::from_data(&mut SliceReader::new(&data), level::MAXIMUM);
        assert!(matches!(result, Err(DomainError::MalformedField(_))));
    }

    #[test]
    fn test_empty_locator_invalid() {
        assert!(!GetBlocks::default().is_valid());
    }
}
