//! `headers`: a batch of block headers answering `getheaders`

use crate::codec::{varint_size, Reader, Writer};
use crate::constants::{level, MAX_GET_HEADERS};
use crate::error::{DomainError, Result};
use crate::header::BlockHeader;
use crate::types::Hash;

use super::inventory::{InventoryList, InventoryType};
use super::WireMessage;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Headers {
    pub headers: Vec<BlockHeader>,
}

impl Headers {
    pub fn new(headers: Vec<BlockHeader>) -> Self {
        Self { headers }
    }

    /// True when each header extends the one before it.
    pub fn is_sequential(&self) -> bool {
        self.headers
            .windows(2)
            .all(|pair| pair[1].previous_block_hash == pair[0].hash())
    }

    pub fn to_hashes(&self) -> Vec<Hash> {
        self.headers.iter().map(BlockHeader::hash).collect()
    }

    pub fn to_inventory(&self, kind: InventoryType) -> InventoryList {
        InventoryList::from_hashes(kind, &self.to_hashes())
    }
}

impl WireMessage for Headers {
    const COMMAND: &'static str = "headers";
    const VERSION_MINIMUM: u32 = level::HEADERS;

    fn serialized_size(&self, _version: u32) -> usize {
        // each header trails an empty transaction count
        varint_size(self.headers.len() as u64) + (BlockHeader::SERIALIZED_SIZE + 1) * self.headers.len()
    }

    fn write_data<W: Writer>(&self, sink: &mut W, _version: u32) {
        sink.write_size(self.headers.len());
        for header in &self.headers {
            header.write_data(sink);
            sink.write_variable(0);
        }
    }

    fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
        let count = source.read_size(MAX_GET_HEADERS)?;
        let mut headers = Vec::with_capacity(count);
        for _ in 0..count {
            headers.push(BlockHeader::from_data(source)?);
            let transactions = source.read_variable()?;
            if transactions != 0 {
                return source.fail(DomainError::MalformedField(format!(
                    "header carries {} transactions",
                    transactions
                )));
            }
        }
        Ok(Self { headers })
    }

    fn is_valid(&self) -> bool {
        self.headers.len() <= MAX_GET_HEADERS
    }
}
