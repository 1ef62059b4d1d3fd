//! Inventory announcements and requests: `inv`, `getdata`, `notfound`

use std::fmt;

use crate::codec::{varint_size, Reader, Writer};
use crate::constants::{level, HASH_SIZE, MAX_INVENTORY};
use crate::error::Result;
use crate::types::{encode_hash, Hash};

use super::WireMessage;

const WITNESS_FLAG: u32 = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InventoryType {
    #[default]
    Error,
    Transaction,
    Block,
    FilteredBlock,
    CompactBlock,
    WitnessTransaction,
    WitnessBlock,
    Reserved,
}

impl InventoryType {
    /// Unknown type numbers map to [`InventoryType::Error`].
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => InventoryType::Transaction,
            2 => InventoryType::Block,
            3 => InventoryType::FilteredBlock,
            4 => InventoryType::CompactBlock,
            v if v == WITNESS_FLAG | 1 => InventoryType::WitnessTransaction,
            v if v == WITNESS_FLAG | 2 => InventoryType::WitnessBlock,
            v if v == WITNESS_FLAG | 3 => InventoryType::Reserved,
            _ => InventoryType::Error,
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            InventoryType::Error => 0,
            InventoryType::Transaction => 1,
            InventoryType::Block => 2,
            InventoryType::FilteredBlock => 3,
            InventoryType::CompactBlock => 4,
            InventoryType::WitnessTransaction => WITNESS_FLAG | 1,
            InventoryType::WitnessBlock => WITNESS_FLAG | 2,
            InventoryType::Reserved => WITNESS_FLAG | 3,
        }
    }

    pub fn is_block(self) -> bool {
        matches!(
            self,
            InventoryType::Block
                | InventoryType::FilteredBlock
                | InventoryType::CompactBlock
                | InventoryType::WitnessBlock
        )
    }

    pub fn is_transaction(self) -> bool {
        matches!(
            self,
            InventoryType::Transaction | InventoryType::WitnessTransaction
        )
    }
}

/// Typed object reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InventoryVector {
    pub kind: InventoryType,
    pub hash: Hash,
}

impl InventoryVector {
    pub const SERIALIZED_SIZE: usize = 4 + HASH_SIZE;

    pub fn new(kind: InventoryType, hash: Hash) -> Self {
        Self { kind, hash }
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_u32_le(self.kind.to_u32());
        sink.write_hash(&self.hash);
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        Ok(Self {
            kind: InventoryType::from_u32(source.read_u32_le()?),
            hash: source.read_hash()?,
        })
    }
}

impl fmt::Display for InventoryVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.kind, encode_hash(&self.hash))
    }
}

/// Bounded list of inventory vectors shared by the inventory messages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryList {
    pub inventories: Vec<InventoryVector>,
}

impl InventoryList {
    pub fn new(inventories: Vec<InventoryVector>) -> Self {
        Self { inventories }
    }

    /// All hashes of `kind` with the same type
    pub fn from_hashes(kind: InventoryType, hashes: &[Hash]) -> Self {
        Self::new(hashes.iter().map(|hash| InventoryVector::new(kind, *hash)).collect())
    }

    pub fn count(&self, kind: InventoryType) -> usize {
        self.inventories.iter().filter(|inv| inv.kind == kind).count()
    }

    pub fn to_hashes(&self, kind: InventoryType) -> Vec<Hash> {
        self.inventories
            .iter()
            .filter(|inv| inv.kind == kind)
            .map(|inv| inv.hash)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.inventories.len() <= MAX_INVENTORY
    }

    pub fn serialized_size(&self) -> usize {
        varint_size(self.inventories.len() as u64)
            + InventoryVector::SERIALIZED_SIZE * self.inventories.len()
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_size(self.inventories.len());
        for inventory in &self.inventories {
            inventory.write_data(sink);
        }
    }

    pub fn read_data<R: Reader>(source: &mut R) -> Result<Self> {
        let count = source.read_size(MAX_INVENTORY)?;
        let mut inventories = Vec::with_capacity(count);
        for _ in 0..count {
            inventories.push(InventoryVector::from_data(source)?);
        }
        Ok(Self { inventories })
    }
}

macro_rules! inventory_message {
    ($(#[$doc:meta])* $name:ident, $command:literal, $minimum:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name {
            pub list: InventoryList,
        }

        impl $name {
            pub fn new(inventories: Vec<InventoryVector>) -> Self {
                Self {
                    list: InventoryList::new(inventories),
                }
            }
        }

        impl WireMessage for $name {
            const COMMAND: &'static str = $command;
            const VERSION_MINIMUM: u32 = $minimum;

            fn serialized_size(&self, _version: u32) -> usize {
                self.list.serialized_size()
            }

            fn write_data<W: Writer>(&self, sink: &mut W, _version: u32) {
                self.list.write_data(sink);
            }

            fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
                Ok(Self {
                    list: InventoryList::read_data(source)?,
                })
            }

            fn is_valid(&self) -> bool {
                self.list.is_valid()
            }
        }
    };
}

inventory_message!(
    /// Announce objects the sender has
    Inventory, "inv", level::MINIMUM
);

inventory_message!(
    /// Request announced objects
    GetData, "getdata", level::MINIMUM
);

inventory_message!(
    /// Requested objects the sender does not have
    NotFound, "notfound", level::BIP37
);
