//! Token data attached to unspent outputs
//!
//! Encoding: 32-byte category id, one bitfield byte, then the NFT commitment
//! (varint length + bytes) when present, then the fungible amount as a varint
//! when present.

use serde::{Deserialize, Serialize};

use crate::codec::{varint_size, Reader, Writer};
use crate::constants::MAX_COMMITMENT_SIZE;
use crate::error::{DomainError, Result};
use crate::types::Hash;

const RESERVED: u8 = 0x80;
const HAS_COMMITMENT: u8 = 0x40;
const HAS_NFT: u8 = 0x20;
const HAS_AMOUNT: u8 = 0x10;
const CAPABILITY_MASK: u8 = 0x0f;

/// Maximum fungible amount of a single output
pub const MAX_TOKEN_AMOUNT: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Capability {
    #[default]
    None = 0x00,
    Mutable = 0x01,
    Minting = 0x02,
}

impl Capability {
    pub fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0x00 => Some(Capability::None),
            0x01 => Some(Capability::Mutable),
            0x02 => Some(Capability::Minting),
            _ => None,
        }
    }
}

/// Non-fungible part of a token
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NonFungible {
    pub capability: Capability,
    pub commitment: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenPayload {
    Fungible { amount: u64 },
    NonFungible(NonFungible),
    Both { amount: u64, nft: NonFungible },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub id: Hash,
    pub payload: TokenPayload,
}

impl TokenData {
    pub fn fungible(id: Hash, amount: u64) -> Self {
        Self {
            id,
            payload: TokenPayload::Fungible { amount },
        }
    }

    pub fn non_fungible(id: Hash, capability: Capability, commitment: Vec<u8>) -> Self {
        Self {
            id,
            payload: TokenPayload::NonFungible(NonFungible {
                capability,
                commitment,
            }),
        }
    }

    pub fn amount(&self) -> Option<u64> {
        match &self.payload {
            TokenPayload::Fungible { amount } | TokenPayload::Both { amount, .. } => Some(*amount),
            TokenPayload::NonFungible(_) => None,
        }
    }

    pub fn nft(&self) -> Option<&NonFungible> {
        match &self.payload {
            TokenPayload::NonFungible(nft) | TokenPayload::Both { nft, .. } => Some(nft),
            TokenPayload::Fungible { .. } => None,
        }
    }

    pub fn bitfield(&self) -> u8 {
        let mut bits = 0;
        if self.amount().is_some() {
            bits |= HAS_AMOUNT;
        }
        if let Some(nft) = self.nft() {
            bits |= HAS_NFT | nft.capability as u8;
            if !nft.commitment.is_empty() {
                bits |= HAS_COMMITMENT;
            }
        }
        bits
    }

    pub fn is_valid(&self) -> bool {
        if let Some(amount) = self.amount() {
            if amount == 0 || amount > MAX_TOKEN_AMOUNT {
                return false;
            }
        }
        match self.nft() {
            Some(nft) => nft.commitment.len() <= MAX_COMMITMENT_SIZE,
            None => true,
        }
    }

    pub fn serialized_size(&self) -> usize {
        let mut size = 32 + 1;
        if let Some(nft) = self.nft() {
            if !nft.commitment.is_empty() {
                size += varint_size(nft.commitment.len() as u64) + nft.commitment.len();
            }
        }
        if let Some(amount) = self.amount() {
            size += varint_size(amount);
        }
        size
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_hash(&self.id);
        sink.write_byte(self.bitfield());
        if let Some(nft) = self.nft() {
            if !nft.commitment.is_empty() {
                sink.write_sized_bytes(&nft.commitment);
            }
        }
        if let Some(amount) = self.amount() {
            sink.write_variable(amount);
        }
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.serialized_size());
        self.write_data(&mut data);
        data
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        let id = source.read_hash()?;
        let bits = source.read_byte()?;

        if let Err(reason) = check_bitfield(bits) {
            return source.fail(DomainError::MalformedField(format!(
                "token bitfield {:#04x}: {}",
                bits, reason
            )));
        }

        let nft = if bits & HAS_NFT != 0 {
            let commitment = if bits & HAS_COMMITMENT != 0 {
                let commitment = source.read_sized_bytes(MAX_COMMITMENT_SIZE)?;
                if commitment.is_empty() {
                    return source.fail(DomainError::MalformedField(
                        "token commitment flagged but empty".to_string(),
                    ));
                }
                commitment
            } else {
                Vec::new()
            };
            // validated by check_bitfield
            let capability =
                Capability::from_nibble(bits & CAPABILITY_MASK).unwrap_or_default();
            Some(NonFungible {
                capability,
                commitment,
            })
        } else {
            None
        };

        let amount = if bits & HAS_AMOUNT != 0 {
            Some(source.read_variable()?)
        } else {
            None
        };

        let payload = match (amount, nft) {
            (Some(amount), Some(nft)) => TokenPayload::Both { amount, nft },
            (Some(amount), None) => TokenPayload::Fungible { amount },
            (None, Some(nft)) => TokenPayload::NonFungible(nft),
            (None, None) => {
                return source.fail(DomainError::MalformedField(
                    "token carries neither amount nor nft".to_string(),
                ))
            }
        };

        Ok(Self { id, payload })
    }
}

fn check_bitfield(bits: u8) -> std::result::Result<(), &'static str> {
    if bits & RESERVED != 0 {
        return Err("reserved bit set");
    }
    if bits & (HAS_AMOUNT | HAS_NFT) == 0 {
        return Err("no token structure");
    }
    let capability = bits & CAPABILITY_MASK;
    if capability > Capability::Minting as u8 {
        return Err("unknown capability");
    }
    if bits & HAS_NFT == 0 && (capability != 0 || bits & HAS_COMMITMENT != 0) {
        return Err("nft fields without nft");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SliceReader;

    fn decode(data: &[u8]) -> Result<TokenData> {
        TokenData::from_data(&mut SliceReader::new(data))
    }

    #[test]
    fn test_fungible_layout() {
        let token = TokenData::fungible([0x11; 32], 1000);
        let data = token.to_data();
        assert_eq!(data.len(), token.serialized_size());
        assert_eq!(data[32], 0x10);
        assert_eq!(&data[33..], &[0xfd, 0xe8, 0x03]);
        assert_eq!(decode(&data).unwrap(), token);
    }

    #[test]
    fn test_nft_with_commitment() {
        let token = TokenData {
            id: [0x22; 32],
            payload: TokenPayload::Both {
                amount: 5,
                nft: NonFungible {
                    capability: Capability::Minting,
                    commitment: vec![0xaa, 0xbb],
                },
            },
        };
        let data = token.to_data();
        assert_eq!(data[32], 0x72);
        // commitment precedes the amount
        assert_eq!(&data[33..], &[0x02, 0xaa, 0xbb, 0x05]);
        assert_eq!(decode(&data).unwrap(), token);
        assert!(token.is_valid());
    }

    #[test]
    fn test_bare_nft() {
        let token = TokenData::non_fungible([0x33; 32], Capability::Mutable, vec![]);
        let data = token.to_data();
        assert_eq!(data.len(), 33);
        assert_eq!(data[32], 0x21);
        assert_eq!(decode(&data).unwrap(), token);
    }

    #[test]
    fn test_invalid_bitfields() {
        for bits in [0x80u8, 0x00, 0x23, 0x11, 0x50, 0x0f] {
            let mut data = vec![0u8; 32];
            data.push(bits);
            data.push(0x01);
            assert!(
                matches!(decode(&data), Err(DomainError::MalformedField(_))),
                "bitfield {:#04x}",
                bits
            );
        }
    }

    #[test]
    fn test_commitment_limit() {
        let mut data = vec![0u8; 32];
        data.push(HAS_NFT | HAS_COMMITMENT);
        data.push(41);
        data.extend_from_slice(&[0u8; 41]);
        assert!(matches!(decode(&data), Err(DomainError::MalformedField(_))));
    }

    #[test]
    fn test_validity() {
        assert!(!TokenData::fungible([0; 32], 0).is_valid());
        assert!(!TokenData::fungible([0; 32], u64::MAX).is_valid());
        assert!(TokenData::fungible([0; 32], MAX_TOKEN_AMOUNT).is_valid());
        let oversized = TokenData::non_fungible([0; 32], Capability::None, vec![0; 41]);
        assert!(!oversized.is_valid());
    }
}
