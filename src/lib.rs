//! # Chain-Domain
//!
//! Binary representation and consensus numerics of a Bitcoin-family node.
//!
//! This crate provides the pure, side-effect-free layer shared by validation,
//! wallet and networking components: how data is encoded on the wire, how
//! proof of work targets are compressed, and how unspent outputs are combined
//! and selected. It does not decide what is valid.
//!
//! ## Architecture
//!
//! Modules in dependency order, leaves first:
//! - `codec`: reader/writer contract (integers, varints, byte runs, strings)
//! - `pow`: 256-bit targets and the compact ("nBits") encoding
//! - `point`, `token`: output references, valued sets, UTXOs and token data
//! - `selection`: deterministic coin selection
//! - `network`: wire messages, heading and frame dispatch
//! - `keoken`: token overlay carried in null-data outputs
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every operation is deterministic and synchronous
//! 2. **Explicit Parameters**: network identity is passed in, never global
//! 3. **Total Decoding**: malformed input is an error value, never a panic
//! 4. **Exact Version Pinning**: consensus-critical hashing pinned to exact versions
//!
//! ## Usage
//!
//! ```rust
//! use chain_domain::{Domain, NetworkParameters, SelectionAlgorithm};
//! use chain_domain::point::{Point, PointValue, PointsValue};
//!
//! let domain = Domain::new(NetworkParameters::mainnet());
//! let unspent: PointsValue = [10u64, 25, 40]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &value)| PointValue::new(Point::new([i as u8; 32], 0), value))
//!     .collect();
//!
//! let selected = domain.select_outputs(&unspent, 25, SelectionAlgorithm::Greedy);
//! assert_eq!(selected.total().unwrap(), 25);
//! ```

pub mod codec;
pub mod constants;
pub mod error;
pub mod header;
pub mod keoken;
pub mod network;
pub mod params;
pub mod point;
pub mod pow;
pub mod selection;
pub mod token;
pub mod types;

// Re-export commonly used types
pub use codec::{Reader, SliceReader, StreamReader, Writer};
pub use error::{DomainError, Result};
pub use header::BlockHeader;
pub use network::{NetworkMessage, Negotiated, WireMessage};
pub use params::NetworkParameters;
pub use point::{Point, PointValue, PointsValue, Utxo, UtxoIndexSnapshot};
pub use pow::{CompactTarget, U256};
pub use selection::SelectionAlgorithm;
pub use token::TokenData;
pub use types::*;

/// Domain layer bound to one network
///
/// # Examples
///
/// ```
/// use chain_domain::{Domain, NetworkParameters};
///
/// let domain = Domain::new(NetworkParameters::regtest());
/// assert_eq!(domain.params().cashaddr_prefix, "bchreg");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Domain {
    params: NetworkParameters,
}

impl Domain {
    pub fn new(params: NetworkParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &NetworkParameters {
        &self.params
    }

    /// Check a header's proof of work against this network's limit
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_domain::{BlockHeader, Domain, DomainError};
    ///
    /// let domain = Domain::default();
    /// let header = BlockHeader { bits: 0x0492_3456, ..BlockHeader::default() };
    /// assert_eq!(
    ///     domain.check_proof_of_work(&header),
    ///     Err(DomainError::TargetOverflow(0x0492_3456))
    /// );
    /// ```
    pub fn check_proof_of_work(&self, header: &BlockHeader) -> Result<bool> {
        pow::check_proof_of_work(header, self.params.pow_limit)
    }

    pub fn select_outputs(
        &self,
        unspent: &PointsValue,
        minimum_value: u64,
        algorithm: SelectionAlgorithm,
    ) -> PointsValue {
        selection::select_outputs(unspent, minimum_value, algorithm)
    }

    /// Serialize a message with its heading
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_domain::{Domain, NetworkMessage, SliceReader};
    /// use chain_domain::constants::level;
    /// use chain_domain::network::Ping;
    ///
    /// let domain = Domain::default();
    /// let message = NetworkMessage::from(Ping { nonce: 9 });
    /// let frame = domain.to_frame(&message, level::MAXIMUM);
    ///
    /// let parsed = domain.from_frame(&mut SliceReader::new(&frame), level::MAXIMUM).unwrap();
    /// assert_eq!(parsed, message);
    /// ```
    pub fn to_frame(&self, message: &NetworkMessage, version: u32) -> Vec<u8> {
        message.to_frame(&self.params, version)
    }

    pub fn from_frame<R: Reader>(&self, source: &mut R, version: u32) -> Result<NetworkMessage> {
        NetworkMessage::from_frame(source, &self.params, version)
    }

    /// Decode the first overlay message carried by a transaction, if any
    pub fn keoken_message<T: TransactionView>(&self, tx: &T) -> Option<Result<keoken::KeokenMessage>> {
        keoken::first_output_payload(tx).map(|payload| keoken::KeokenMessage::from_payload(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keoken::{KeokenMessage, SendTokens};

    #[test]
    fn test_keoken_message_from_transaction() {
        let message = KeokenMessage::SendTokens(SendTokens {
            asset_id: 3,
            amount: 12,
        });
        let tx = Transaction {
            version: 2,
            inputs: vec![],
            outputs: vec![TransactionOutput {
                value: 0,
                script_pubkey: message.to_script(),
            }],
            lock_time: 0,
        };

        let domain = Domain::default();
        assert_eq!(domain.keoken_message(&tx), Some(Ok(message)));

        let plain = Transaction {
            outputs: vec![],
            ..tx
        };
        assert_eq!(domain.keoken_message(&plain), None);
    }

    #[test]
    fn test_default_is_mainnet() {
        assert_eq!(Domain::default().params(), &NetworkParameters::mainnet());
    }
}
