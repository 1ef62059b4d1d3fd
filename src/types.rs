//! Core chain types shared by the codec, wallet and overlay layers

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::point::Point;

/// Hash type: 256-bit digest in internal (little-endian) byte order
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// All-zero hash, used as the "no hash" marker on the wire
pub const NULL_HASH: Hash = [0u8; 32];

/// Render a hash in display order (byte-reversed hex)
pub fn encode_hash(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Parse a display-order hex hash back into internal byte order
pub fn decode_hash(text: &str) -> Result<Hash> {
    let bytes = hex::decode(text)
        .map_err(|e| DomainError::MalformedField(format!("hash hex: {}", e)))?;
    let mut hash: Hash = bytes.try_into().map_err(|bytes: Vec<u8>| {
        DomainError::MalformedField(format!("hash length {} != 32", bytes.len()))
    })?;
    hash.reverse();
    Ok(hash)
}

/// Transaction input spending a previous output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: Point,
    pub script_sig: ByteString,
    pub sequence: u32,
}

/// Transaction output: value in satoshis and the raw locking script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: u64,
    pub script_pubkey: ByteString,
}

/// Transaction as seen by this layer
///
/// Only the shape needed at the boundary is modelled here; parsing and
/// validating full transactions belongs to the chain model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

/// Read-only access to a transaction's outputs.
///
/// Implemented by whatever transaction representation the chain model owns.
/// The overlay extractor only ever needs the raw script bytes of each output.
pub trait TransactionView {
    fn output_count(&self) -> usize;

    fn output_script(&self, index: usize) -> Option<&[u8]>;

    fn output_scripts(&self) -> OutputScripts<'_, Self>
    where
        Self: Sized,
    {
        OutputScripts { view: self, next: 0 }
    }
}

/// Iterator over the raw output scripts of a [`TransactionView`]
pub struct OutputScripts<'a, T: TransactionView> {
    view: &'a T,
    next: usize,
}

impl<'a, T: TransactionView> Iterator for OutputScripts<'a, T> {
    type Item = &'a [u8];

    /// Outputs the view cannot resolve are skipped.
    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.view.output_count() {
            let index = self.next;
            self.next += 1;
            if let Some(script) = self.view.output_script(index) {
                return Some(script);
            }
        }
        None
    }
}

impl TransactionView for Transaction {
    fn output_count(&self) -> usize {
        self.outputs.len()
    }

    fn output_script(&self, index: usize) -> Option<&[u8]> {
        self.outputs.get(index).map(|output| output.script_pubkey.as_slice())
    }
}
