//! Output references, valued references and unspent outputs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{Reader, Writer};
use crate::error::{DomainError, Result};
use crate::token::TokenData;
use crate::types::{encode_hash, Hash, NULL_HASH};

/// Reference to a transaction output: `(transaction hash, output index)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Point {
    hash: Hash,
    index: u32,
}

impl Point {
    pub const SERIALIZED_SIZE: usize = 36;

    /// Index carried by the null point of a coinbase input
    pub const NULL_INDEX: u32 = u32::MAX;

    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// Coinbase prevout: zero hash, maximal index
    pub fn null() -> Self {
        Self::new(NULL_HASH, Self::NULL_INDEX)
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_null(&self) -> bool {
        self.index == Self::NULL_INDEX && self.hash == NULL_HASH
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_hash(&self.hash);
        sink.write_u32_le(self.index);
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SERIALIZED_SIZE);
        self.write_data(&mut data);
        data
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        Ok(Self {
            hash: source.read_hash()?,
            index: source.read_u32_le()?,
        })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", encode_hash(&self.hash), self.index)
    }
}

/// A point together with the value of the output it references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointValue {
    pub point: Point,
    pub value: u64,
}

impl PointValue {
    pub fn new(point: Point, value: u64) -> Self {
        Self { point, value }
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Ordered collection of valued points
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointsValue {
    pub points: Vec<PointValue>,
}

impl PointsValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `(point, amount)` of every UTXO in the snapshot, in order.
    pub fn from_snapshot<S: UtxoIndexSnapshot + ?Sized>(snapshot: &S) -> Self {
        snapshot.utxos().iter().map(PointValue::from).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointValue> {
        self.points.iter()
    }

    /// Sum of all values; fails instead of wrapping.
    pub fn total(&self) -> Result<u64> {
        self.points.iter().try_fold(0u64, |sum, point| {
            sum.checked_add(point.value).ok_or_else(|| {
                DomainError::AmountOverflow(format!(
                    "adding {} to {} exceeds u64",
                    point.value, sum
                ))
            })
        })
    }
}

impl From<Vec<PointValue>> for PointsValue {
    fn from(points: Vec<PointValue>) -> Self {
        Self { points }
    }
}

impl FromIterator<PointValue> for PointsValue {
    fn from_iter<I: IntoIterator<Item = PointValue>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PointsValue {
    type Item = PointValue;
    type IntoIter = std::vec::IntoIter<PointValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointsValue {
    type Item = &'a PointValue;
    type IntoIter = std::slice::Iter<'a, PointValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Unspent transaction output as reported by the UTXO index
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Utxo {
    point: Point,
    amount: u64,
    height: u32,
    token_data: Option<TokenData>,
}

impl Utxo {
    /// Height and token data start empty; set them independently.
    pub fn new(point: Point, amount: u64) -> Self {
        Self {
            point,
            amount,
            height: 0,
            token_data: None,
        }
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn set_point(&mut self, point: Point) {
        self.point = point;
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: u64) {
        self.amount = amount;
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn token_data(&self) -> Option<&TokenData> {
        self.token_data.as_ref()
    }

    pub fn set_token_data(&mut self, token_data: Option<TokenData>) {
        self.token_data = token_data;
    }

    pub fn is_tokenized(&self) -> bool {
        self.token_data.is_some()
    }
}

impl From<&Utxo> for PointValue {
    fn from(utxo: &Utxo) -> Self {
        PointValue::new(utxo.point, utxo.amount)
    }
}

/// Consistent view of the UTXO index at one moment
pub trait UtxoIndexSnapshot {
    fn utxos(&self) -> &[Utxo];
}

impl UtxoIndexSnapshot for [Utxo] {
    fn utxos(&self) -> &[Utxo] {
        self
    }
}

impl UtxoIndexSnapshot for Vec<Utxo> {
    fn utxos(&self) -> &[Utxo] {
        self
    }
}
