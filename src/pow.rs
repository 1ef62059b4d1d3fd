//! Proof of work numerics: 256-bit targets and their compact encoding

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use crate::codec::{Reader, Writer};
use crate::error::{DomainError, Result};
use crate::header::BlockHeader;

const EXPONENT_BYTE: u32 = 0xff00_0000;
const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MAX: u32 = !(EXPONENT_BYTE | SIGN_BIT);
const MANTISSA_BITS: u32 = 24;

/// 256-bit unsigned integer for target arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u64; 4]); // little-endian limbs

impl U256 {
    pub const ZERO: U256 = U256([0; 4]);
    pub const MAX: U256 = U256([u64::MAX; 4]);

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn from_u32(value: u32) -> Self {
        U256([u64::from(value), 0, 0, 0])
    }

    pub fn from_u64(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&x| x == 0)
    }

    /// Lowest 64 bits
    pub fn low_u64(&self) -> u64 {
        self.0[0]
    }

    /// Minimal number of bytes needed to represent the value (0 for zero)
    pub fn byte_len(&self) -> usize {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                let bits = 64 * i + (64 - self.0[i].leading_zeros() as usize);
                return (bits + 7) / 8;
            }
        }
        0
    }

    pub fn shl(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::zero();
        }

        let mut result = U256::zero();
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in 0..4 {
            if i + word_shift < 4 {
                result.0[i + word_shift] |= self.0[i] << bit_shift;
                if bit_shift > 0 && i + word_shift + 1 < 4 {
                    result.0[i + word_shift + 1] |= self.0[i] >> (64 - bit_shift);
                }
            }
        }

        result
    }

    pub fn shr(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::zero();
        }

        let mut result = U256::zero();
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in word_shift..4 {
            result.0[i - word_shift] |= self.0[i] >> bit_shift;
            if bit_shift > 0 && i - word_shift >= 1 {
                result.0[i - word_shift - 1] |= self.0[i] << (64 - bit_shift);
            }
        }

        result
    }

    /// Interpret 32 bytes as a little-endian number (hash byte order)
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (i, word) in words.iter_mut().enumerate() {
            let mut limb = [0u8; 8];
            limb.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *word = u64::from_le_bytes(limb);
        }
        U256(words)
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, &word) in self.0.iter().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut reversed = *bytes;
        reversed.reverse();
        Self::from_le_bytes(&reversed)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = self.to_le_bytes();
        bytes.reverse();
        bytes
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256::from_u64(value)
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().rev().zip(other.0.iter().rev()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_be_bytes()))
    }
}

/// Compact ("nBits") representation of a 256-bit target
///
/// The 32-bit word is `exponent:u8 | mantissa:u24`. Bit 23 of the mantissa is
/// a sign bit inherited from a signed implementation; a set sign bit with a
/// non-zero mantissa, or an exponent that pushes the mantissa past 256 bits,
/// marks the value as overflowed and floors it to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactTarget {
    raw: u32,
    normalized: u32,
    big: U256,
    overflowed: bool,
}

impl CompactTarget {
    /// Decode a 32-bit compact value.
    pub fn from_compact(raw: u32) -> Self {
        let (big, overflowed) = decode_compact(raw);
        if overflowed {
            trace!(compact = format_args!("{:#010x}", raw), "compact target overflowed");
        }
        Self {
            raw,
            normalized: encode_compact(&big),
            big,
            overflowed,
        }
    }

    /// Encode a 256-bit target.
    pub fn from_big(big: U256) -> Self {
        let normalized = encode_compact(&big);
        Self {
            raw: normalized,
            normalized,
            big,
            overflowed: false,
        }
    }

    /// The word this value was constructed from
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Consensus-normalized encoding of [`Self::big`]
    pub fn normalized(&self) -> u32 {
        self.normalized
    }

    pub fn big(&self) -> &U256 {
        &self.big
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// The target, or `TargetOverflow` if decoding hit the invalid condition.
    pub fn checked_big(&self) -> Result<&U256> {
        if self.overflowed {
            return Err(DomainError::TargetOverflow(self.raw));
        }
        Ok(&self.big)
    }

    /// Write the raw word as 4 big-endian bytes.
    pub fn to_data<W: Writer>(&self, sink: &mut W) {
        sink.write_u32_be(self.raw);
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        Ok(Self::from_compact(source.read_u32_be()?))
    }
}

impl From<u32> for CompactTarget {
    fn from(raw: u32) -> Self {
        CompactTarget::from_compact(raw)
    }
}

fn log_256(mantissa: u32) -> u32 {
    if mantissa > 0x0000_ffff {
        3
    } else if mantissa > 0x0000_00ff {
        2
    } else if mantissa > 0 {
        1
    } else {
        0
    }
}

/// ExpandCompact: ℕ₃₂ → (ℕ₂₅₆, overflowed)
pub fn decode_compact(compact: u32) -> (U256, bool) {
    let mantissa = compact & MANTISSA_MAX;
    let exponent = compact >> MANTISSA_BITS;

    // Negative targets are invalid and never produce a value.
    if compact & SIGN_BIT != 0 {
        return (U256::zero(), mantissa != 0);
    }

    if exponent <= 3 {
        let shifted = mantissa >> (8 * (3 - exponent));
        return (U256::from_u32(shifted), false);
    }

    // The exponent field can address more than 32 bytes.
    if mantissa != 0 && exponent > 32 + 3 - log_256(mantissa) {
        return (U256::zero(), true);
    }

    (U256::from_u32(mantissa).shl(8 * (exponent - 3)), false)
}

/// CompressTarget: ℕ₂₅₆ → ℕ₃₂
pub fn encode_compact(big: &U256) -> u32 {
    // At most 32, so the exponent byte cannot overflow.
    let mut size = big.byte_len() as u32;

    let mut mantissa = if size <= 3 {
        (big.low_u64() << (8 * (3 - size))) as u32
    } else {
        big.shr(8 * (size - 3)).low_u64() as u32
    };

    // A set top bit would read back as a sign; move it into the exponent.
    if mantissa & SIGN_BIT != 0 {
        mantissa >>= 8;
        size += 1;
    }

    (size << MANTISSA_BITS) | mantissa
}

/// CheckProofOfWork: ℋ × ℕ₃₂ → {true, false}
///
/// The header's hash, read as a little-endian number, must not exceed the
/// target encoded in `header.bits`, and that target must be non-zero and
/// within the network's proof of work limit.
pub fn check_proof_of_work(header: &BlockHeader, pow_limit: u32) -> Result<bool> {
    let target = CompactTarget::from_compact(header.bits);
    let target = *target.checked_big()?;
    let limit = CompactTarget::from_compact(pow_limit);

    if target.is_zero() || target > *limit.big() {
        return Ok(false);
    }

    let hash_value = U256::from_le_bytes(&header.hash());
    Ok(hash_value <= target)
}
