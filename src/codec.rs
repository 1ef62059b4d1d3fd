//! Byte codec contract shared by every wire and chain structure
//!
//! A [`Reader`] extracts fixed-width integers, varints, byte runs and strings
//! sequentially and fails with [`DomainError::TruncatedInput`] once it runs out
//! of bytes. Failure is sticky: after the first error the reader never yields
//! another value, so composite decoders can chain reads with `?` and callers
//! can still ask [`Reader::is_valid`] afterwards.
//!
//! A [`Writer`] mirrors every reader primitive and has no failure path; writers
//! target growable buffers or hash engines.
//!
//! Varint layout (little-endian payloads, minimal encoding only):
//!
//! | value range              | bytes                 |
//! |--------------------------|-----------------------|
//! | `< 0xfd`                 | 1                     |
//! | `<= 0xffff`              | `0xfd` + 2            |
//! | `<= 0xffff_ffff`         | `0xfe` + 4            |
//! | otherwise                | `0xff` + 8            |

use std::io::{self, Read};

use sha2::{Digest, Sha256};

use crate::error::{DomainError, Result};
use crate::types::Hash;

/// Encoded length of `value` as a varint
pub fn varint_size(value: u64) -> usize {
    if value < 0xfd {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Double SHA-256 of `data`
pub fn sha256d(data: &[u8]) -> Hash {
    let mut writer = HashWriter::new();
    writer.write_bytes(data);
    writer.finish()
}

/// Sequential, fallible byte source
pub trait Reader {
    /// Fill `out` completely or fail, leaving the reader invalid.
    fn read_exact_into(&mut self, out: &mut [u8]) -> Result<()>;

    /// False once any read has failed or the reader was invalidated.
    fn is_valid(&self) -> bool;

    /// Force the failed state.
    fn invalidate(&mut self);

    /// Bytes left to read, when the source can tell.
    fn remaining(&self) -> Option<usize> {
        None
    }

    /// Invalidate and return `error`.
    fn fail<T>(&mut self, error: DomainError) -> Result<T>
    where
        Self: Sized,
    {
        self.invalidate();
        Err(error)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact_into(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact_into(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u16_be(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact_into(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_into(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u32_be(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_into(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn read_u64_le(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact_into(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_u64_be(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact_into(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    fn read_i64_be(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact_into(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_hash(&mut self) -> Result<Hash> {
        let mut hash = [0u8; 32];
        self.read_exact_into(&mut hash)?;
        Ok(hash)
    }

    /// Read a raw run of `count` bytes.
    fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>>
    where
        Self: Sized,
    {
        if let Some(remaining) = self.remaining() {
            if count > remaining {
                return self.fail(DomainError::TruncatedInput(format!(
                    "needed {} bytes, {} remaining",
                    count, remaining
                )));
            }
        }
        let mut bytes = vec![0u8; count];
        self.read_exact_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Read a varint, rejecting encodings longer than the value requires.
    fn read_variable(&mut self) -> Result<u64>
    where
        Self: Sized,
    {
        let prefix = self.read_byte()?;
        let (value, minimum) = match prefix {
            0xff => (self.read_u64_le()?, 0x1_0000_0000),
            0xfe => (u64::from(self.read_u32_le()?), 0x1_0000),
            0xfd => (u64::from(self.read_u16_le()?), 0xfd),
            small => return Ok(u64::from(small)),
        };

        if value < minimum {
            return self.fail(DomainError::MalformedField(format!(
                "non-canonical varint {:#x} with prefix {:#04x}",
                value, prefix
            )));
        }

        Ok(value)
    }

    /// Read a varint element count bounded by `maximum`.
    fn read_size(&mut self, maximum: usize) -> Result<usize>
    where
        Self: Sized,
    {
        let count = self.read_variable()?;
        match usize::try_from(count) {
            Ok(count) if count <= maximum => Ok(count),
            _ => self.fail(DomainError::MalformedField(format!(
                "count {} exceeds limit {}",
                count, maximum
            ))),
        }
    }

    /// Read a varint length prefix followed by that many bytes.
    fn read_sized_bytes(&mut self, maximum: usize) -> Result<Vec<u8>>
    where
        Self: Sized,
    {
        let length = self.read_size(maximum)?;
        if let Some(remaining) = self.remaining() {
            if length > remaining {
                return self.fail(DomainError::MalformedField(format!(
                    "length {} exceeds {} remaining bytes",
                    length, remaining
                )));
            }
        }
        self.read_bytes(length)
    }

    /// Read a varint-prefixed UTF-8 string.
    fn read_string(&mut self, maximum: usize) -> Result<String>
    where
        Self: Sized,
    {
        let bytes = self.read_sized_bytes(maximum)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(_) => self.fail(DomainError::MalformedField(
                "string is not valid UTF-8".to_string(),
            )),
        }
    }

    /// Read a fixed-width field, keeping the bytes before the first null.
    fn read_fixed_string(&mut self, width: usize) -> Result<String>
    where
        Self: Sized,
    {
        let bytes = self.read_bytes(width)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        match std::str::from_utf8(&bytes[..end]) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => self.fail(DomainError::MalformedField(
                "fixed string is not valid UTF-8".to_string(),
            )),
        }
    }

    /// Read bytes up to a null terminator.
    ///
    /// Returns `Ok(None)` when `maximum` is zero. Fails with `TruncatedInput`
    /// when `maximum` bytes pass without a terminator.
    fn read_null_terminated_string(&mut self, maximum: usize) -> Result<Option<String>>
    where
        Self: Sized,
    {
        if maximum == 0 {
            return Ok(None);
        }

        let mut bytes = Vec::new();
        loop {
            let byte = self.read_byte()?;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
            if bytes.len() >= maximum {
                return self.fail(DomainError::TruncatedInput(format!(
                    "no terminator within {} bytes",
                    maximum
                )));
            }
        }

        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(_) => self.fail(DomainError::MalformedField(
                "string is not valid UTF-8".to_string(),
            )),
        }
    }
}

/// Sequential byte sink. Appends cannot fail.
pub trait Writer {
    fn write_bytes(&mut self, bytes: &[u8]);

    fn write_byte(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    fn write_u16_le(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_u16_be(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_u32_be(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_u64_le(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_u64_be(&mut self, value: u64) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_i64_be(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    fn write_hash(&mut self, hash: &Hash) {
        self.write_bytes(hash);
    }

    fn write_variable(&mut self, value: u64) {
        if value < 0xfd {
            self.write_byte(value as u8);
        } else if value <= 0xffff {
            self.write_byte(0xfd);
            self.write_u16_le(value as u16);
        } else if value <= 0xffff_ffff {
            self.write_byte(0xfe);
            self.write_u32_le(value as u32);
        } else {
            self.write_byte(0xff);
            self.write_u64_le(value);
        }
    }

    fn write_size(&mut self, size: usize) {
        self.write_variable(size as u64);
    }

    fn write_sized_bytes(&mut self, bytes: &[u8]) {
        self.write_size(bytes.len());
        self.write_bytes(bytes);
    }

    fn write_string(&mut self, text: &str) {
        self.write_sized_bytes(text.as_bytes());
    }

    /// Write `text` into a null-padded field of `width` bytes, truncating.
    fn write_fixed_string(&mut self, text: &str, width: usize) {
        let bytes = text.as_bytes();
        let used = bytes.len().min(width);
        self.write_bytes(&bytes[..used]);
        for _ in used..width {
            self.write_byte(0);
        }
    }

    fn write_null_terminated_string(&mut self, text: &str) {
        self.write_bytes(text.as_bytes());
        self.write_byte(0);
    }
}

impl Writer for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Buffer-backed reader over a byte slice
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    position: usize,
    valid: bool,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            valid: true,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// True when every byte was consumed without failure.
    pub fn is_exhausted(&self) -> bool {
        self.valid && self.position == self.data.len()
    }

    /// Unread bytes, empty once the reader failed.
    pub fn rest(&self) -> &'a [u8] {
        if self.valid {
            &self.data[self.position..]
        } else {
            &[]
        }
    }
}

impl Reader for SliceReader<'_> {
    fn read_exact_into(&mut self, out: &mut [u8]) -> Result<()> {
        if !self.valid {
            return Err(DomainError::TruncatedInput(
                "reader already failed".to_string(),
            ));
        }

        let remaining = self.data.len() - self.position;
        if out.len() > remaining {
            self.valid = false;
            return Err(DomainError::TruncatedInput(format!(
                "needed {} bytes, {} remaining",
                out.len(),
                remaining
            )));
        }

        let end = self.position + out.len();
        out.copy_from_slice(&self.data[self.position..end]);
        self.position = end;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }

    fn remaining(&self) -> Option<usize> {
        if self.valid {
            Some(self.data.len() - self.position)
        } else {
            Some(0)
        }
    }
}

/// Streaming reader over any [`std::io::Read`]
#[derive(Debug)]
pub struct StreamReader<R: Read> {
    inner: R,
    valid: bool,
}

impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, valid: true }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Reader for StreamReader<R> {
    fn read_exact_into(&mut self, out: &mut [u8]) -> Result<()> {
        if !self.valid {
            return Err(DomainError::TruncatedInput(
                "reader already failed".to_string(),
            ));
        }

        if let Err(error) = self.inner.read_exact(out) {
            self.valid = false;
            return Err(match error.kind() {
                io::ErrorKind::UnexpectedEof => DomainError::TruncatedInput(format!(
                    "stream ended before {} bytes",
                    out.len()
                )),
                _ => DomainError::TruncatedInput(format!("stream error: {}", error)),
            });
        }

        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// Writer that streams bytes into a double SHA-256 digest
#[derive(Clone, Default)]
pub struct HashWriter {
    engine: Sha256,
}

impl HashWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// SHA256(SHA256(bytes written so far))
    pub fn finish(self) -> Hash {
        let first = self.engine.finalize();
        let second = Sha256::digest(first);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&second);
        hash
    }
}

impl Writer for HashWriter {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.engine.update(bytes);
    }
}
