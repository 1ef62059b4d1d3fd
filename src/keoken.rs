//! Keoken token overlay carried in null-data outputs
//!
//! An overlay output script is `OP_RETURN <push 4: 00 00 4B 50> <push payload>`.
//! The payload starts with a header (version u16, type u16, both big-endian)
//! followed by the message body.

use tracing::trace;

use crate::codec::{Reader, SliceReader, Writer};
use crate::error::{DomainError, Result};
use crate::types::TransactionView;

/// Protocol marker: `"\0\0KP"`
pub const KEOKEN_MAGIC: [u8; 4] = [0x00, 0x00, 0x4b, 0x50];

/// Maximum asset name length including the terminator
pub const MAX_NAME_SIZE: usize = 33;
pub const MIN_NAME_SIZE: usize = 1;

const OP_RETURN: u8 = 0x6a;
const OP_PUSH_SIZE_4: u8 = 0x04;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

/// Return the bytes following the magic in the first output whose script
/// starts with [`KEOKEN_MAGIC`].
pub fn extract<T: TransactionView>(tx: &T) -> Option<Vec<u8>> {
    tx.output_scripts()
        .find(|script| script.starts_with(&KEOKEN_MAGIC))
        .map(|script| script[KEOKEN_MAGIC.len()..].to_vec())
}

/// Return the payload pushed by an overlay null-data script.
pub fn extract_from_script(script: &[u8]) -> Option<Vec<u8>> {
    let mut reader = SliceReader::new(script);
    if reader.read_byte().ok()? != OP_RETURN || reader.read_byte().ok()? != OP_PUSH_SIZE_4 {
        return None;
    }
    if reader.read_bytes(KEOKEN_MAGIC.len()).ok()? != KEOKEN_MAGIC {
        return None;
    }

    let opcode = reader.read_byte().ok()?;
    let length = match opcode {
        OP_PUSH_SIZE_4..=0x4b => opcode as usize,
        OP_PUSHDATA1 => reader.read_byte().ok()? as usize,
        OP_PUSHDATA2 => reader.read_u16_le().ok()? as usize,
        OP_PUSHDATA4 => reader.read_u32_le().ok()? as usize,
        _ => {
            trace!(opcode, "overlay payload push out of range");
            return None;
        }
    };
    reader.read_bytes(length).ok()
}

/// First overlay payload among the transaction's null-data outputs
pub fn first_output_payload<T: TransactionView>(tx: &T) -> Option<Vec<u8>> {
    tx.output_scripts().find_map(extract_from_script)
}

/// Build the null-data script carrying `payload`.
pub fn to_script(payload: &[u8]) -> Vec<u8> {
    let mut script = vec![OP_RETURN, OP_PUSH_SIZE_4];
    script.extend_from_slice(&KEOKEN_MAGIC);
    match payload.len() {
        n if n <= 0x4b => script.push(n as u8),
        n if n <= 0xff => {
            script.push(OP_PUSHDATA1);
            script.push(n as u8);
        }
        n if n <= 0xffff => {
            script.push(OP_PUSHDATA2);
            script.write_u16_le(n as u16);
        }
        n => {
            script.push(OP_PUSHDATA4);
            script.write_u32_le(n as u32);
        }
    }
    script.extend_from_slice(payload);
    script
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeokenHeader {
    pub version: u16,
    pub kind: u16,
}

impl KeokenHeader {
    pub const SERIALIZED_SIZE: usize = 4;

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_u16_be(self.version);
        sink.write_u16_be(self.kind);
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        Ok(Self {
            version: source.read_u16_be()?,
            kind: source.read_u16_be()?,
        })
    }
}

/// Issue a new asset with an initial supply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateAsset {
    pub name: String,
    pub amount: i64,
}

impl CreateAsset {
    pub const VERSION: u16 = 0;
    pub const TYPE: u16 = 0;

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.name.len() < MAX_NAME_SIZE && !self.name.contains('\0')
    }

    pub fn serialized_size(&self) -> usize {
        KeokenHeader::SERIALIZED_SIZE + self.name.len() + 1 + 8
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        KeokenHeader {
            version: Self::VERSION,
            kind: Self::TYPE,
        }
        .write_data(sink);
        sink.write_null_terminated_string(&self.name);
        sink.write_i64_be(self.amount);
    }

    fn read_body<R: Reader>(source: &mut R) -> Result<Self> {
        let name = match source.read_null_terminated_string(MAX_NAME_SIZE)? {
            Some(name) if name.len() >= MIN_NAME_SIZE => name,
            _ => {
                return source.fail(DomainError::MalformedField(
                    "asset name is empty".to_string(),
                ))
            }
        };
        Ok(Self {
            name,
            amount: source.read_i64_be()?,
        })
    }
}

/// Move tokens of an existing asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendTokens {
    pub asset_id: u32,
    pub amount: i64,
}

impl SendTokens {
    pub const VERSION: u16 = 0;
    pub const TYPE: u16 = 1;

    pub fn serialized_size(&self) -> usize {
        KeokenHeader::SERIALIZED_SIZE + 4 + 8
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        KeokenHeader {
            version: Self::VERSION,
            kind: Self::TYPE,
        }
        .write_data(sink);
        sink.write_u32_be(self.asset_id);
        sink.write_i64_be(self.amount);
    }

    fn read_body<R: Reader>(source: &mut R) -> Result<Self> {
        Ok(Self {
            asset_id: source.read_u32_be()?,
            amount: source.read_i64_be()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeokenMessage {
    CreateAsset(CreateAsset),
    SendTokens(SendTokens),
}

impl KeokenMessage {
    /// Parse header and body from the bytes following the magic.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let mut reader = SliceReader::new(payload);
        Self::from_data(&mut reader)
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        let header = KeokenHeader::from_data(source)?;
        match (header.version, header.kind) {
            (CreateAsset::VERSION, CreateAsset::TYPE) => {
                CreateAsset::read_body(source).map(KeokenMessage::CreateAsset)
            }
            (SendTokens::VERSION, SendTokens::TYPE) => {
                SendTokens::read_body(source).map(KeokenMessage::SendTokens)
            }
            (version, kind) => source.fail(DomainError::MalformedField(format!(
                "unknown overlay message version {} type {}",
                version, kind
            ))),
        }
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.serialized_size());
        match self {
            KeokenMessage::CreateAsset(message) => message.write_data(&mut data),
            KeokenMessage::SendTokens(message) => message.write_data(&mut data),
        }
        data
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            KeokenMessage::CreateAsset(message) => message.serialized_size(),
            KeokenMessage::SendTokens(message) => message.serialized_size(),
        }
    }

    /// Null-data output script announcing this message
    pub fn to_script(&self) -> Vec<u8> {
        to_script(&self.to_data())
    }
}
