//! Message heading: the 24-byte envelope in front of every payload

use crate::codec::{sha256d, Reader, Writer};
use crate::constants::COMMAND_SIZE;
use crate::error::Result;

/// First four bytes of the payload's double SHA-256, little-endian
pub fn checksum(payload: &[u8]) -> u32 {
    let digest = sha256d(payload);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub magic: u32,
    pub command: String,
    pub payload_size: u32,
    pub checksum: u32,
}

impl Heading {
    pub const SERIALIZED_SIZE: usize = 4 + COMMAND_SIZE + 4 + 4;

    pub fn new(magic: u32, command: &str, payload: &[u8]) -> Self {
        Self {
            magic,
            command: command.to_string(),
            payload_size: payload.len() as u32,
            checksum: checksum(payload),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.command.is_empty() && self.command.len() <= COMMAND_SIZE
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_u32_le(self.magic);
        sink.write_fixed_string(&self.command, COMMAND_SIZE);
        sink.write_u32_le(self.payload_size);
        sink.write_u32_le(self.checksum);
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SERIALIZED_SIZE);
        self.write_data(&mut data);
        data
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        Ok(Self {
            magic: source.read_u32_le()?,
            command: source.read_fixed_string(COMMAND_SIZE)?,
            payload_size: source.read_u32_le()?,
            checksum: source.read_u32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SliceReader;

    #[test]
    fn test_empty_payload_checksum() {
        // sha256d("") = 5df6e0e2...
        assert_eq!(checksum(&[]), 0xe2e0_f65d);
    }

    #[test]
    fn test_heading_layout() {
        let heading = Heading::new(0xd9b4_bef9, "verack", &[]);
        let data = heading.to_data();
        assert_eq!(data.len(), Heading::SERIALIZED_SIZE);
        assert_eq!(&data[..4], &[0xf9, 0xbe, 0xb4, 0xd9]);
        assert_eq!(&data[4..16], b"verack\0\0\0\0\0\0");
        assert_eq!(&data[16..20], &[0, 0, 0, 0]);
        assert_eq!(&data[20..], &[0x5d, 0xf6, 0xe0, 0xe2]);

        let parsed = Heading::from_data(&mut SliceReader::new(&data)).unwrap();
        assert_eq!(parsed, heading);
        assert!(parsed.is_valid());
    }
}
