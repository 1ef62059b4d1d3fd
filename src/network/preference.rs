//! Relay preference announcements: fee filter and compact block mode

use crate::codec::{Reader, Writer};
use crate::constants::level;
use crate::error::{DomainError, Result};

use super::WireMessage;

/// Minimum fee rate (satoshis per kilobyte) for relayed transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeFilter {
    pub minimum_fee: u64,
}

impl WireMessage for FeeFilter {
    const COMMAND: &'static str = "feefilter";
    const VERSION_MINIMUM: u32 = level::BIP133;

    fn serialized_size(&self, _version: u32) -> usize {
        8
    }

    fn write_data<W: Writer>(&self, sink: &mut W, _version: u32) {
        sink.write_u64_le(self.minimum_fee);
    }

    fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
        Ok(Self {
            minimum_fee: source.read_u64_le()?,
        })
    }
}

/// Compact block relay preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendCompact {
    /// Mode byte: announce blocks without an inv round trip
    pub high_bandwidth: bool,
    pub version: u64,
}

impl WireMessage for SendCompact {
    const COMMAND: &'static str = "sendcmpct";
    const VERSION_MINIMUM: u32 = level::BIP152;

    fn serialized_size(&self, _version: u32) -> usize {
        1 + 8
    }

    fn write_data<W: Writer>(&self, sink: &mut W, _version: u32) {
        sink.write_byte(u8::from(self.high_bandwidth));
        sink.write_u64_le(self.version);
    }

    fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
        let mode = source.read_byte()?;
        if mode > 1 {
            return source.fail(DomainError::MalformedField(format!(
                "sendcmpct mode {}",
                mode
            )));
        }
        Ok(Self {
            high_bandwidth: mode == 1,
            version: source.read_u64_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SliceReader;

    #[test]
    fn test_send_compact_layout() {
        let message = SendCompact {
            high_bandwidth: true,
            version: 1,
        };
        let data = message.to_data(level::BIP152);
        assert_eq!(data, vec![1, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            SendCompact::from_data(&mut SliceReader::new(&data), level::BIP152),
            Ok(message)
        );
    }

    #[test]
    fn test_send_compact_rejects_mode() {
        let data = [2u8, 1, 0, 0, 0, 0, 0, 0, 0];
        let result = SendCompact::from_data(&mut SliceReader::new(&data), level::BIP152);
        assert!(matches!(result, Err(DomainError::MalformedField(_))));
    }

    #[test]
    fn test_fee_filter_gated_by_bip133() {
        let data = FeeFilter { minimum_fee: 1000 }.to_data(level::BIP133);
        assert!(FeeFilter::from_data(&mut SliceReader::new(&data), level::BIP130).is_err());
        assert_eq!(
            FeeFilter::from_data(&mut SliceReader::new(&data), level::BIP133),
            Ok(FeeFilter { minimum_fee: 1000 })
        );
    }
}
