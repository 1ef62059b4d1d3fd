//! Messages without a payload

use crate::codec::{Reader, Writer};
use crate::constants::level;
use crate::error::Result;

use super::WireMessage;

macro_rules! signal_message {
    ($(#[$doc:meta])* $name:ident, $command:literal, $minimum:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl WireMessage for $name {
            const COMMAND: &'static str = $command;
            const VERSION_MINIMUM: u32 = $minimum;

            fn serialized_size(&self, _version: u32) -> usize {
                0
            }

            fn write_data<W: Writer>(&self, _sink: &mut W, _version: u32) {}

            fn read_data<R: Reader>(_source: &mut R, _version: u32) -> Result<Self> {
                Ok($name)
            }
        }
    };
}

signal_message!(
    /// Acknowledges a peer's version message
    VerAck, "verack", level::MINIMUM
);

signal_message!(
    /// Requests known peer addresses
    GetAddress, "getaddr", level::MINIMUM
);

signal_message!(
    /// Requests the peer's memory pool inventory
    MemoryPool, "mempool", level::BIP35
);

signal_message!(
    /// Asks the peer to announce new blocks by header
    SendHeaders, "sendheaders", level::BIP130
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SliceReader;
    use crate::error::DomainError;

    #[test]
    fn test_signals_are_empty() {
        assert!(VerAck.to_data(level::MAXIMUM).is_empty());
        assert_eq!(MemoryPool.serialized_size(level::MAXIMUM), 0);
        assert_eq!(GetAddress::COMMAND, "getaddr");
    }

    #[test]
    fn test_mempool_requires_bip35() {
        let result = MemoryPool::from_data(&mut SliceReader::new(&[]), level::BIP31);
        assert!(matches!(
            result,
            Err(DomainError::VersionTooOld { minimum: level::BIP35, .. })
        ));
        assert_eq!(
            MemoryPool::from_data(&mut SliceReader::new(&[]), level::BIP35),
            Ok(MemoryPool)
        );
    }
}
