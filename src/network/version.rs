//! `version`: the handshake opening message

use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use tracing::trace;

use crate::codec::{varint_size, Reader, Writer};
use crate::constants::{level, MAX_USER_AGENT_SIZE};
use crate::error::Result;

use super::WireMessage;

/// Peer address without timestamp, as embedded in `version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NetworkAddress {
    pub services: u64,
    /// IPv6, or IPv4-mapped IPv6
    pub ip: [u8; 16],
    pub port: u16,
}

impl NetworkAddress {
    pub const SERIALIZED_SIZE: usize = 8 + 16 + 2;

    pub fn new(services: u64, address: SocketAddr) -> Self {
        let ip = match address.ip() {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        };
        Self {
            services,
            ip: ip.octets(),
            port: address.port(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        let ip = Ipv6Addr::from(self.ip);
        let ip = match ip.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(ip),
        };
        SocketAddr::new(ip, self.port)
    }

    pub fn write_data<W: Writer>(&self, sink: &mut W) {
        sink.write_u64_le(self.services);
        sink.write_bytes(&self.ip);
        sink.write_u16_be(self.port);
    }

    pub fn from_data<R: Reader>(source: &mut R) -> Result<Self> {
        let services = source.read_u64_le()?;
        let mut ip = [0u8; 16];
        source.read_exact_into(&mut ip)?;
        Ok(Self {
            services,
            ip,
            port: source.read_u16_be()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Version {
    /// Protocol version advertised by the sender
    pub value: u32,
    pub services: u64,
    pub timestamp: u64,
    pub address_receiver: NetworkAddress,
    pub address_sender: NetworkAddress,
    pub nonce: u64,
    pub user_agent: String,
    pub start_height: u32,
    /// Relay byte as carried on the wire, `None` when omitted
    pub relay: Option<bool>,
}

impl Version {
    /// Whether a sender at `version` includes the relay byte.
    pub fn carries_relay(&self, version: u32) -> bool {
        version.min(self.value) >= level::BIP37
    }

    /// Transaction relay requested by the sender; true when not carried.
    pub fn relay(&self) -> bool {
        self.relay.unwrap_or(true)
    }

    /// Record `relay` only if the byte is carried at `version`.
    pub fn set_relay(&mut self, relay: bool, version: u32) {
        self.relay = if self.carries_relay(version) {
            Some(relay)
        } else {
            None
        };
    }
}

impl WireMessage for Version {
    const COMMAND: &'static str = "version";
    const VERSION_MINIMUM: u32 = level::MINIMUM;

    fn serialized_size(&self, version: u32) -> usize {
        let mut size = 4
            + 8
            + 8
            + 2 * NetworkAddress::SERIALIZED_SIZE
            + 8
            + varint_size(self.user_agent.len() as u64)
            + self.user_agent.len()
            + 4;
        if self.relay.is_some() {
            size += 1;
        }
        size
    }

    fn write_data<W: Writer>(&self, sink: &mut W, _version: u32) {
        sink.write_u32_le(self.value);
        sink.write_u64_le(self.services);
        sink.write_u64_le(self.timestamp);
        self.address_receiver.write_data(sink);
        self.address_sender.write_data(sink);
        sink.write_u64_le(self.nonce);
        sink.write_string(&self.user_agent);
        sink.write_u32_le(self.start_height);
        if let Some(relay) = self.relay {
            sink.write_byte(u8::from(relay));
        }
    }

    /// Needs a bounded source, such as a frame payload, to see the relay byte.
    fn read_data<R: Reader>(source: &mut R, version: u32) -> Result<Self> {
        let mut message = Self {
            value: source.read_u32_le()?,
            services: source.read_u64_le()?,
            timestamp: source.read_u64_le()?,
            address_receiver: NetworkAddress::from_data(source)?,
            address_sender: NetworkAddress::from_data(source)?,
            nonce: source.read_u64_le()?,
            user_agent: source.read_string(MAX_USER_AGENT_SIZE)?,
            start_height: source.read_u32_le()?,
            relay: None,
        };

        // The trailing byte is optional even between BIP37 peers, so only a
        // bounded source can tell whether it is there.
        if let Some(remaining) = source.remaining() {
            if remaining > 0 {
                message.relay = Some(source.read_byte()? != 0);
            }
        } else if message.carries_relay(version) {
            trace!(command = Self::COMMAND, "relay byte not read from unbounded source");
        }

        Ok(message)
    }

    fn is_valid(&self) -> bool {
        self.value >= level::MINIMUM && self.user_agent.len() <= MAX_USER_AGENT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{SliceReader, StreamReader};
    use crate::constants::service;

    fn sample(relay: Option<bool>) -> Version {
        Version {
            value: level::MAXIMUM,
            services: service::NODE_NETWORK,
            timestamp: 1_700_000_000,
            address_receiver: NetworkAddress::new(0, "127.0.0.1:8333".parse().unwrap()),
            address_sender: NetworkAddress::new(service::NODE_NETWORK, "[::1]:18333".parse().unwrap()),
            nonce: 42,
            user_agent: "/chain-domain:0.1.0/".to_string(),
            start_height: 800_000,
            relay,
        }
    }

    #[test]
    fn test_address_layout() {
        let address = NetworkAddress::new(1, "10.0.0.1:8333".parse().unwrap());
        let mut data = Vec::new();
        address.write_data(&mut data);
        assert_eq!(data.len(), NetworkAddress::SERIALIZED_SIZE);
        assert_eq!(&data[8..20], &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff]);
        assert_eq!(&data[24..], &[0x20, 0x8d]);
        assert_eq!(address.socket_addr(), "10.0.0.1:8333".parse().unwrap());
    }

    #[test]
    fn test_relay_carried_at_bip37() {
        let message = sample(Some(false));
        let data = message.to_data(level::BIP37);
        assert_eq!(data.len(), message.serialized_size(level::BIP37));
        assert_eq!(data.last(), Some(&0));
        assert_eq!(
            Version::from_data(&mut SliceReader::new(&data), level::BIP37),
            Ok(message)
        );
    }

    #[test]
    fn test_relay_defaults_when_absent() {
        let message = sample(None);
        let data = message.to_data(level::BIP37);
        assert_eq!(data.len() + 1, sample(Some(true)).serialized_size(level::BIP37));

        // a BIP37 peer that omits the byte
        let parsed = Version::from_data(&mut SliceReader::new(&data), level::BIP37).unwrap();
        assert_eq!(parsed.relay, None);
        assert!(parsed.relay());
    }

    #[test]
    fn test_relay_false_survives_old_version() {
        let message = sample(Some(false));
        let data = message.to_data(level::MINIMUM);
        let parsed = Version::from_data(&mut SliceReader::new(&data), level::MINIMUM).unwrap();
        assert!(!parsed.relay());
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_set_relay_follows_negotiation() {
        let mut message = sample(None);
        message.set_relay(false, level::BIP35);
        assert_eq!(message.relay, None);
        message.set_relay(false, level::BIP37);
        assert_eq!(message.relay, Some(false));

        message.value = level::BIP35;
        message.set_relay(false, level::MAXIMUM);
        assert_eq!(message.relay, None);
    }

    #[test]
    fn test_unbounded_source_leaves_next_item() {
        let message = sample(None);
        let mut stream = message.to_data(level::MAXIMUM);
        stream.extend_from_slice(&[0xaa, 0xbb]);

        let mut reader = StreamReader::new(stream.as_slice());
        let parsed = Version::from_data(&mut reader, level::MAXIMUM).unwrap();
        assert_eq!(parsed, message);
        assert_eq!(reader.read_byte(), Ok(0xaa));
    }

    #[test]
    fn test_user_agent_limit() {
        let mut message = sample(Some(true));
        message.user_agent = "x".repeat(MAX_USER_AGENT_SIZE + 1);
        assert!(!message.is_valid());
        let data = message.to_data(level::MAXIMUM);
        assert!(Version::from_data(&mut SliceReader::new(&data), level::MAXIMUM).is_err());
    }
}
