//! Keepalive messages

use crate::codec::{Reader, Writer};
use crate::constants::level;
use crate::error::Result;

use super::WireMessage;

/// Liveness probe; the peer echoes the nonce in a [`Pong`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ping {
    pub nonce: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pong {
    pub nonce: u64,
}

impl WireMessage for Ping {
    const COMMAND: &'static str = "ping";
    // nonce-less pings predate BIP31 and are not supported
    const VERSION_MINIMUM: u32 = level::BIP31;

    fn serialized_size(&self, _version: u32) -> usize {
        8
    }

    fn write_data<W: Writer>(&self, sink: &mut W, _version: u32) {
        sink.write_u64_le(self.nonce);
    }

    fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
        Ok(Self {
            nonce: source.read_u64_le()?,
        })
    }
}

impl WireMessage for Pong {
    const COMMAND: &'static str = "pong";
    const VERSION_MINIMUM: u32 = level::BIP31;

    fn serialized_size(&self, _version: u32) -> usize {
        8
    }

    fn write_data<W: Writer>(&self, sink: &mut W, _version: u32) {
        sink.write_u64_le(self.nonce);
    }

    fn read_data<R: Reader>(source: &mut R, _version: u32) -> Result<Self> {
        Ok(Self {
            nonce: source.read_u64_le()?,
        })
    }
}

impl From<&Ping> for Pong {
    fn from(ping: &Ping) -> Self {
        Pong { nonce: ping.nonce }
    }
}
