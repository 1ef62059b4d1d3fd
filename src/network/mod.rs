//! Peer-to-peer wire messages
//!
//! Every message kind implements [`WireMessage`]: a static command name and
//! protocol version bounds, a size function and a reader/writer pair. The
//! closed set of kinds is dispatched through [`NetworkMessage`], which also
//! builds and parses the full frame (heading plus payload) for a given
//! [`NetworkParameters`].

use tracing::debug;

use crate::codec::{Reader, SliceReader, Writer};
use crate::constants::level;
use crate::error::{DomainError, Result};
use crate::params::NetworkParameters;

pub mod heading;
pub mod headers;
pub mod inventory;
pub mod locator;
pub mod ping;
pub mod preference;
pub mod signal;
pub mod version;

pub use heading::{checksum, Heading};
pub use headers::Headers;
pub use inventory::{GetData, Inventory, InventoryList, InventoryType, InventoryVector, NotFound};
pub use locator::{BlockLocator, GetBlocks, GetHeaders};
pub use ping::{Ping, Pong};
pub use preference::{FeeFilter, SendCompact};
pub use signal::{GetAddress, MemoryPool, SendHeaders, VerAck};
pub use version::{NetworkAddress, Version};

/// Uniform codec contract of a wire message
pub trait WireMessage: Sized {
    const COMMAND: &'static str;
    const VERSION_MINIMUM: u32;
    const VERSION_MAXIMUM: u32 = level::MAXIMUM;

    fn serialized_size(&self, version: u32) -> usize;

    fn write_data<W: Writer>(&self, sink: &mut W, version: u32);

    /// Parse the payload fields without checking version bounds.
    fn read_data<R: Reader>(source: &mut R, version: u32) -> Result<Self>;

    fn is_valid(&self) -> bool {
        true
    }

    fn to_data(&self, version: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.serialized_size(version));
        self.write_data(&mut data, version);
        data
    }

    /// Parse a payload negotiated at `version`.
    fn from_data<R: Reader>(source: &mut R, version: u32) -> Result<Self> {
        if version < Self::VERSION_MINIMUM {
            source.invalidate();
            return Err(DomainError::VersionTooOld {
                command: Self::COMMAND,
                minimum: Self::VERSION_MINIMUM,
                version,
            });
        }
        Self::read_data(source, version)
    }

    /// Like [`WireMessage::from_data`], reporting an insufficient version as
    /// [`Negotiated::Unavailable`] instead of an error.
    fn negotiate<R: Reader>(source: &mut R, version: u32) -> Result<Negotiated<Self>> {
        if version < Self::VERSION_MINIMUM {
            return Ok(Negotiated::Unavailable {
                required: Self::VERSION_MINIMUM,
                negotiated: version,
            });
        }
        Self::read_data(source, version).map(Negotiated::Present)
    }
}

/// A message that may not exist at the negotiated protocol version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiated<M> {
    Unavailable { required: u32, negotiated: u32 },
    Present(M),
}

impl<M: WireMessage> Negotiated<M> {
    pub fn is_valid(&self) -> bool {
        match self {
            Negotiated::Unavailable { .. } => false,
            Negotiated::Present(message) => message.is_valid(),
        }
    }

    pub fn present(&self) -> Option<&M> {
        match self {
            Negotiated::Unavailable { .. } => None,
            Negotiated::Present(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<M> {
        match self {
            Negotiated::Unavailable {
                required,
                negotiated,
            } => Err(DomainError::VersionTooOld {
                command: M::COMMAND,
                minimum: required,
                version: negotiated,
            }),
            Negotiated::Present(message) => Ok(message),
        }
    }
}

macro_rules! network_messages {
    ($($variant:ident),+ $(,)?) => {
        /// Every message kind this layer understands
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum NetworkMessage {
            $($variant($variant),)+
        }

        $(
            impl From<$variant> for NetworkMessage {
                fn from(message: $variant) -> Self {
                    NetworkMessage::$variant(message)
                }
            }
        )+

        impl NetworkMessage {
            pub fn command(&self) -> &'static str {
                match self {
                    $(NetworkMessage::$variant(_) => $variant::COMMAND,)+
                }
            }

            pub fn version_minimum(&self) -> u32 {
                match self {
                    $(NetworkMessage::$variant(_) => $variant::VERSION_MINIMUM,)+
                }
            }

            pub fn version_maximum(&self) -> u32 {
                match self {
                    $(NetworkMessage::$variant(_) => $variant::VERSION_MAXIMUM,)+
                }
            }

            pub fn serialized_size(&self, version: u32) -> usize {
                match self {
                    $(NetworkMessage::$variant(m) => m.serialized_size(version),)+
                }
            }

            pub fn write_data<W: Writer>(&self, sink: &mut W, version: u32) {
                match self {
                    $(NetworkMessage::$variant(m) => m.write_data(sink, version),)+
                }
            }

            pub fn to_data(&self, version: u32) -> Vec<u8> {
                match self {
                    $(NetworkMessage::$variant(m) => m.to_data(version),)+
                }
            }

            pub fn is_valid(&self) -> bool {
                match self {
                    $(NetworkMessage::$variant(m) => m.is_valid(),)+
                }
            }

            /// Parse the payload of the message named by `command`.
            pub fn from_data<R: Reader>(command: &str, source: &mut R, version: u32) -> Result<Self> {
                match command {
                    $(c if c == $variant::COMMAND => $variant::from_data(source, version).map(NetworkMessage::$variant),)+
                    unknown => {
                        debug!(command = unknown, "unknown message command");
                        source.invalidate();
                        Err(DomainError::MalformedField(format!(
                            "unknown command '{}'",
                            unknown
                        )))
                    }
                }
            }
        }
    };
}

network_messages!(
    Version,
    VerAck,
    GetAddress,
    Ping,
    Pong,
    MemoryPool,
    GetBlocks,
    GetHeaders,
    Headers,
    Inventory,
    GetData,
    NotFound,
    SendHeaders,
    FeeFilter,
    SendCompact,
);

impl NetworkMessage {
    pub fn from_payload(command: &str, payload: &[u8], version: u32) -> Result<Self> {
        Self::from_data(command, &mut SliceReader::new(payload), version)
    }

    /// Heading followed by the payload serialized at `version`, clamped to
    /// the network's protocol maximum.
    pub fn to_frame(&self, params: &NetworkParameters, version: u32) -> Vec<u8> {
        let payload = self.to_data(params.negotiate(version));
        let heading = Heading::new(params.magic, self.command(), &payload);
        let mut frame = Vec::with_capacity(Heading::SERIALIZED_SIZE + payload.len());
        heading.write_data(&mut frame);
        frame.write_bytes(&payload);
        frame
    }

    /// Read one frame, verifying magic, payload size and checksum.
    pub fn from_frame<R: Reader>(
        source: &mut R,
        params: &NetworkParameters,
        version: u32,
    ) -> Result<Self> {
        let heading = Heading::from_data(source)?;

        if heading.magic != params.magic {
            debug!(
                magic = format_args!("{:#010x}", heading.magic),
                network = %params.name,
                "frame from foreign network"
            );
            return source.fail(DomainError::MalformedField(format!(
                "magic {:#010x} does not match {} network",
                heading.magic, params.name
            )));
        }

        let payload_size = heading.payload_size as usize;
        if payload_size > params.max_payload_size {
            return source.fail(DomainError::MalformedField(format!(
                "payload size {} exceeds {}",
                payload_size, params.max_payload_size
            )));
        }

        let payload = source.read_bytes(payload_size)?;
        if checksum(&payload) != heading.checksum {
            debug!(command = %heading.command, "frame checksum mismatch");
            return source.fail(DomainError::MalformedField(format!(
                "checksum mismatch for '{}'",
                heading.command
            )));
        }

        Self::from_payload(&heading.command, &payload, params.negotiate(version))
    }
}
