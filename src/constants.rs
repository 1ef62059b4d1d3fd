//! Protocol constants for the wire and chain codecs

/// Size of a hash digest in bytes
pub const HASH_SIZE: usize = 32;

/// Size of the null-padded command field in a message heading
pub const COMMAND_SIZE: usize = 12;

/// Size of a serialized block header
pub const HEADER_SIZE: usize = 80;

/// Maximum number of locator hashes in getblocks/getheaders
pub const MAX_GET_BLOCKS: usize = 500;

/// Maximum number of headers in a headers message
pub const MAX_GET_HEADERS: usize = 2000;

/// Maximum number of entries in inv/getdata/notfound
pub const MAX_INVENTORY: usize = 50_000;

/// Maximum length of the user agent carried by the version message
pub const MAX_USER_AGENT_SIZE: usize = 256;

/// Maximum payload size of a single network message: 32MB
pub const MAX_PAYLOAD_SIZE: usize = 0x0200_0000;

/// Maximum length of a token commitment
pub const MAX_COMMITMENT_SIZE: usize = 40;

/// Protocol version levels gating individual messages
pub mod level {
    /// Lowest version we talk to; address.time fields
    pub const MINIMUM: u32 = 31402;

    /// getheaders/headers (preceded the BIP system)
    pub const HEADERS: u32 = 31800;

    /// ping.nonce, pong
    pub const BIP31: u32 = 60001;

    /// mempool
    pub const BIP35: u32 = 60002;

    /// filters, merkle_block, notfound, version.relay
    pub const BIP37: u32 = 70001;

    /// reject
    pub const BIP61: u32 = 70002;

    /// sendheaders
    pub const BIP130: u32 = 70012;

    /// feefilter
    pub const BIP133: u32 = 70013;

    /// compact blocks
    pub const BIP152: u32 = 70014;

    /// Compact block protocol fix
    pub const BIP152_FIX: u32 = 70015;

    /// Highest version supported internally
    pub const MAXIMUM: u32 = BIP152_FIX;
}

/// Service bits advertised in the version message
pub mod service {
    pub const NONE: u64 = 0;
    pub const NODE_NETWORK: u64 = 1 << 0;
    pub const NODE_UTXO: u64 = 1 << 1;
    pub const NODE_BLOOM: u64 = 1 << 2;
    pub const NODE_WITNESS: u64 = 1 << 3;
    pub const NODE_NETWORK_CASH: u64 = 1 << 5;
}
