//! Per-network parameters passed explicitly to codecs that need them

use serde::{Deserialize, Serialize};

use crate::constants::{level, MAX_PAYLOAD_SIZE};
use crate::error::{DomainError, Result};

/// Network identity and numeric domain limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParameters {
    pub name: String,
    /// Message heading magic, written little-endian
    pub magic: u32,
    pub cashaddr_prefix: String,
    /// Proof of work limit in compact form
    pub pow_limit: u32,
    pub max_payload_size: usize,
    /// Highest protocol level spoken on this network
    pub protocol_maximum: u32,
}

impl NetworkParameters {
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            magic: 0xe8f3_e1e3,
            cashaddr_prefix: "bitcoincash".to_string(),
            pow_limit: 0x1d00_ffff,
            max_payload_size: MAX_PAYLOAD_SIZE,
            protocol_maximum: level::MAXIMUM,
        }
    }

    pub fn testnet() -> Self {
        Self {
            name: "testnet".to_string(),
            magic: 0xf4f3_e5f4,
            cashaddr_prefix: "bchtest".to_string(),
            pow_limit: 0x1d00_ffff,
            max_payload_size: MAX_PAYLOAD_SIZE,
            protocol_maximum: level::MAXIMUM,
        }
    }

    pub fn regtest() -> Self {
        Self {
            name: "regtest".to_string(),
            magic: 0xfabf_b5da,
            cashaddr_prefix: "bchreg".to_string(),
            pow_limit: 0x207f_ffff,
            max_payload_size: MAX_PAYLOAD_SIZE,
            protocol_maximum: level::MAXIMUM,
        }
    }

    /// Legacy Bitcoin mainnet magic for cross-chain tooling
    pub fn bitcoin_mainnet() -> Self {
        Self {
            name: "bitcoin".to_string(),
            magic: 0xd9b4_bef9,
            cashaddr_prefix: String::new(),
            pow_limit: 0x1d00_ffff,
            max_payload_size: MAX_PAYLOAD_SIZE,
            protocol_maximum: level::MAXIMUM,
        }
    }

    /// Clamp a peer's protocol level to what this network supports.
    pub fn negotiate(&self, version: u32) -> u32 {
        version.min(self.protocol_maximum)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DomainError::MalformedField(format!("network parameters: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::MalformedField(format!("network parameters: {}", e)))
    }
}

impl Default for NetworkParameters {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate_clamps_to_protocol_maximum() {
        let mut params = NetworkParameters::regtest();
        assert_eq!(params.negotiate(level::MAXIMUM + 10), level::MAXIMUM);
        params.protocol_maximum = level::BIP37;
        assert_eq!(params.negotiate(level::MAXIMUM), level::BIP37);
        assert_eq!(params.negotiate(level::BIP31), level::BIP31);
    }

    #[test]
    fn test_presets_are_distinct() {
        let magics = [
            NetworkParameters::mainnet().magic,
            NetworkParameters::testnet().magic,
            NetworkParameters::regtest().magic,
            NetworkParameters::bitcoin_mainnet().magic,
        ];
        for (i, a) in magics.iter().enumerate() {
            for b in &magics[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_json_round_trip() {
        let params = NetworkParameters::regtest();
        let text = params.to_json().unwrap();
        assert!(text.contains("bchreg"));
        assert_eq!(NetworkParameters::from_json(&text).unwrap(), params);
    }

    #[test]
    fn test_json_rejects_garbage() {
        let result = NetworkParameters::from_json("{\"name\": 1}");
        assert!(matches!(result, Err(DomainError::MalformedField(_))));
    }
}
