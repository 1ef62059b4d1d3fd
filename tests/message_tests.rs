//! Tests for the wire message framework

use chain_domain::constants::{level, service};
use chain_domain::network::*;
use chain_domain::*;

fn header(nonce: u32) -> BlockHeader {
    BlockHeader {
        version: 0x2000_0000,
        previous_block_hash: [nonce as u8; 32],
        merkle_root: [0x5a; 32],
        timestamp: 1_700_000_000,
        bits: 0x1802_8a36,
        nonce,
    }
}

fn quiet_version() -> Version {
    Version {
        value: level::BIP31,
        services: service::NONE,
        timestamp: 1_600_000_000,
        address_receiver: NetworkAddress::default(),
        address_sender: NetworkAddress::default(),
        nonce: 7,
        user_agent: String::new(),
        start_height: 0,
        relay: Some(false),
    }
}

fn samples() -> Vec<NetworkMessage> {
    vec![
        Version {
            value: level::MAXIMUM,
            services: service::NODE_NETWORK | service::NODE_BLOOM,
            timestamp: 1_700_000_000,
            address_receiver: NetworkAddress::new(service::NONE, "192.0.2.1:8333".parse().unwrap()),
            address_sender: NetworkAddress::new(service::NODE_NETWORK, "[2001:db8::1]:8333".parse().unwrap()),
            nonce: 0x0123_4567_89ab_cdef,
            user_agent: "/test:1.0/".to_string(),
            start_height: 840_000,
            relay: Some(true),
        }
        .into(),
        quiet_version().into(),
        Version {
            relay: None,
            ..quiet_version()
        }
        .into(),
        VerAck.into(),
        GetAddress.into(),
        Ping { nonce: u64::MAX }.into(),
        Pong { nonce: 1 }.into(),
        MemoryPool.into(),
        GetBlocks {
            locator: BlockLocator::new(vec![[1; 32], [2; 32], [3; 32]], [0; 32]),
        }
        .into(),
        GetHeaders {
            locator: BlockLocator::new(vec![[4; 32]], [5; 32]),
        }
        .into(),
        Headers::new(vec![header(1), header(2)]).into(),
        Inventory::new(vec![
            InventoryVector::new(InventoryType::Transaction, [6; 32]),
            InventoryVector::new(InventoryType::Block, [7; 32]),
        ])
        .into(),
        GetData::new(vec![InventoryVector::new(InventoryType::CompactBlock, [8; 32])]).into(),
        NotFound::new(vec![InventoryVector::new(InventoryType::FilteredBlock, [9; 32])]).into(),
        SendHeaders.into(),
        FeeFilter { minimum_fee: 1000 }.into(),
        SendCompact {
            high_bandwidth: false,
            version: 1,
        }
        .into(),
    ]
}

// ============================================================================
// Uniform contract
// ============================================================================

#[test]
fn test_every_variant_round_trips_within_bounds() {
    for message in samples() {
        let minimum = message.version_minimum();
        let maximum = message.version_maximum();
        assert!(minimum <= maximum, "{}", message.command());

        for version in [minimum, (minimum + maximum) / 2, maximum] {
            let data = message.to_data(version);
            assert_eq!(data.len(), message.serialized_size(version), "{}", message.command());

            let mut reader = SliceReader::new(&data);
            let parsed = NetworkMessage::from_data(message.command(), &mut reader, version)
                .unwrap_or_else(|e| panic!("{} at {}: {}", message.command(), version, e));
            assert_eq!(parsed, message);
            assert!(reader.is_exhausted(), "{}", message.command());
            assert!(parsed.is_valid(), "{}", message.command());
        }
    }
}

#[test]
fn test_every_variant_rejects_old_versions() {
    for message in samples() {
        let minimum = message.version_minimum();
        let data = message.to_data(minimum);
        let result = NetworkMessage::from_payload(message.command(), &data, minimum - 1);
        match result {
            Err(DomainError::VersionTooOld {
                command,
                minimum: required,
                version,
            }) => {
                assert_eq!(command, message.command());
                assert_eq!(required, minimum);
                assert_eq!(version, minimum - 1);
            }
            other => panic!("{}: expected VersionTooOld, got {:?}", message.command(), other),
        }
    }
}

#[test]
fn test_relay_false_round_trips_at_minimum() {
    let message = quiet_version();
    let data = message.to_data(level::MINIMUM);
    let parsed = NetworkMessage::from_payload("version", &data, level::MINIMUM).unwrap();
    assert_eq!(parsed, NetworkMessage::from(message));
}

#[test]
fn test_command_names() {
    let commands: Vec<&str> = samples().iter().map(NetworkMessage::command).collect();
    assert_eq!(
        commands,
        vec![
            "version",
            "version",
            "version",
            "verack",
            "getaddr",
            "ping",
            "pong",
            "mempool",
            "getblocks",
            "getheaders",
            "headers",
            "inv",
            "getdata",
            "notfound",
            "sendheaders",
            "feefilter",
            "sendcmpct",
        ]
    );
}

#[test]
fn test_version_minimums() {
    assert_eq!(Version::VERSION_MINIMUM, 31402);
    assert_eq!(GetHeaders::VERSION_MINIMUM, 31800);
    assert_eq!(Headers::VERSION_MINIMUM, 31800);
    assert_eq!(Ping::VERSION_MINIMUM, 60001);
    assert_eq!(MemoryPool::VERSION_MINIMUM, 60002);
    assert_eq!(NotFound::VERSION_MINIMUM, 70001);
    assert_eq!(SendHeaders::VERSION_MINIMUM, 70012);
    assert_eq!(FeeFilter::VERSION_MINIMUM, 70013);
    assert_eq!(SendCompact::VERSION_MINIMUM, 70014);
    assert_eq!(SendCompact::VERSION_MAXIMUM, 70015);
}

// ============================================================================
// Truncation and framing
// ============================================================================

#[test]
fn test_truncated_payloads_fail() {
    for message in samples() {
        let data = message.to_data(level::MAXIMUM);
        if data.len() < 2 {
            continue;
        }
        // two bytes, so the optional relay byte is not the only loss
        let truncated = &data[..data.len() - 2];
        let result = NetworkMessage::from_payload(message.command(), truncated, level::MAXIMUM);
        assert!(result.is_err(), "{}", message.command());
    }
}

#[test]
fn test_frames_round_trip_through_stream() {
    let params = NetworkParameters::testnet();
    let mut stream = Vec::new();
    for message in samples() {
        stream.extend(message.to_frame(&params, level::MAXIMUM));
    }

    let mut reader = StreamReader::new(stream.as_slice());
    for message in samples() {
        let parsed = NetworkMessage::from_frame(&mut reader, &params, level::MAXIMUM).unwrap();
        assert_eq!(parsed, message);
    }
    assert!(NetworkMessage::from_frame(&mut reader, &params, level::MAXIMUM).is_err());
}

#[test]
fn test_unknown_command_in_frame() {
    let params = NetworkParameters::mainnet();
    let heading = Heading::new(params.magic, "reject", &[]);
    let data = heading.to_data();
    let result = NetworkMessage::from_frame(&mut SliceReader::new(&data), &params, level::MAXIMUM);
    assert!(matches!(result, Err(DomainError::MalformedField(_))));
}

#[test]
fn test_negotiated_sum_type() {
    let data = FeeFilter { minimum_fee: 5 }.to_data(level::BIP133);

    let old = FeeFilter::negotiate(&mut SliceReader::new(&data), level::BIP130).unwrap();
    assert_eq!(
        old,
        Negotiated::Unavailable {
            required: level::BIP133,
            negotiated: level::BIP130,
        }
    );

    let current = FeeFilter::negotiate(&mut SliceReader::new(&data), level::BIP133).unwrap();
    assert_eq!(current.present(), Some(&FeeFilter { minimum_fee: 5 }));
}
