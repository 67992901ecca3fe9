// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Encoding and decoding of complete packets through the public API.

use bytes::Bytes;
use scion_packet::{
    auth::{AuthError, DefaultMac},
    packet::{
        ByEndpoint, DecodeError, Extension, NextHeader, Offsets, Payload, RawPath, ScionPacket,
        ScmpClass, ScmpHeader, ScmpPayload, SecurityExtension, SecurityMode, Section, decode,
        extension::{end_to_end, hop_by_hop},
    },
};
use test_log::test;

const SEED: [u8; 32] = [7; 32];

fn udp_packet(source: &str, destination: &str, payload: &'static [u8]) -> ScionPacket {
    ScionPacket::new_udp(
        ByEndpoint {
            source: source.parse().unwrap(),
            destination: destination.parse().unwrap(),
        },
        None,
        ByEndpoint {
            source: 30041,
            destination: 30042,
        },
        Bytes::from_static(payload),
    )
}

/// A packet with a service destination, a path with advanced cursors and all kinds of extensions.
fn rich_packet(mode: SecurityMode, key: &[u8]) -> ScionPacket {
    let mut packet = udp_packet("2-ff00:0:222,fd00::1", "1-ff00:0:110,CS_A", b"hello world");
    packet.path = Some(RawPath {
        raw: Bytes::from_iter(0..32u8),
        info_offset: 8,
        hop_offset: 16,
    });
    packet.extensions = vec![
        Extension::hop_by_hop(hop_by_hop::TRACEROUTE, Bytes::from_static(&[1, 2, 3, 4, 5])),
        Extension::end_to_end(end_to_end::PATH_PROBE, Bytes::from_iter(10..23u8)),
    ];
    packet.security = Some(
        SecurityExtension::new(mode, Bytes::copy_from_slice(key))
            .unwrap()
            .with_metadata([0, 0, 1, 42]),
    );
    packet
}

fn ed25519_public_key() -> [u8; 32] {
    ed25519_dalek::SigningKey::from_bytes(&SEED)
        .verifying_key()
        .to_bytes()
}

#[test]
fn encodes_packet_without_path_and_extensions() {
    let packet = udp_packet("1-ff00:0:110,2001:db8::1", "1-ff00:0:111,2001:db8::2", b"payload");
    let encoded = packet.encode().unwrap();

    assert_eq!(encoded.len(), 71);
    assert_eq!(&encoded[..8], &[0x00, 0x82, 0, 71, 7, 0, 0, 17]);

    let decoded = decode(encoded).unwrap();
    assert_eq!(decoded.common_header.next_header, NextHeader::Udp);
    assert_eq!(decoded.packet.endhosts, packet.endhosts);
    assert_eq!(decoded.packet.path, None);
    assert!(decoded.packet.extensions.is_empty());
    assert_eq!(decoded.packet.security, None);
    assert_eq!(decoded.packet.payload, packet.payload);
    assert_eq!(decoded.offsets.payload.range(), 64..71);
}

#[test]
fn rich_packet_round_trips() {
    let packet = rich_packet(SecurityMode::HmacSha256, b"a shared secret");
    let encoded = packet.encode().unwrap();
    assert_eq!(encoded.len(), 163);

    let decoded = decode(encoded.clone()).unwrap();
    assert_eq!(decoded.packet.endhosts, packet.endhosts);
    assert_eq!(decoded.packet.path, packet.path);
    assert_eq!(decoded.packet.extensions, packet.extensions);
    assert_eq!(decoded.packet.payload, packet.payload);
    assert_eq!(decoded.offsets.path.range(), 48..80);
    assert_eq!(decoded.offsets.extension_block().range(), 80..144);
    assert_eq!(decoded.offsets.authenticator().unwrap().range(), 96..128);

    let security = decoded.packet.security.as_ref().unwrap();
    let expected = packet.security.as_ref().unwrap();
    assert_eq!(security.mode, expected.mode);
    assert_eq!(security.metadata, expected.metadata);
    assert_eq!(&encoded[96..128], &security.authenticator[..]);

    // The key is not part of the wire format.
    let mut again = decoded.packet.clone();
    again.security = packet.security.clone();
    assert_eq!(again.encode().unwrap(), encoded);
}

#[test]
fn default_mac_authenticates_every_supported_mode() {
    let cases: [(SecurityMode, &[u8], &[u8]); 4] = [
        (SecurityMode::AesCmac, &[3; 16], &[3; 16]),
        (SecurityMode::AesCmac, &[3; 32], &[3; 32]),
        (SecurityMode::HmacSha256, b"key", b"key"),
        (SecurityMode::Ed25519, &SEED, &ed25519_public_key()),
    ];
    for (mode, signing_key, verifying_key) in cases {
        let decoded = decode(rich_packet(mode, signing_key).encode().unwrap()).unwrap();
        let authenticator = &decoded.packet.security.as_ref().unwrap().authenticator;
        assert_eq!(Some(authenticator.len()), mode.authenticator_length());
        assert_eq!(
            decoded.verify(&DefaultMac, verifying_key),
            Ok(()),
            "{mode:?}"
        );
    }
}

#[test]
fn verification_fails_with_wrong_key() {
    let encoded = rich_packet(SecurityMode::AesCmac, &[1; 16]).encode().unwrap();
    let decoded = decode(encoded).unwrap();
    assert_eq!(
        decoded.verify(&DefaultMac, &[2; 16]),
        Err(AuthError::Mismatch)
    );
}

#[test]
fn unsupported_mode_cannot_be_encoded() {
    let packet = rich_packet(SecurityMode::GcmAes128, &[0; 16]);
    assert!(packet.encode().is_err());
}

/// Encodes the rich packet, applies `tamper` to the wire bytes and verifies the result.
fn verify_tampered(tamper: impl FnOnce(&mut Vec<u8>, &Offsets)) -> Result<(), AuthError> {
    let key = [9; 16];
    let encoded = rich_packet(SecurityMode::AesCmac, &key).encode().unwrap();
    let offsets = decode(encoded.clone()).unwrap().offsets;

    let mut raw = encoded.to_vec();
    tamper(&mut raw, &offsets);
    decode(Bytes::from(raw)).unwrap().verify(&DefaultMac, &key)
}

#[test]
fn end_to_end_extensions_are_authenticated() {
    let result = verify_tampered(|raw, offsets| {
        let end_to_end = offsets.extensions[2].offsets.start;
        raw[end_to_end + 3] ^= 0xff;
    });
    assert_eq!(result, Err(AuthError::Mismatch));
}

#[test]
fn metadata_is_authenticated() {
    let result = verify_tampered(|raw, offsets| {
        let security = offsets.extensions[1].offsets.start;
        raw[security + 4] ^= 0x01;
    });
    assert_eq!(result, Err(AuthError::Mismatch));
}

#[test]
fn path_is_authenticated() {
    let result = verify_tampered(|raw, offsets| raw[offsets.path.start] ^= 0x01);
    assert_eq!(result, Err(AuthError::Mismatch));
}

#[test]
fn hop_by_hop_data_is_mutable_in_transit() {
    let result = verify_tampered(|raw, offsets| {
        let hop_by_hop = offsets.extensions[0].offsets.start;
        raw[hop_by_hop + 3] ^= 0xff;
    });
    assert_eq!(result, Ok(()));
}

#[test]
fn path_cursors_are_mutable_in_transit() {
    let result = verify_tampered(|raw, _| raw[6] = 9);
    assert_eq!(result, Ok(()));
}

/// Flips each of the given payload bytes in turn and expects the decoder to report a checksum
/// failure.
fn assert_flips_fail_checksum(encoded: &Bytes, indices: impl IntoIterator<Item = usize>) {
    for index in indices {
        let mut raw = encoded.to_vec();
        raw[index] ^= 0x01;
        let result = decode(Bytes::from(raw));
        assert!(
            matches!(result, Err(DecodeError::ChecksumFailure { .. })),
            "byte {index} of {}: {result:?}",
            encoded.len()
        );
    }
}

#[test]
fn checksum_covers_every_payload_byte() {
    static DATA: [u8; 65] = [0xa5; 65];

    for length in 0..=64 {
        let packet = udp_packet("1-ff00:0:110,10.0.0.1", "1-ff00:0:111,10.0.0.2", &DATA[..length]);
        let encoded = packet.encode().unwrap();
        let decoded = decode(encoded.clone()).unwrap();
        assert_eq!(decoded.packet.payload, packet.payload);

        assert_flips_fail_checksum(&encoded, decoded.offsets.payload.range());
    }
}

#[test]
fn checksum_covers_large_payloads() {
    static DATA: [u8; 65_000] = [0x5a; 65_000];

    for length in [1499, 1500, 9000, 65_000] {
        let packet = udp_packet("1-ff00:0:110,10.0.0.1", "1-ff00:0:111,10.0.0.2", &DATA[..length]);
        let encoded = packet.encode().unwrap();
        let decoded = decode(encoded.clone()).unwrap();
        assert_eq!(decoded.packet.payload, packet.payload);

        let payload = decoded.offsets.payload.range();
        let middle = (payload.start + payload.end) / 2;
        assert_flips_fail_checksum(&encoded, [payload.start, middle, payload.end - 1]);
    }
}

#[test]
fn checksum_covers_scmp_payload() {
    let packet = scmp_packet();
    let encoded = packet.encode().unwrap();
    let decoded = decode(encoded.clone()).unwrap();
    assert_eq!(decoded.packet.payload, packet.payload);

    // Covers the payload meta header as well as the quoted sections.
    assert_flips_fail_checksum(&encoded, decoded.offsets.payload.range());
}

#[test]
fn address_header_is_padded_with_zeros() {
    let packet = udp_packet("1-ff00:0:110,PS_A", "1-ff00:0:111,10.0.0.2", b"x");
    let encoded = packet.encode().unwrap();
    let decoded = decode(encoded.clone()).unwrap();
    assert_eq!(decoded.offsets.address_header.range(), 8..32);
    assert_eq!(&encoded[30..32], &[0, 0]);

    let mut raw = encoded.to_vec();
    raw[8 + 23] = 7;
    assert_eq!(
        decode(Bytes::from(raw)),
        Err(DecodeError::InvalidPadding {
            section: Section::AddressHeader,
            position: 23,
            value: 7,
        })
    );
}

/// An SCMP error quoting the sections of a UDP packet.
fn scmp_packet() -> ScionPacket {
    let quoted = udp_packet("1-ff00:0:110,10.0.0.1", "1-ff00:0:111,10.0.0.2", b"quoted")
        .encode()
        .unwrap();
    let payload = ScmpPayload {
        info: Bytes::from_static(&[0, 0, 0, 0, 0, 0, 5, 220]),
        common_header: quoted.slice(..8),
        address_header: quoted.slice(8..32),
        path: Bytes::new(),
        extensions: Bytes::new(),
        l4_header: quoted.slice(32..40),
        l4_protocol: NextHeader::Udp,
    };
    ScionPacket::new_scmp(
        ByEndpoint {
            source: "1-ff00:0:111,10.0.0.2".parse().unwrap(),
            destination: "1-ff00:0:110,10.0.0.1".parse().unwrap(),
        },
        None,
        ScmpHeader::new(ScmpClass::CommonHeader, 1, 1_700_000_000_000_000),
        payload,
    )
}

#[test]
fn scmp_packet_round_trips() {
    let packet = scmp_packet();
    let encoded = packet.encode().unwrap();
    let decoded = decode(encoded.clone()).unwrap();
    assert_eq!(decoded.common_header.next_header, NextHeader::Scmp);
    assert_eq!(decoded.packet.payload, packet.payload);
    assert!(matches!(decoded.packet.payload, Payload::Scmp(_)));
    assert_eq!(
        usize::from(decoded.packet.l4_header.total_length()),
        decoded.offsets.l4_header.len() + decoded.offsets.payload.len()
    );
    assert_eq!(decoded.packet.encode().unwrap(), encoded);
}
