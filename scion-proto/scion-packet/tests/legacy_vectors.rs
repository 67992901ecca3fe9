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
//! Byte vectors produced by the legacy Go serializer.

use std::cell::RefCell;

use bytes::Bytes;
use scion_packet::{
    auth::{AuthError, PacketMac},
    packet::{
        ByEndpoint, DecodeError, Extension, L4Header, NextHeader, PacketEncoder, Payload, RawPath,
        ScionPacket, SecurityExtension, SecurityMode, UdpHeader, decode,
        extension::{end_to_end, hop_by_hop},
        offsets::ExtensionKind,
    },
};
use test_log::test;

/// The authenticator stored in the vectors.
const AUTHENTICATOR: [u8; 16] = [
    80, 61, 234, 240, 236, 19, 189, 187, 142, 123, 200, 129, 6, 230, 160, 210,
];

/// A UDP packet with a path, a hop-by-hop extension, the security extension and two end-to-end
/// extensions.
const PACKET: [u8; 119] = [
    0, 65, 0, 119, 7, 0, 0, 0, //
    16, 0, 255, 170, 0, 0, 17, 1, //
    0, 1, 255, 170, 0, 0, 17, 3, //
    1, 1, 1, 100, 1, 1, 1, 8, //
    1, 2, 3, 4, 5, 6, 7, 8, //
    1, 2, 3, 4, 5, 6, 7, 8, //
    1, 2, 3, 4, 5, 6, 7, 8, //
    222, 1, 1, 0, 0, 0, 0, 0, //
    222, 3, 2, 0, 0, 0, 0, 0, //
    80, 61, 234, 240, 236, 19, 189, 187, //
    142, 123, 200, 129, 6, 230, 160, 210, //
    222, 1, 254, 5, 5, 5, 5, 5, //
    17, 1, 2, 0, 0, 0, 0, 0, //
    0, 23, 0, 24, 0, 15, 41, 111, //
    10, 20, 30, 40, 50, 60, 70,
];

/// The authenticated bytes of the same packet with ports 1500 and 1501.
const AUTHENTICATED: [u8; 108] = [
    0, 65, 0, //
    16, 0, 255, 170, 0, 0, 17, 1, //
    0, 1, 255, 170, 0, 0, 17, 3, //
    1, 1, 1, 100, 1, 1, 1, 8, //
    1, 2, 3, 4, 5, 6, 7, 8, //
    1, 2, 3, 4, 5, 6, 7, 8, //
    1, 2, 3, 4, 5, 6, 7, 8, //
    222, 1, //
    222, 3, 2, 0, 0, 0, 0, 0, //
    80, 61, 234, 240, 236, 19, 189, 187, //
    142, 123, 200, 129, 6, 230, 160, 210, //
    222, 1, 254, 5, 5, 5, 5, 5, //
    17, 1, 2, 0, 0, 0, 0, 0, //
    5, 220, 5, 221, 0, 15, 29, 229, //
    10, 20, 30, 40, 50, 60, 70,
];

/// Position of the authenticator in [`AUTHENTICATED`].
const AUTHENTICATED_WINDOW: std::ops::Range<usize> = 61..77;

/// Returns the authenticator of the vectors regardless of the input.
struct FixedMac;

impl PacketMac for FixedMac {
    fn compute(&self, _: SecurityMode, _: &[u8], _: &[u8]) -> Result<Bytes, AuthError> {
        Ok(Bytes::from_static(&AUTHENTICATOR))
    }
}

/// Records the message it is asked to authenticate.
#[derive(Default)]
struct RecordingMac {
    message: RefCell<Vec<u8>>,
}

impl PacketMac for RecordingMac {
    fn compute(&self, mode: SecurityMode, key: &[u8], message: &[u8]) -> Result<Bytes, AuthError> {
        *self.message.borrow_mut() = message.to_vec();
        FixedMac.compute(mode, key, message)
    }
}

fn legacy_packet(source_port: u16, destination_port: u16) -> ScionPacket {
    let mut packet = ScionPacket::new_udp(
        ByEndpoint {
            source: "1-ffaa:0:1103,1.1.1.8".parse().unwrap(),
            destination: "4096-ffaa:0:1101,1.1.1.100".parse().unwrap(),
        },
        Some(RawPath::new(Bytes::from_static(&[
            1, 2, 3, 4, 5, 6, 7, 8, 1, 2, 3, 4, 5, 6, 7, 8, 1, 2, 3, 4, 5, 6, 7, 8,
        ]))),
        ByEndpoint {
            source: source_port,
            destination: destination_port,
        },
        Bytes::from_static(&[10, 20, 30, 40, 50, 60, 70]),
    );
    packet.extensions = vec![
        Extension::end_to_end(end_to_end::DEBUG, Bytes::from_static(&[5; 5])),
        Extension::end_to_end(end_to_end::SECURITY, Bytes::from_static(&[0; 4])),
        Extension::hop_by_hop(hop_by_hop::SIBRA, Bytes::from_static(&[0; 5])),
    ];
    packet.security = Some(SecurityExtension::new(SecurityMode::AesCmac, vec![0; 32]).unwrap());
    packet
}

fn expected_encoding() -> Vec<u8> {
    let mut expected = PACKET.to_vec();
    // The cursors point to the first line of the path instead of being left unset.
    expected[5] = 4;
    expected[6] = 4;
    expected
}

#[test]
fn encoding_matches_legacy_serializer() {
    let encoded = PacketEncoder::new(&FixedMac).encode(&legacy_packet(23, 24)).unwrap();
    assert_eq!(encoded, expected_encoding());
}

#[test]
fn authenticated_bytes_follow_wire_order() {
    let mac = RecordingMac::default();
    PacketEncoder::new(&mac).encode(&legacy_packet(1500, 1501)).unwrap();

    let mut expected = AUTHENTICATED.to_vec();
    expected[AUTHENTICATED_WINDOW].fill(0);
    assert_eq!(*mac.message.borrow(), expected);
}

#[test]
fn decoder_rebuilds_authenticated_bytes() {
    let encoded = PacketEncoder::new(&FixedMac).encode(&legacy_packet(1500, 1501)).unwrap();
    let decoded = decode(encoded).unwrap();

    let mut expected = AUTHENTICATED.to_vec();
    expected[AUTHENTICATED_WINDOW].fill(0);
    assert_eq!(decoded.authenticated_bytes(), expected);
}

#[test]
fn decodes_legacy_packet() {
    let decoded = decode(Bytes::from_static(&PACKET)).unwrap();
    let packet = &decoded.packet;

    assert_eq!(packet.endhosts, legacy_packet(23, 24).endhosts);
    assert_eq!(
        packet.path,
        Some(RawPath::new(Bytes::copy_from_slice(&PACKET[32..56])))
    );
    assert_eq!(
        packet.extensions,
        [
            Extension::hop_by_hop(hop_by_hop::SIBRA, Bytes::from_static(&[0; 5])),
            Extension::end_to_end(end_to_end::DEBUG, Bytes::from_static(&[5; 5])),
            Extension::end_to_end(end_to_end::SECURITY, Bytes::from_static(&[0; 5])),
        ]
    );

    let security = packet.security.as_ref().unwrap();
    assert_eq!(security.mode, SecurityMode::AesCmac);
    assert_eq!(security.metadata, [0; 4]);
    assert_eq!(security.authenticator, AUTHENTICATOR.as_slice());

    assert_eq!(
        packet.l4_header,
        L4Header::Udp(UdpHeader {
            port: ByEndpoint {
                source: 23,
                destination: 24,
            },
            length: 15,
            checksum: 0x296f,
        })
    );
    assert_eq!(
        packet.payload,
        Payload::Raw(Bytes::from_static(&[10, 20, 30, 40, 50, 60, 70]))
    );
}

#[test]
fn decoder_walks_extension_chain_in_wire_order() {
    let decoded = decode(Bytes::from_static(&PACKET)).unwrap();

    let kinds: Vec<_> = decoded
        .offsets
        .extensions
        .iter()
        .map(|extension| match extension.kind {
            ExtensionKind::Security { .. } => "security",
            ExtensionKind::HopByHop => "hop-by-hop",
            ExtensionKind::EndToEnd => "end-to-end",
        })
        .collect();
    assert_eq!(kinds, ["hop-by-hop", "security", "end-to-end", "end-to-end"]);
    assert_eq!(decoded.common_header.next_header, NextHeader::HopByHop);
    assert_eq!(decoded.offsets.authenticator().unwrap().range(), 72..88);
    assert_eq!(decoded.offsets.extension_block().range(), 56..104);
}

#[test]
fn decoded_legacy_packet_re_encodes_identically() {
    let decoded = decode(Bytes::from_static(&PACKET)).unwrap();
    let encoded = PacketEncoder::new(&FixedMac).encode(&decoded.packet).unwrap();
    assert_eq!(encoded, expected_encoding());
}

#[test]
fn every_truncation_fails() {
    for length in 0..PACKET.len() {
        let result = decode(Bytes::copy_from_slice(&PACKET[..length]));
        assert!(
            matches!(
                result,
                Err(DecodeError::Truncated { .. } | DecodeError::LengthMismatch { .. })
            ),
            "unexpected result for {length} bytes: {result:?}"
        );
    }
}
