// Copyright 2025 Mysten Labs
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

//! Parsing of complete SCION packets.

use bytes::Bytes;
use tracing::{debug, trace};

use super::{
    AddressHeader, CommonHeader, DecodeError, L4Header, NextHeader, RawPath, ScionPacket, Section,
    extension::{Extension, ExtensionClass, ExtensionError, ExtensionHeader, validate_extensions},
    offsets::{ExtensionKind, ExtensionOffsets, Offsets, SectionOffsets},
    security::SecurityExtension,
};
use crate::{
    auth::{AuthError, PacketMac},
    wire_encoding::{WireDecode, WireEncode},
};

/// A packet decoded from raw bytes, together with the bytes and the positions of its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    /// The decoded packet.
    pub packet: ScionPacket,
    /// The common header as found on the wire.
    pub common_header: CommonHeader,
    /// Positions of the sections in [`raw`][Self::raw].
    pub offsets: Offsets,
    /// The encoded packet.
    pub raw: Bytes,
}

impl DecodedPacket {
    /// The bytes covered by the authenticator of the security extension.
    pub fn authenticated_bytes(&self) -> Vec<u8> {
        self.offsets.authenticated_bytes(&self.raw)
    }

    /// Verifies the authenticator of the security extension with the given key.
    pub fn verify(&self, mac: &dyn PacketMac, key: &[u8]) -> Result<(), AuthError> {
        let security = self
            .packet
            .security
            .as_ref()
            .ok_or(AuthError::MissingSecurityExtension)?;
        mac.verify(
            security.mode,
            key,
            &self.authenticated_bytes(),
            &security.authenticator,
        )
    }
}

/// One element of the extension chain.
enum ChainElement {
    Generic(Extension),
    Security(SecurityExtension),
}

/// Decodes a packet.
///
/// The input must contain exactly one packet. Decoding stops at the first malformed section.
pub fn decode(raw: Bytes) -> Result<DecodedPacket, DecodeError> {
    let result = decode_sections(raw);
    match &result {
        Ok(decoded) => trace!(
            length = decoded.raw.len(),
            extensions = decoded.offsets.extensions.len(),
            payload = decoded.offsets.payload.len(),
            "decoded SCION packet"
        ),
        Err(error) => debug!(
            %error,
            section = ?error.section(),
            "failed to decode SCION packet"
        ),
    }
    result
}

fn decode_sections(raw: Bytes) -> Result<DecodedPacket, DecodeError> {
    let common_header = CommonHeader::decode(&mut &raw[..])?;
    let total_length = usize::from(common_header.total_length);
    if total_length != raw.len() {
        return Err(DecodeError::LengthMismatch {
            section: Section::CommonHeader,
            expected: total_length,
            actual: raw.len(),
        });
    }
    let header_length = common_header.header_length_bytes();
    if raw.len() < header_length {
        return Err(DecodeError::Truncated {
            section: Section::CommonHeader,
            expected: header_length,
            actual: raw.len(),
        });
    }

    let address_start = CommonHeader::LENGTH;
    let address_header = AddressHeader::decode(
        raw.get(address_start..header_length).unwrap_or_default(),
        common_header.host_types,
    )?;
    let mut offsets = Offsets {
        common_header: SectionOffsets::new(0, CommonHeader::LENGTH),
        address_header: SectionOffsets::new(address_start, address_header.encoded_length()),
        ..Default::default()
    };

    let path_start = offsets.address_header.end;
    let path = RawPath::from_cursors(
        raw.slice(path_start..header_length),
        path_start,
        common_header.current_info_field,
        common_header.current_hop_field,
    )?;
    offsets.path = SectionOffsets::new(path_start, path.raw.len());

    let mut cursor = header_length;
    let mut next_header = common_header.next_header;
    let mut extensions = Vec::new();
    let mut security = None;
    while let Some(class) = ExtensionClass::from_next_header(next_header) {
        let (element, extension_offsets, following) =
            decode_extension(&raw, cursor, class, &offsets, security.is_some())?;
        match element {
            ChainElement::Generic(extension) => extensions.push(extension),
            ChainElement::Security(extension) => security = Some(extension),
        }
        offsets.extensions.push(extension_offsets);
        cursor = extension_offsets.offsets.end;
        next_header = following;
    }
    validate_extensions(&extensions)?;

    let (l4_header, payload) =
        L4Header::decode_with_payload(&raw.slice(cursor..), next_header, &address_header)?;
    offsets.l4_header = SectionOffsets::new(cursor, l4_header.encoded_length());
    offsets.payload = SectionOffsets {
        start: offsets.l4_header.end,
        end: raw.len(),
    };

    Ok(DecodedPacket {
        packet: ScionPacket {
            endhosts: address_header.endhosts(),
            path: (!path.is_empty()).then_some(path),
            extensions,
            security,
            l4_header,
            payload,
        },
        common_header,
        offsets,
        raw,
    })
}

/// Decodes the extension starting at `start`.
///
/// The first end-to-end extension of the security type is the security extension. Hop-by-hop
/// extensions must not follow end-to-end extensions.
fn decode_extension(
    raw: &Bytes,
    start: usize,
    class: ExtensionClass,
    offsets: &Offsets,
    has_security: bool,
) -> Result<(ChainElement, ExtensionOffsets, NextHeader), DecodeError> {
    let after_end_to_end = offsets
        .extensions
        .iter()
        .any(|extension| extension.kind != ExtensionKind::HopByHop);
    if class == ExtensionClass::HopByHop && after_end_to_end {
        return Err(ExtensionError::HopByHopAfterEndToEnd.into());
    }

    let (header, length) = ExtensionHeader::decode(&raw.slice(start..))?;
    let next_header = header.next_header;
    let (element, kind) = match class {
        ExtensionClass::EndToEnd if !has_security && header.ext_type == SecurityExtension::TYPE => {
            let security = SecurityExtension::from_header(&header)?;
            let authenticator = SectionOffsets::new(
                ExtensionHeader::SUB_HEADER_LEN + security.auth_start_offset(),
                security.authenticator.len(),
            );
            (
                ChainElement::Security(security),
                ExtensionKind::Security { authenticator },
            )
        }
        ExtensionClass::EndToEnd => (
            ChainElement::Generic(Extension::end_to_end(header.ext_type, header.data)),
            ExtensionKind::EndToEnd,
        ),
        ExtensionClass::HopByHop => (
            ChainElement::Generic(Extension::hop_by_hop(header.ext_type, header.data)),
            ExtensionKind::HopByHop,
        ),
    };

    let extension_offsets = ExtensionOffsets {
        kind,
        offsets: SectionOffsets::new(start, length),
    };
    Ok((element, extension_offsets, next_header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        address::HostAddr,
        packet::{ByEndpoint, Payload},
        test_utils::parse,
    };

    fn udp_packet() -> ScionPacket {
        ScionPacket::new_udp(
            ByEndpoint {
                source: parse!("1-ff00:0:110,10.0.0.1"),
                destination: parse!("1-ff00:0:111,10.0.0.2"),
            },
            None,
            ByEndpoint {
                source: 1500,
                destination: 1501,
            },
            Bytes::from_static(&[1, 2, 3, 4, 5, 6, 7]),
        )
    }

    fn encoded(packet: &ScionPacket) -> Vec<u8> {
        packet.encode().unwrap().to_vec()
    }

    #[test]
    fn records_section_offsets() {
        let decoded = decode(Bytes::from(encoded(&udp_packet()))).unwrap();
        assert_eq!(decoded.offsets.common_header, SectionOffsets::new(0, 8));
        assert_eq!(decoded.offsets.address_header, SectionOffsets::new(8, 24));
        assert_eq!(decoded.offsets.path, SectionOffsets::new(32, 0));
        assert_eq!(decoded.offsets.extension_block(), SectionOffsets::new(32, 0));
        assert_eq!(decoded.offsets.l4_header, SectionOffsets::new(32, 8));
        assert_eq!(decoded.offsets.payload, SectionOffsets::new(40, 7));
        assert_eq!(
            decoded.packet.payload,
            Payload::Raw(Bytes::from_static(&[1, 2, 3, 4, 5, 6, 7]))
        );
        assert_eq!(
            decoded.packet.endhosts.source.host(),
            HostAddr::V4([10, 0, 0, 1].into())
        );
    }

    #[test]
    fn rejects_total_length_mismatch() {
        let mut raw = encoded(&udp_packet());
        raw.pop();
        assert_eq!(
            decode(Bytes::from(raw)),
            Err(DecodeError::LengthMismatch {
                section: Section::CommonHeader,
                expected: 47,
                actual: 46,
            })
        );
    }

    #[test]
    fn rejects_header_length_beyond_buffer() {
        let mut raw = encoded(&udp_packet());
        raw[4] = 23;
        assert_eq!(
            decode(Bytes::from(raw)).map_err(|error| error.to_string()),
            Err("common header: expected 184 bytes, actual buffer 47".to_owned())
        );
    }

    #[test]
    fn rejects_header_length_shorter_than_address_header() {
        let mut raw = encoded(&udp_packet());
        raw[4] = 2;
        assert_eq!(
            decode(Bytes::from(raw)),
            Err(DecodeError::Truncated {
                section: Section::AddressHeader,
                expected: 24,
                actual: 8,
            })
        );
    }

    #[test]
    fn rejects_hop_by_hop_after_end_to_end() {
        let mut packet = udp_packet();
        packet.extensions = vec![Extension::end_to_end(1, Bytes::from_static(&[0; 5]))];
        let mut raw = encoded(&packet);
        // Point the end-to-end extension to a hop-by-hop extension made of the L4 header.
        raw[32] = u8::from(NextHeader::HopByHop);
        assert_eq!(
            decode(Bytes::from(raw)),
            Err(DecodeError::InvalidExtensions(
                ExtensionError::HopByHopAfterEndToEnd
            ))
        );
    }

    #[test]
    fn rejects_unknown_host_type() {
        let mut raw = encoded(&udp_packet());
        raw[1] = (raw[1] & 0xc0) | 0x3f;
        assert!(matches!(
            decode(Bytes::from(raw)),
            Err(DecodeError::MalformedAddress {
                section: Section::AddressHeader,
                ..
            })
        ));
    }

    #[test]
    fn verify_requires_security_extension() {
        let decoded = decode(Bytes::from(encoded(&udp_packet()))).unwrap();
        assert_eq!(
            decoded.verify(&crate::auth::DefaultMac, &[0; 16]),
            Err(AuthError::MissingSecurityExtension)
        );
    }
}
