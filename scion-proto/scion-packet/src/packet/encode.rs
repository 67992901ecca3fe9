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

//! Serialization of complete SCION packets.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use super::{
    CommonHeader, EncodeError, MessageChecksum, NextHeader, RawPath, ScionPacket,
    extension::{
        EncodedExtension, Extension, ExtensionClass, ExtensionError, ExtensionHeader, FixLengths,
        validate_extensions,
    },
    offsets::{ExtensionOffsets, Offsets, SectionOffsets},
    security::SecurityExtension,
};
use crate::{
    auth::{AuthError, DefaultMac, PacketMac},
    line::LINE_LEN,
    wire_encoding::WireEncode,
};

/// Encodes [`ScionPacket`]s, authenticating them with a [`PacketMac`] if they carry a security
/// extension.
///
/// Sections are written in the wire order common header, address header, path, hop-by-hop
/// extensions, security extension, end-to-end extensions, L4 header, payload. Extensions are
/// stably sorted by class, so hop-by-hop and end-to-end extensions keep their relative order.
#[derive(Clone, Copy)]
pub struct PacketEncoder<'a> {
    mac: &'a dyn PacketMac,
}

impl Default for PacketEncoder<'static> {
    fn default() -> Self {
        Self::new(&DefaultMac)
    }
}

impl<'a> PacketEncoder<'a> {
    /// Creates an encoder that computes authenticators with `mac`.
    pub fn new(mac: &'a dyn PacketMac) -> Self {
        Self { mac }
    }

    /// Encodes the packet into a newly allocated buffer.
    pub fn encode(&self, packet: &ScionPacket) -> Result<Bytes, EncodeError> {
        self.encode_with_offsets(packet).map(|(encoded, _)| encoded)
    }

    /// Encodes the packet into `buffer` and returns the number of bytes written.
    ///
    /// Nothing is written if the packet does not fit.
    pub fn encode_into(
        &self,
        packet: &ScionPacket,
        buffer: &mut [u8],
    ) -> Result<usize, EncodeError> {
        let encoded = self.encode(packet)?;
        let available = buffer.len();
        let target = buffer
            .get_mut(..encoded.len())
            .ok_or(EncodeError::BufferTooSmall {
                required: encoded.len(),
                available,
            })?;
        target.copy_from_slice(&encoded);
        Ok(encoded.len())
    }

    /// Encodes the packet and returns the positions of its sections alongside.
    pub fn encode_with_offsets(
        &self,
        packet: &ScionPacket,
    ) -> Result<(Bytes, Offsets), EncodeError> {
        let result = self.encode_sections(packet);
        match &result {
            Ok((encoded, offsets)) => trace!(
                length = encoded.len(),
                extensions = offsets.extensions.len(),
                payload = offsets.payload.len(),
                "encoded SCION packet"
            ),
            Err(error) => debug!(%error, "failed to encode SCION packet"),
        }
        result
    }

    fn encode_sections(&self, packet: &ScionPacket) -> Result<(Bytes, Offsets), EncodeError> {
        let address_header = packet.address_header();
        let address_bytes = address_header.encode_to_bytes();

        let empty_path = RawPath::default();
        let path = packet.path.as_ref().unwrap_or(&empty_path);
        let path_start = CommonHeader::LENGTH + address_bytes.len();
        let (info_cursor, hop_cursor) = path.cursors(path_start)?;
        let header_length = path_start + path.raw.len();
        let header_lines =
            u8::try_from(header_length / LINE_LEN).or(Err(EncodeError::HeaderTooLarge))?;

        let payload = packet.payload.encode_for(&packet.l4_header)?;
        let mut l4_header = packet.l4_header;
        l4_header.prepare(&address_header, &payload)?;
        let l4_bytes = l4_header.encode_to_bytes();

        let mut extensions = packet.extensions.clone();
        extensions.sort_by_key(|extension| extension.class);
        validate_extensions(&extensions)?;
        let split = extensions
            .partition_point(|extension| extension.class == ExtensionClass::HopByHop);
        let (hop_by_hop, end_to_end) = extensions.split_at(split);
        if packet.security.is_none()
            && end_to_end
                .iter()
                .any(|extension| extension.ext_type == SecurityExtension::TYPE)
        {
            return Err(ExtensionError::SecurityTypeMisplaced.into());
        }

        // The chain is built from the back: every section points to the one serialized before it.
        let next_header = l4_header.protocol();
        let (end_to_end, next_header) = encode_chain(end_to_end, next_header)?;
        let (security, next_header) = match &packet.security {
            Some(security) => (
                Some(security.encode(next_header)?),
                ExtensionClass::EndToEnd.into(),
            ),
            None => (None, next_header),
        };
        let (hop_by_hop, next_header) = encode_chain(hop_by_hop, next_header)?;

        let encoded_extensions: Vec<&EncodedExtension> = hop_by_hop
            .iter()
            .chain(security.iter())
            .chain(end_to_end.iter())
            .collect();
        let total_length = header_length
            + encoded_extensions
                .iter()
                .map(|extension| extension.bytes.len())
                .sum::<usize>()
            + l4_bytes.len()
            + payload.len();

        let common_header = CommonHeader {
            version: CommonHeader::VERSION,
            host_types: address_header.host_types(),
            total_length: u16::try_from(total_length).or(Err(EncodeError::PayloadTooLarge))?,
            header_length: header_lines,
            current_info_field: info_cursor,
            current_hop_field: hop_cursor,
            next_header,
        };

        let mut buffer = BytesMut::with_capacity(total_length);
        let mut offsets = Offsets {
            common_header: append(&mut buffer, &common_header.encode_to_bytes()),
            address_header: append(&mut buffer, &address_bytes),
            path: append(&mut buffer, &path.raw),
            ..Default::default()
        };
        for extension in encoded_extensions {
            offsets.extensions.push(ExtensionOffsets {
                kind: extension.kind,
                offsets: append(&mut buffer, &extension.bytes),
            });
        }
        offsets.l4_header = append(&mut buffer, &l4_bytes);
        offsets.payload = append(&mut buffer, &payload);

        if let Some(security) = &packet.security {
            self.authenticate(security, &offsets, &mut buffer)?;
        }
        Ok((buffer.freeze(), offsets))
    }

    /// Computes the authenticator over the finished packet and writes it into the window reserved
    /// by the security extension.
    fn authenticate(
        &self,
        security: &SecurityExtension,
        offsets: &Offsets,
        buffer: &mut BytesMut,
    ) -> Result<(), EncodeError> {
        let window = offsets
            .authenticator()
            .ok_or(AuthError::MissingSecurityExtension)?;
        let message = offsets.authenticated_bytes(buffer);
        let authenticator = self.mac.compute(security.mode, &security.key, &message)?;
        if authenticator.len() != window.len() {
            return Err(AuthError::InvalidAuthenticatorLength {
                expected: window.len(),
                actual: authenticator.len(),
            }
            .into());
        }
        buffer[window.range()].copy_from_slice(&authenticator);
        Ok(())
    }
}

fn append(buffer: &mut BytesMut, bytes: &[u8]) -> SectionOffsets {
    let offsets = SectionOffsets::new(buffer.len(), bytes.len());
    buffer.put_slice(bytes);
    offsets
}

/// Encodes extensions of one class, threading the next-header chain from the last extension to
/// the first. Returns the extensions in wire order and the new head of the chain.
fn encode_chain(
    extensions: &[Extension],
    mut next_header: NextHeader,
) -> Result<(Vec<EncodedExtension>, NextHeader), EncodeError> {
    let mut encoded = Vec::with_capacity(extensions.len());
    for extension in extensions.iter().rev() {
        let mut header =
            ExtensionHeader::new(next_header, extension.ext_type, extension.data.clone());
        encoded.push(header.encode(extension.class, FixLengths::Yes)?);
        next_header = extension.class.into();
    }
    encoded.reverse();
    Ok((encoded, next_header))
}
