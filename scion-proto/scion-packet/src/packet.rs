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

//! Representation of SCION packets and their wire format.
//!
//! A [`ScionPacket`] is encoded with a [`PacketEncoder`] and decoded with [`decode`], which also
//! returns the raw bytes and the [`Offsets`] of every section.
use bytes::Bytes;

mod error;
pub use error::{DecodeError, EncodeError, InadequateBufferSize, Section};

mod headers;
pub use headers::{AddressHeader, ByEndpoint, CommonHeader, NextHeader, RawPath};

mod checksum;
pub use checksum::{ChecksumDigest, MessageChecksum};

mod l4;
pub use l4::{L4Header, Payload, ScmpClass, ScmpHeader, ScmpPayload, UdpHeader};

mod encode;
pub use encode::PacketEncoder;

mod decode;
pub use decode::{DecodedPacket, decode};

pub mod extension;
pub use extension::{Extension, ExtensionClass};

pub mod security;
pub use security::{SecurityExtension, SecurityMode};

pub mod offsets;
pub use offsets::{Offsets, SectionOffsets};

pub mod layout;

use crate::address::ScionAddr;

/// A SCION packet.
///
/// Fields that are derived while encoding, such as lengths, checksums, path cursors and the
/// authenticator, are ignored by the encoder and filled in by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScionPacket {
    /// Source and destination.
    pub endhosts: ByEndpoint<ScionAddr>,
    /// The forwarding path; `None` for packets within an AS.
    pub path: Option<RawPath>,
    /// Hop-by-hop and end-to-end extensions, excluding the security extension.
    pub extensions: Vec<Extension>,
    /// The security extension, which authenticates the packet.
    pub security: Option<SecurityExtension>,
    /// The L4 header.
    pub l4_header: L4Header,
    /// The payload following the L4 header.
    pub payload: Payload,
}

impl ScionPacket {
    /// Creates a UDP packet without extensions.
    pub fn new_udp(
        endhosts: ByEndpoint<ScionAddr>,
        path: Option<RawPath>,
        port: ByEndpoint<u16>,
        payload: Bytes,
    ) -> Self {
        Self {
            endhosts,
            path,
            extensions: Vec::new(),
            security: None,
            l4_header: L4Header::Udp(UdpHeader::new(port.source, port.destination)),
            payload: Payload::Raw(payload),
        }
    }

    /// Creates an SCMP packet without extensions.
    pub fn new_scmp(
        endhosts: ByEndpoint<ScionAddr>,
        path: Option<RawPath>,
        header: ScmpHeader,
        payload: ScmpPayload,
    ) -> Self {
        Self {
            endhosts,
            path,
            extensions: Vec::new(),
            security: None,
            l4_header: L4Header::Scmp(header),
            payload: Payload::Scmp(payload),
        }
    }

    /// The address header of the packet.
    pub fn address_header(&self) -> AddressHeader {
        AddressHeader::new(&self.endhosts)
    }

    /// Encodes the packet, computing the authenticator with the
    /// [`DefaultMac`][crate::auth::DefaultMac].
    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        PacketEncoder::default().encode(self)
    }

    /// Decodes a packet, see [`decode`].
    pub fn decode(raw: Bytes) -> Result<DecodedPacket, DecodeError> {
        decode(raw)
    }
}
