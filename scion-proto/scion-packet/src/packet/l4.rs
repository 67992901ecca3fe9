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

//! L4 headers and payloads.
//!
//! Both supported protocols carry the total length of header and payload and an internet
//! checksum, see [`MessageChecksum`].
//!
//! ```text
//! UDP                                         SCMP
//! +-------------+-------------+               +-------------+-------------+
//! | Source port | Dest port   |               | Class       | Type        |
//! +-------------+-------------+               +-------------+-------------+
//! | Length      | Checksum    |               | Length      | Checksum    |
//! +-------------+-------------+               +-------------+-------------+
//!                                             | Timestamp (8 bytes)       |
//!                                             +---------------------------+
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{
    AddressHeader, ByEndpoint, ChecksumDigest, DecodeError, EncodeError, InadequateBufferSize,
    MessageChecksum, NextHeader, Section,
};
use crate::{
    line::LINE_LEN,
    utils::encoded_type,
    wire_encoding::{WireDecode, WireEncode},
};

fn check_remaining<T: Buf>(data: &T, expected: usize) -> Result<(), DecodeError> {
    if data.remaining() < expected {
        return Err(DecodeError::Truncated {
            section: Section::L4Header,
            expected,
            actual: data.remaining(),
        });
    }
    Ok(())
}

/// A UDP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UdpHeader {
    /// Source and destination ports.
    pub port: ByEndpoint<u16>,
    /// Length of header and payload in bytes. Set by the encoder.
    pub length: u16,
    /// Internet checksum. Set by the encoder.
    pub checksum: u16,
}

impl UdpHeader {
    /// Length of the header in bytes.
    pub const LENGTH: usize = 8;

    /// Creates a header for the given ports.
    pub fn new(source: u16, destination: u16) -> Self {
        Self {
            port: ByEndpoint {
                source,
                destination,
            },
            ..Default::default()
        }
    }
}

impl WireEncode for UdpHeader {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        Self::LENGTH
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        buffer.put_u16(self.port.source);
        buffer.put_u16(self.port.destination);
        buffer.put_u16(self.length);
        buffer.put_u16(self.checksum);
    }
}

impl<T: Buf> WireDecode<T> for UdpHeader {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        check_remaining(data, Self::LENGTH)?;
        Ok(Self {
            port: ByEndpoint {
                source: data.get_u16(),
                destination: data.get_u16(),
            },
            length: data.get_u16(),
            checksum: data.get_u16(),
        })
    }
}

encoded_type! {
    /// The class of an SCMP message.
    pub enum ScmpClass(u16) {
        /// General messages such as echo requests.
        General = 0,
        /// Routing errors.
        Routing = 1,
        /// Errors in the common header.
        CommonHeader = 2,
        /// Path errors.
        Path = 3,
        /// Extension errors.
        Extension = 4,
        /// SIBRA errors.
        Sibra = 5;
        /// An unassigned class.
        Other = _,
    }
}

/// An SCMP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScmpHeader {
    /// The message class.
    pub class: ScmpClass,
    /// The message type within the class.
    pub scmp_type: u16,
    /// Length of header and payload in bytes. Set by the encoder.
    pub length: u16,
    /// Internet checksum. Set by the encoder.
    pub checksum: u16,
    /// Creation time of the message in microseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ScmpHeader {
    /// Length of the header in bytes.
    pub const LENGTH: usize = 16;

    /// Creates a header of the given class and type.
    pub fn new(class: ScmpClass, scmp_type: u16, timestamp: u64) -> Self {
        Self {
            class,
            scmp_type,
            length: 0,
            checksum: 0,
            timestamp,
        }
    }
}

impl WireEncode for ScmpHeader {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        Self::LENGTH
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        buffer.put_u16(self.class.into());
        buffer.put_u16(self.scmp_type);
        buffer.put_u16(self.length);
        buffer.put_u16(self.checksum);
        buffer.put_u64(self.timestamp);
    }
}

impl<T: Buf> WireDecode<T> for ScmpHeader {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        check_remaining(data, Self::LENGTH)?;
        Ok(Self {
            class: data.get_u16().into(),
            scmp_type: data.get_u16(),
            length: data.get_u16(),
            checksum: data.get_u16(),
            timestamp: data.get_u64(),
        })
    }
}

/// The L4 header of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L4Header {
    /// A UDP datagram.
    Udp(UdpHeader),
    /// An SCMP message.
    Scmp(ScmpHeader),
}

impl L4Header {
    /// The length of header and payload as stored in the header.
    pub fn total_length(&self) -> u16 {
        match self {
            L4Header::Udp(header) => header.length,
            L4Header::Scmp(header) => header.length,
        }
    }

    fn set_total_length(&mut self, length: u16) {
        match self {
            L4Header::Udp(header) => header.length = length,
            L4Header::Scmp(header) => header.length = length,
        }
    }

    /// Sets the length and checksum for the given payload.
    pub(crate) fn prepare(
        &mut self,
        address_header: &AddressHeader,
        payload: &[u8],
    ) -> Result<(), EncodeError> {
        let length = u16::try_from(self.encoded_length() + payload.len())
            .or(Err(EncodeError::PayloadTooLarge))?;
        self.set_total_length(length);
        self.set_checksum(address_header, payload);
        Ok(())
    }

    /// Decodes the L4 header of the given protocol and the payload that follows it.
    ///
    /// The length field must cover exactly the remaining bytes and the checksum must match.
    pub(crate) fn decode_with_payload(
        data: &Bytes,
        protocol: NextHeader,
        address_header: &AddressHeader,
    ) -> Result<(Self, Payload), DecodeError> {
        let mut remaining = data.clone();
        let header = match protocol {
            NextHeader::Udp => L4Header::Udp(UdpHeader::decode(&mut remaining)?),
            NextHeader::Scmp => L4Header::Scmp(ScmpHeader::decode(&mut remaining)?),
            protocol => {
                return Err(DecodeError::UnsupportedProtocol {
                    section: Section::L4Header,
                    protocol,
                });
            }
        };

        let expected = usize::from(header.total_length());
        let actual = header.encoded_length() + remaining.len();
        if expected != actual {
            return Err(DecodeError::LengthMismatch {
                section: Section::L4Header,
                expected,
                actual,
            });
        }

        // The checksum covers the raw payload, so it is checked before the payload is reframed.
        let computed = header.calculate_checksum(address_header, &remaining);
        if computed != header.checksum() {
            return Err(DecodeError::ChecksumFailure {
                expected: header.checksum(),
                actual: computed,
            });
        }

        let payload = match header {
            L4Header::Udp(_) => Payload::Raw(remaining),
            L4Header::Scmp(_) => Payload::Scmp(ScmpPayload::decode(&remaining)?),
        };
        Ok((header, payload))
    }
}

impl From<UdpHeader> for L4Header {
    fn from(value: UdpHeader) -> Self {
        L4Header::Udp(value)
    }
}

impl From<ScmpHeader> for L4Header {
    fn from(value: ScmpHeader) -> Self {
        L4Header::Scmp(value)
    }
}

impl WireEncode for L4Header {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        match self {
            L4Header::Udp(header) => header.encoded_length(),
            L4Header::Scmp(header) => header.encoded_length(),
        }
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        match self {
            L4Header::Udp(header) => header.encode_to_unchecked(buffer),
            L4Header::Scmp(header) => header.encode_to_unchecked(buffer),
        }
    }
}

impl MessageChecksum for L4Header {
    fn checksum(&self) -> u16 {
        match self {
            L4Header::Udp(header) => header.checksum,
            L4Header::Scmp(header) => header.checksum,
        }
    }

    fn set_checksum_value(&mut self, checksum: u16) {
        match self {
            L4Header::Udp(header) => header.checksum = checksum,
            L4Header::Scmp(header) => header.checksum = checksum,
        }
    }

    fn protocol(&self) -> NextHeader {
        match self {
            L4Header::Udp(_) => NextHeader::Udp,
            L4Header::Scmp(_) => NextHeader::Scmp,
        }
    }

    fn add_header_to_digest(&self, digest: &mut ChecksumDigest) {
        match self {
            L4Header::Udp(header) => {
                digest
                    .add_u16(header.port.source)
                    .add_u16(header.port.destination)
                    .add_u16(header.length);
            }
            L4Header::Scmp(header) => {
                digest
                    .add_u16(header.class.into())
                    .add_u16(header.scmp_type)
                    .add_u16(header.length)
                    .add_slice(&header.timestamp.to_be_bytes());
            }
        }
    }
}

/// The payload following the L4 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Opaque bytes, the payload of UDP datagrams.
    Raw(Bytes),
    /// The structured payload of SCMP messages.
    Scmp(ScmpPayload),
}

impl Payload {
    /// Encodes the payload, which must fit the given L4 header.
    pub(crate) fn encode_for(&self, header: &L4Header) -> Result<Bytes, EncodeError> {
        match (header, self) {
            (L4Header::Udp(_), Payload::Raw(raw)) => Ok(raw.clone()),
            (L4Header::Scmp(_), Payload::Scmp(payload)) => payload.encode(),
            _ => Err(EncodeError::PayloadMismatch),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(value: Bytes) -> Self {
        Payload::Raw(value)
    }
}

/// The payload of an SCMP message.
///
/// It quotes the sections of the packet that caused the message. An 8-byte meta header gives the
/// length of each section in lines, so every section must be line aligned:
///
/// ```text
/// +------+------+------+------+------+------+---------+----------+
/// | Info | Cmn  | Addr | Path | Exts | L4   | L4Proto | Reserved |
/// +------+------+------+------+------+------+---------+----------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmpPayload {
    /// Message specific information.
    pub info: Bytes,
    /// The quoted common header.
    pub common_header: Bytes,
    /// The quoted address header.
    pub address_header: Bytes,
    /// The quoted path.
    pub path: Bytes,
    /// The quoted extensions.
    pub extensions: Bytes,
    /// The quoted L4 header.
    pub l4_header: Bytes,
    /// The protocol of the quoted L4 header.
    pub l4_protocol: NextHeader,
}

impl ScmpPayload {
    /// Length of the meta header in bytes.
    pub const META_LENGTH: usize = 8;

    const SECTION_COUNT: usize = 6;
    const PROTOCOL_INDEX: usize = 6;
    const RESERVED_INDEX: usize = 7;

    fn sections(&self) -> [&Bytes; Self::SECTION_COUNT] {
        [
            &self.info,
            &self.common_header,
            &self.address_header,
            &self.path,
            &self.extensions,
            &self.l4_header,
        ]
    }

    /// Length of the encoded payload in bytes.
    pub fn encoded_length(&self) -> usize {
        Self::META_LENGTH + self.sections().iter().map(|section| section.len()).sum::<usize>()
    }

    fn encode(&self) -> Result<Bytes, EncodeError> {
        let mut meta = [0u8; Self::META_LENGTH];
        for (lines, section) in meta.iter_mut().zip(self.sections()) {
            if section.len() % LINE_LEN != 0 {
                return Err(EncodeError::Misaligned {
                    section: Section::Payload,
                    length: section.len(),
                });
            }
            *lines =
                u8::try_from(section.len() / LINE_LEN).or(Err(EncodeError::PayloadTooLarge))?;
        }
        meta[Self::PROTOCOL_INDEX] = self.l4_protocol.into();

        let mut buffer = BytesMut::with_capacity(self.encoded_length());
        buffer.put_slice(&meta);
        for section in self.sections() {
            buffer.put_slice(section);
        }
        Ok(buffer.freeze())
    }

    fn decode(data: &Bytes) -> Result<Self, DecodeError> {
        if data.len() < Self::META_LENGTH {
            return Err(DecodeError::Truncated {
                section: Section::Payload,
                expected: Self::META_LENGTH,
                actual: data.len(),
            });
        }
        let reserved = data[Self::RESERVED_INDEX];
        if reserved != 0 {
            return Err(DecodeError::InvalidPadding {
                section: Section::Payload,
                position: Self::RESERVED_INDEX,
                value: reserved,
            });
        }

        let expected = Self::META_LENGTH
            + data[..Self::SECTION_COUNT]
                .iter()
                .map(|lines| usize::from(*lines) * LINE_LEN)
                .sum::<usize>();
        if data.len() < expected {
            return Err(DecodeError::Truncated {
                section: Section::Payload,
                expected,
                actual: data.len(),
            });
        }
        if data.len() > expected {
            return Err(DecodeError::LengthMismatch {
                section: Section::Payload,
                expected,
                actual: data.len(),
            });
        }

        let mut offset = Self::META_LENGTH;
        let mut next_section = |index: usize| {
            let length = usize::from(data[index]) * LINE_LEN;
            let section = data.slice(offset..offset + length);
            offset += length;
            section
        };
        Ok(Self {
            info: next_section(0),
            common_header: next_section(1),
            address_header: next_section(2),
            path: next_section(3),
            extensions: next_section(4),
            l4_header: next_section(5),
            l4_protocol: data[Self::PROTOCOL_INDEX].into(),
        })
    }
}
