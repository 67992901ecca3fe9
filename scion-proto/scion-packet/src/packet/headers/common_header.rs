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

use bytes::{Buf, BufMut};

use super::ByEndpoint;
use crate::{
    address::HostType,
    line::LINE_LEN,
    packet::{DecodeError, InadequateBufferSize, Section},
    utils::encoded_type,
    wire_encoding::{WireDecode, WireEncode},
};

encoded_type! {
    /// The protocol of the section that follows a header.
    ///
    /// Besides L4 protocols, this names the class of the next extension.
    pub enum NextHeader(u8) {
        /// A hop-by-hop extension.
        HopByHop = 0,
        /// SCMP control message.
        Scmp = 1,
        /// TCP, which this crate does not decode.
        Tcp = 6,
        /// UDP datagram.
        Udp = 17,
        /// An end-to-end extension.
        EndToEnd = 222;
        /// Any other protocol.
        Other = _,
    }
}

/// The fixed 8-byte header at the start of every SCION packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonHeader {
    /// Header format version, 4 bits.
    pub version: u8,
    /// Types of the destination and source host addresses, 6 bits each.
    pub host_types: ByEndpoint<HostType>,
    /// Length of the entire packet in bytes.
    pub total_length: u16,
    /// Length of the common header, address header and path in lines.
    pub header_length: u8,
    /// Current info field, in lines from the start of the packet.
    pub current_info_field: u8,
    /// Current hop field, in lines from the start of the packet.
    pub current_hop_field: u8,
    /// Protocol of the first section after the path.
    pub next_header: NextHeader,
}

impl CommonHeader {
    /// The length of the common header in bytes.
    pub const LENGTH: usize = 8;

    /// The only supported format version.
    pub const VERSION: u8 = 0;

    /// The header length in bytes.
    pub fn header_length_bytes(&self) -> usize {
        usize::from(self.header_length) * LINE_LEN
    }
}

impl WireEncode for CommonHeader {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        Self::LENGTH
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        let mask = u16::from(HostType::MAX_VALUE);
        let destination = u16::from(u8::from(self.host_types.destination)) & mask;
        let source = u16::from(u8::from(self.host_types.source)) & mask;
        buffer.put_u16((u16::from(self.version & 0x0f) << 12) | (destination << 6) | source);
        buffer.put_u16(self.total_length);
        buffer.put_u8(self.header_length);
        buffer.put_u8(self.current_info_field);
        buffer.put_u8(self.current_hop_field);
        buffer.put_u8(self.next_header.into());
    }
}

impl<T: Buf> WireDecode<T> for CommonHeader {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < Self::LENGTH {
            return Err(DecodeError::Truncated {
                section: Section::CommonHeader,
                expected: Self::LENGTH,
                actual: data.remaining(),
            });
        }

        let types = data.get_u16();
        let version = (types >> 12) as u8;
        if version != Self::VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let mask = u16::from(HostType::MAX_VALUE);

        Ok(Self {
            version,
            host_types: ByEndpoint {
                destination: HostType::from(((types >> 6) & mask) as u8),
                source: HostType::from((types & mask) as u8),
            },
            total_length: data.get_u16(),
            header_length: data.get_u8(),
            current_info_field: data.get_u8(),
            current_hop_field: data.get_u8(),
            next_header: data.get_u8().into(),
        })
    }
}
