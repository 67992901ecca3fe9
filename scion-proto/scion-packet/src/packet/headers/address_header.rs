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

use bytes::BufMut;

use super::ByEndpoint;
use crate::{
    address::{HostAddr, HostType, IsdAsn, MalformedHostAddr, ScionAddr},
    line::{first_nonzero, padded_length, put_padding},
    packet::{DecodeError, InadequateBufferSize, Section},
    wire_encoding::WireEncode,
};

/// The source and destination addresses of a packet.
///
/// Encoded as destination ISD-AS, source ISD-AS, destination host, source host, followed by zero
/// padding to the next line boundary. The host address lengths are given by the host types in the
/// common header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressHeader {
    /// The ISD-AS of both endpoints.
    pub isd_asn: ByEndpoint<IsdAsn>,
    /// The host addresses of both endpoints.
    pub host: ByEndpoint<HostAddr>,
}

impl AddressHeader {
    const STATIC_LENGTH: usize = 2 * IsdAsn::WIRE_LENGTH;

    /// Creates the header for the given endpoints.
    pub fn new(endhosts: &ByEndpoint<ScionAddr>) -> Self {
        Self {
            isd_asn: endhosts.map(ScionAddr::isd_asn),
            host: endhosts.map(ScionAddr::host),
        }
    }

    /// The source endpoint.
    pub fn source(&self) -> ScionAddr {
        ScionAddr::new(self.isd_asn.source, self.host.source)
    }

    /// The destination endpoint.
    pub fn destination(&self) -> ScionAddr {
        ScionAddr::new(self.isd_asn.destination, self.host.destination)
    }

    /// Both endpoints.
    pub fn endhosts(&self) -> ByEndpoint<ScionAddr> {
        ByEndpoint {
            source: self.source(),
            destination: self.destination(),
        }
    }

    /// The host types to be stored in the common header.
    pub fn host_types(&self) -> ByEndpoint<HostType> {
        self.host.map(HostAddr::host_type)
    }

    /// The length of the header without trailing padding.
    pub fn unpadded_length(&self) -> usize {
        Self::STATIC_LENGTH
            + self.host.destination.encoded_length()
            + self.host.source.encoded_length()
    }

    /// Decodes the header from the start of `data`, given the host types of the common header.
    ///
    /// The padding has to be zero. On success, the header occupies
    /// [`encoded_length`][WireEncode::encoded_length] bytes of `data`.
    pub fn decode(data: &[u8], host_types: ByEndpoint<HostType>) -> Result<Self, DecodeError> {
        let malformed = |reason: MalformedHostAddr| DecodeError::MalformedAddress {
            section: Section::AddressHeader,
            reason,
        };
        let host_length = |host_type: HostType| {
            host_type
                .encoded_length()
                .ok_or(malformed(MalformedHostAddr::UnsupportedType(host_type)))
        };

        let unpadded = Self::STATIC_LENGTH
            + host_length(host_types.destination)?
            + host_length(host_types.source)?;
        let expected = padded_length(unpadded);
        if data.len() < expected {
            return Err(DecodeError::Truncated {
                section: Section::AddressHeader,
                expected,
                actual: data.len(),
            });
        }

        let mut buffer = &data[..unpadded];
        let isd_asn = ByEndpoint {
            destination: IsdAsn::decode_from(&mut buffer),
            source: IsdAsn::decode_from(&mut buffer),
        };
        let host = ByEndpoint {
            destination: HostAddr::decode(&mut buffer, host_types.destination).map_err(malformed)?,
            source: HostAddr::decode(&mut buffer, host_types.source).map_err(malformed)?,
        };

        if let Some((index, value)) = first_nonzero(&data[unpadded..expected]) {
            return Err(DecodeError::InvalidPadding {
                section: Section::AddressHeader,
                position: unpadded + index,
                value,
            });
        }

        Ok(Self { isd_asn, host })
    }
}

impl From<ByEndpoint<ScionAddr>> for AddressHeader {
    fn from(endhosts: ByEndpoint<ScionAddr>) -> Self {
        Self::new(&endhosts)
    }
}

impl WireEncode for AddressHeader {
    type Error = InadequateBufferSize;

    #[inline]
    fn encoded_length(&self) -> usize {
        padded_length(self.unpadded_length())
    }

    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T) {
        self.isd_asn.destination.encode_to(buffer);
        self.isd_asn.source.encode_to(buffer);
        self.host.destination.encode_to(buffer);
        self.host.source.encode_to(buffer);
        put_padding(buffer, self.encoded_length() - self.unpadded_length());
    }
}
