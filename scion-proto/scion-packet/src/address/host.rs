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

use std::{
    fmt::{Display, Formatter},
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use super::{AddressKind, AddressParseError, ServiceAddr};
use crate::utils::encoded_type;

encoded_type! {
    /// The type of a host address, as stored in 6 bits of the common header.
    pub enum HostType(u8) {
        /// No host address.
        None = 0,
        /// IPv4 address.
        Ipv4 = 1,
        /// IPv6 address.
        Ipv6 = 2,
        /// SCION service address.
        Svc = 3;
        /// An unassigned host type.
        Unknown = 4..=255,
    }
}

impl HostType {
    /// The largest value that fits into the 6-bit field of the common header.
    pub const MAX_VALUE: u8 = 0x3f;

    /// Returns the encoded length of an address of this type, or `None` for unknown types.
    pub const fn encoded_length(&self) -> Option<usize> {
        match self {
            HostType::None => Some(0),
            HostType::Ipv4 => Some(4),
            HostType::Ipv6 => Some(16),
            HostType::Svc => Some(ServiceAddr::WIRE_LENGTH),
            HostType::Unknown(_) => None,
        }
    }
}

/// Error returned when a host address cannot be read from the wire.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum MalformedHostAddr {
    /// The host type has no known encoding.
    #[error("unsupported host address type {0:?}")]
    UnsupportedType(HostType),
    /// Fewer bytes remain than the host type requires.
    #[error("host address of type {host_type:?} needs {expected} bytes, {actual} available")]
    Truncated {
        /// The host type being decoded.
        host_type: HostType,
        /// Encoded length of the host type.
        expected: usize,
        /// Bytes that were available.
        actual: usize,
    },
}

/// The AS-local address of a host.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HostAddr {
    /// No address.
    None,
    /// An IPv4 host.
    V4(Ipv4Addr),
    /// An IPv6 host.
    V6(Ipv6Addr),
    /// A SCION service.
    Svc(ServiceAddr),
}

impl HostAddr {
    /// The type tag of this address.
    pub const fn host_type(&self) -> HostType {
        match self {
            HostAddr::None => HostType::None,
            HostAddr::V4(_) => HostType::Ipv4,
            HostAddr::V6(_) => HostType::Ipv6,
            HostAddr::Svc(_) => HostType::Svc,
        }
    }

    /// The number of bytes this address occupies on the wire.
    pub const fn encoded_length(&self) -> usize {
        match self {
            HostAddr::None => 0,
            HostAddr::V4(_) => 4,
            HostAddr::V6(_) => 16,
            HostAddr::Svc(_) => ServiceAddr::WIRE_LENGTH,
        }
    }

    pub(crate) fn encode_to<T: BufMut>(&self, buffer: &mut T) {
        match self {
            HostAddr::None => (),
            HostAddr::V4(ip) => buffer.put_slice(&ip.octets()),
            HostAddr::V6(ip) => buffer.put_slice(&ip.octets()),
            HostAddr::Svc(service) => buffer.put_u16(service.0),
        }
    }

    /// Reads a host address of the given type from the front of `data`.
    pub fn decode<T: Buf>(data: &mut T, host_type: HostType) -> Result<Self, MalformedHostAddr> {
        let expected = host_type
            .encoded_length()
            .ok_or(MalformedHostAddr::UnsupportedType(host_type))?;
        if data.remaining() < expected {
            return Err(MalformedHostAddr::Truncated {
                host_type,
                expected,
                actual: data.remaining(),
            });
        }

        let address = match host_type {
            HostType::Ipv4 => HostAddr::V4(data.get_u32().into()),
            HostType::Ipv6 => HostAddr::V6(data.get_u128().into()),
            HostType::Svc => HostAddr::Svc(ServiceAddr(data.get_u16())),
            _ => HostAddr::None,
        };
        Ok(address)
    }
}

impl From<IpAddr> for HostAddr {
    fn from(value: IpAddr) -> Self {
        match value {
            IpAddr::V4(ip) => HostAddr::V4(ip),
            IpAddr::V6(ip) => HostAddr::V6(ip),
        }
    }
}

impl From<ServiceAddr> for HostAddr {
    fn from(value: ServiceAddr) -> Self {
        HostAddr::Svc(value)
    }
}

impl Display for HostAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HostAddr::None => f.write_str("<none>"),
            HostAddr::V4(ip) => ip.fmt(f),
            HostAddr::V6(ip) => ip.fmt(f),
            HostAddr::Svc(service) => service.fmt(f),
        }
    }
}

impl FromStr for HostAddr {
    type Err = AddressParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        if string == "<none>" {
            return Ok(HostAddr::None);
        }
        if let Ok(ip) = IpAddr::from_str(string) {
            return Ok(ip.into());
        }
        ServiceAddr::from_str(string)
            .map(HostAddr::Svc)
            .or(Err(AddressKind::Host.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{param_test, parse};

    param_test! {
        wire_form: [
            none: (HostAddr::None, &[]),
            ipv4: (parse!("1.1.1.100"), &[1, 1, 1, 100]),
            ipv6: (parse!("::1"), &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]),
            service: (HostAddr::Svc(ServiceAddr::PATH), &[0, 1]),
        ]
    }
    fn wire_form(address: HostAddr, encoded: &[u8]) {
        let mut buffer = Vec::new();
        address.encode_to(&mut buffer);
        assert_eq!(buffer, encoded);
        assert_eq!(address.encoded_length(), encoded.len());
        assert_eq!(address.host_type().encoded_length(), Some(encoded.len()));

        let decoded = HostAddr::decode(&mut &buffer[..], address.host_type()).unwrap();
        assert_eq!(decoded, address);
    }

    #[test]
    fn unknown_type_has_no_encoding() {
        assert_eq!(
            HostAddr::decode(&mut &[0u8; 16][..], HostType::from(9)),
            Err(MalformedHostAddr::UnsupportedType(HostType::Unknown(9)))
        );
    }

    #[test]
    fn truncated_address() {
        assert_eq!(
            HostAddr::decode(&mut &[10u8, 0][..], HostType::Ipv4),
            Err(MalformedHostAddr::Truncated {
                host_type: HostType::Ipv4,
                expected: 4,
                actual: 2,
            })
        );
    }
}
