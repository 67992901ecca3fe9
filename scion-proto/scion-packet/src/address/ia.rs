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
    str::FromStr,
};

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use super::{AddressKind, AddressParseError, Asn, Isd};

/// The combined ISD and AS identifier of a SCION AS.
///
/// On the wire it is a single big-endian 64-bit value with the ISD in the upper 16 bits.
///
/// # Examples
///
/// ```
/// # use scion_packet::address::{Asn, Isd, IsdAsn};
/// let ia: IsdAsn = "4096-ffaa:0:1101".parse().unwrap();
/// assert_eq!(ia.isd(), Isd::new(4096));
/// assert_eq!(ia.to_u64(), 0x1000_ffaa_0000_1101);
/// ```
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsdAsn {
    isd: Isd,
    asn: Asn,
}

impl IsdAsn {
    /// The encoded length in bytes.
    pub const WIRE_LENGTH: usize = 8;

    /// Creates a new ISD-AS pair.
    pub const fn new(isd: Isd, asn: Asn) -> Self {
        Self { isd, asn }
    }

    /// The ISD part.
    pub const fn isd(&self) -> Isd {
        self.isd
    }

    /// The AS part.
    pub const fn asn(&self) -> Asn {
        self.asn
    }

    /// Returns the 64-bit wire value.
    pub const fn to_u64(&self) -> u64 {
        ((self.isd.to_u16() as u64) << Asn::BITS) | self.asn.to_u64()
    }

    pub(crate) fn encode_to<T: BufMut>(&self, buffer: &mut T) {
        buffer.put_u64(self.to_u64());
    }

    /// Reads the pair from the buffer. The caller has to check that 8 bytes remain.
    pub(crate) fn decode_from<T: Buf>(data: &mut T) -> Self {
        Self::from(data.get_u64())
    }
}

impl From<u64> for IsdAsn {
    fn from(value: u64) -> Self {
        Self {
            isd: Isd::new((value >> Asn::BITS) as u16),
            // Masked to 48 bits, so the conversion cannot fail.
            asn: Asn::try_from(value & Asn::MAX_VALUE).unwrap_or(Asn::WILDCARD),
        }
    }
}

impl Display for IsdAsn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.isd, self.asn)
    }
}

impl FromStr for IsdAsn {
    type Err = AddressParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let (isd, asn) = string.split_once('-').ok_or(AddressKind::IsdAsn)?;
        Ok(Self::new(
            isd.parse().or(Err(AddressKind::IsdAsn))?,
            asn.parse().or(Err(AddressKind::IsdAsn))?,
        ))
    }
}
