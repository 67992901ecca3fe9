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

use serde::{Deserialize, Serialize};

use super::{AddressKind, AddressParseError};

/// A 48-bit SCION autonomous system (AS) number.
///
/// AS numbers up to `u32::MAX` are BGP AS numbers and are written in decimal. Larger numbers are
/// written as three colon-separated groups of 16 bits in hexadecimal, e.g. `ffaa:0:1101`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u64", into = "u64")]
#[repr(transparent)]
pub struct Asn(u64);

impl Asn {
    /// The AS number representing the wildcard AS.
    pub const WILDCARD: Self = Self(0);

    /// The number of bits in a SCION AS number.
    pub const BITS: u32 = 48;

    /// The largest valid AS number.
    pub const MAX_VALUE: u64 = (1 << Self::BITS) - 1;

    const BGP_ASN_MAX: u64 = u32::MAX as u64;
    const GROUP_BITS: u32 = 16;
    const GROUP_MAX: u64 = (1 << Self::GROUP_BITS) - 1;

    /// Creates a new AS number from a 32-bit value.
    pub const fn new(id: u32) -> Self {
        Self(id as u64)
    }

    /// Return the AS number as a 64-bit value.
    pub const fn to_u64(&self) -> u64 {
        self.0
    }

    /// Return true for the wildcard AS number.
    pub const fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD.0
    }
}

impl TryFrom<u64> for Asn {
    type Error = AddressParseError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > Self::MAX_VALUE {
            return Err(AddressKind::Asn.into());
        }
        Ok(Self(value))
    }
}

impl From<Asn> for u64 {
    fn from(value: Asn) -> Self {
        value.0
    }
}

impl Display for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 <= Self::BGP_ASN_MAX {
            return write!(f, "{}", self.0);
        }
        write!(
            f,
            "{:x}:{:x}:{:x}",
            (self.0 >> (2 * Self::GROUP_BITS)) & Self::GROUP_MAX,
            (self.0 >> Self::GROUP_BITS) & Self::GROUP_MAX,
            self.0 & Self::GROUP_MAX,
        )
    }
}

impl FromStr for Asn {
    type Err = AddressParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        if !string.contains(':') {
            return u32::from_str(string)
                .map(Asn::new)
                .or(Err(AddressKind::Asn.into()));
        }

        let mut value = 0u64;
        let mut groups = 0;
        for group in string.split(':') {
            let group = u16::from_str_radix(group, 16).or(Err(AddressKind::Asn))?;
            value = (value << Self::GROUP_BITS) | u64::from(group);
            groups += 1;
        }
        if groups != 3 {
            return Err(AddressKind::Asn.into());
        }
        Ok(Self(value))
    }
}
