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

/// A 16-bit identifier of a SCION Isolation Domain.
///
/// It occupies the upper 16 bits of an encoded [`IsdAsn`][super::IsdAsn].
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Isd(pub u16);

impl Isd {
    /// The SCION ISD number representing the wildcard ISD.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scion_packet::address::Isd;
    /// assert_eq!(Isd::WILDCARD, Isd::new(0));
    /// ```
    pub const WILDCARD: Self = Self(0);

    /// The number of bits in a SCION ISD number.
    pub const BITS: u32 = u16::BITS;

    /// Creates a new ISD from a 16-bit value.
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Return the identifier as a 16-bit value.
    pub const fn to_u16(&self) -> u16 {
        self.0
    }

    /// Return true for the wildcard ISD.
    pub const fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD.0
    }
}

impl Display for Isd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Isd {
    type Err = AddressParseError;

    /// Parses an ISD from a decimal string.
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        u16::from_str(string)
            .map(Isd::new)
            .or(Err(AddressKind::Isd.into()))
    }
}
