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

/// A SCION service address.
///
/// Service addresses identify a class of infrastructure service within an AS instead of a
/// specific host. The upper bit selects multicast delivery.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ServiceAddr(pub u16);

impl ServiceAddr {
    /// The encoded length in bytes.
    pub const WIRE_LENGTH: usize = 2;

    /// Beacon service, anycast.
    pub const BEACON: Self = Self(0x0000);
    /// Path service, anycast.
    pub const PATH: Self = Self(0x0001);
    /// Certificate service, anycast.
    pub const CERTIFICATE: Self = Self(0x0002);
    /// SIBRA service, anycast.
    pub const SIBRA: Self = Self(0x0003);
    /// No service.
    pub const NONE: Self = Self(0xffff);

    const MULTICAST_FLAG: u16 = 0x8000;

    /// Returns true if the address requests delivery to all instances of the service.
    pub const fn is_multicast(&self) -> bool {
        self.0 & Self::MULTICAST_FLAG != 0
    }

    /// Returns the multicast variant of the address.
    pub const fn multicast(self) -> Self {
        Self(self.0 | Self::MULTICAST_FLAG)
    }

    /// Returns the anycast variant of the address.
    pub const fn anycast(self) -> Self {
        Self(self.0 & !Self::MULTICAST_FLAG)
    }
}

impl Display for ServiceAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if *self == Self::NONE {
            return f.write_str("NONE");
        }
        let name = match self.anycast() {
            Self::BEACON => "BS",
            Self::PATH => "PS",
            Self::CERTIFICATE => "CS",
            Self::SIBRA => "SB",
            _ => return write!(f, "SVC:{:#06x}", self.0),
        };
        let suffix = if self.is_multicast() { "M" } else { "A" };
        write!(f, "{name}_{suffix}")
    }
}

impl FromStr for ServiceAddr {
    type Err = AddressParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        if string == "NONE" {
            return Ok(Self::NONE);
        }
        if let Some(hex) = string.strip_prefix("SVC:0x") {
            return u16::from_str_radix(hex, 16)
                .map(Self)
                .or(Err(AddressKind::Service.into()));
        }

        let (name, suffix) = string.split_once('_').ok_or(AddressKind::Service)?;
        let service = match name {
            "BS" => Self::BEACON,
            "PS" => Self::PATH,
            "CS" => Self::CERTIFICATE,
            "SB" => Self::SIBRA,
            _ => return Err(AddressKind::Service.into()),
        };
        match suffix {
            "A" => Ok(service),
            "M" => Ok(service.multicast()),
            _ => Err(AddressKind::Service.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::param_test;

    param_test! {
        text_form: [
            path_anycast: ("PS_A", ServiceAddr::PATH),
            beacon_multicast: ("BS_M", ServiceAddr::BEACON.multicast()),
            none: ("NONE", ServiceAddr::NONE),
            unnamed: ("SVC:0x0042", ServiceAddr(0x42)),
        ]
    }
    fn text_form(text: &str, service: ServiceAddr) {
        assert_eq!(text.parse(), Ok(service));
        assert_eq!(service.to_string(), text);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("XS_A".parse::<ServiceAddr>().is_err());
        assert!("PS_X".parse::<ServiceAddr>().is_err());
    }
}
