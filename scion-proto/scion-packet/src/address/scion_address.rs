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

use super::{AddressKind, AddressParseError, HostAddr, HostType, IsdAsn};

/// A SCION endpoint address: the AS and the host within it.
///
/// The text form is `<isd>-<as>,<host>`, e.g. `1-ffaa:0:1103,1.1.1.8`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScionAddr {
    isd_asn: IsdAsn,
    host: HostAddr,
}

impl ScionAddr {
    /// Creates a new address.
    pub const fn new(isd_asn: IsdAsn, host: HostAddr) -> Self {
        Self { isd_asn, host }
    }

    /// The ISD-AS of the endpoint.
    pub const fn isd_asn(&self) -> IsdAsn {
        self.isd_asn
    }

    /// The host address of the endpoint.
    pub const fn host(&self) -> HostAddr {
        self.host
    }

    /// The type tag of the host address.
    pub const fn host_type(&self) -> HostType {
        self.host.host_type()
    }
}

impl Display for ScionAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.isd_asn, self.host)
    }
}

impl FromStr for ScionAddr {
    type Err = AddressParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let (isd_asn, host) = string.split_once(',').ok_or(AddressKind::Scion)?;
        Ok(Self::new(
            isd_asn.parse().or(Err(AddressKind::Scion))?,
            host.parse().or(Err(AddressKind::Scion))?,
        ))
    }
}
