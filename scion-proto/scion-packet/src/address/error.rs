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

use std::fmt::{Display, Formatter};

/// The kind of address that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// An ISD identifier.
    Isd,
    /// An AS number.
    Asn,
    /// An ISD-AS pair.
    IsdAsn,
    /// A service address.
    Service,
    /// A host address.
    Host,
    /// A SCION address.
    Scion,
}

impl Display for AddressKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AddressKind::Isd => "ISD",
            AddressKind::Asn => "AS number",
            AddressKind::IsdAsn => "ISD-AS",
            AddressKind::Service => "service address",
            AddressKind::Host => "host address",
            AddressKind::Scion => "SCION address",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing an address from a string.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid {0}")]
pub struct AddressParseError(pub AddressKind);

impl From<AddressKind> for AddressParseError {
    fn from(value: AddressKind) -> Self {
        Self(value)
    }
}
