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

//! SCION addresses for ISDs, ASes and hosts.
//!
//! # Organisation
//!
//! - An [`IsdAsn`] globally identifies an AS within the SCION network, and consists of an ISD
//!   identifier ([`Isd`]) and AS number ([`Asn`]).
//! - A [`HostAddr`] is an AS-local host address: none, IPv4, IPv6 or a [`ServiceAddr`]. Its
//!   [`HostType`] is the tag carried in the common header and determines its encoded length.
//! - The above combined are a [`ScionAddr`], one endpoint of a packet.

mod asn;
pub use asn::Asn;

mod isd;
pub use isd::Isd;

mod ia;
pub use ia::IsdAsn;

mod service;
pub use service::ServiceAddr;

mod host;
pub use host::{HostAddr, HostType, MalformedHostAddr};

mod scion_address;
pub use scion_address::ScionAddr;

mod error;
pub use error::{AddressKind, AddressParseError};
