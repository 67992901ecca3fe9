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

//! Wire codec for legacy SCION network-layer packets
//!
//! [SCION][scion-net] is an Internet architecture that provides path-aware, end-to-end
//! communication. This crate implements the encoding and decoding of the legacy SCION packet
//! format, in which a packet is laid out as
//!
//! ```text
//! common header | address header | path | hop-by-hop extensions | security extension |
//! end-to-end extensions | L4 header | payload
//! ```
//!
//! and every section is aligned to 8-byte [lines][line::LINE_LEN].
//!
//! The crate provides:
//!
//! - [addresses][address] identifying ISDs, ASes and hosts;
//! - the [packet] model together with its [encoder][packet::PacketEncoder] and
//!   [decoder][packet::ScionPacket::decode];
//! - hop-by-hop and end-to-end [extensions][packet::extension], including the
//!   [security extension][packet::security] whose authenticator covers the whole packet; and
//! - the [authentication][auth] interface used to compute and verify that authenticator.
//!
//! This crate does not perform any I/O.
//!
//! [scion-net]: https://scion-architecture.net/

pub mod address;
pub mod auth;
pub mod line;
pub mod packet;
pub mod wire_encoding;

pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
